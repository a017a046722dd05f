//! Request and response bodies of the HTTP API.
//!
//! Amounts travel as integer minor units (`*_minor`), dates as ISO
//! `YYYY-MM-DD` and timestamps as RFC3339.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes an absent field from an explicit `null` in PATCH bodies.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Per-row messages of a rejected CSV import.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Theme {
        Light,
        Dark,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Register {
        pub username: String,
        pub password: String,
        pub password_confirm: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ThemeUpdate {
        pub theme: Theme,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub theme: Theme,
        pub created_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        pub kind: TransactionKind,
        pub icon: Option<String>,
        pub color: Option<String>,
        pub description: Option<String>,
    }

    /// Omitted fields are left unchanged; an empty string clears a text field.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub kind: Option<TransactionKind>,
        pub icon: Option<String>,
        pub color: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryList {
        pub kind: Option<TransactionKind>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub kind: TransactionKind,
        pub icon: Option<String>,
        pub color: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryStatsView {
        #[serde(flatten)]
        pub category: CategoryView,
        pub transaction_count: u64,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryStatsView>,
    }
}

pub mod transaction {
    use super::*;

    /// Query string of the listing and the export.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        /// Inclusive.
        pub from: Option<NaiveDate>,
        /// Inclusive.
        pub to: Option<NaiveDate>,
        pub category_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        pub page: Option<u64>,
        pub page_size: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub occurred_on: NaiveDate,
        pub category_id: Option<Uuid>,
        pub note: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub kind: Option<TransactionKind>,
        pub amount_minor: Option<i64>,
        pub occurred_on: Option<NaiveDate>,
        /// `null` removes the category, an absent field keeps it.
        #[serde(
            default,
            deserialize_with = "deserialize_some",
            skip_serializing_if = "Option::is_none"
        )]
        pub category_id: Option<Option<Uuid>>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryRef {
        pub id: Uuid,
        pub name: String,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub occurred_on: NaiveDate,
        pub category: Option<CategoryRef>,
        pub note: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub page: u64,
        pub page_size: u64,
        pub total_items: u64,
        pub total_pages: u64,
        /// Sums over every matching transaction, not only this page.
        pub total_income_minor: i64,
        pub total_expenses_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportResponse {
        pub imported: usize,
    }
}

pub mod budget {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetPeriod {
        Weekly,
        Monthly,
        Quarterly,
        Yearly,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BudgetStatus {
        Green,
        Yellow,
        Red,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category_id: Uuid,
        pub limit_minor: i64,
        /// Defaults to monthly.
        pub period: Option<BudgetPeriod>,
        pub description: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub category_id: Option<Uuid>,
        pub limit_minor: Option<i64>,
        pub period: Option<BudgetPeriod>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub category_name: String,
        pub category_color: Option<String>,
        pub limit_minor: i64,
        pub period: BudgetPeriod,
        pub description: Option<String>,
        pub window_start: NaiveDate,
        /// Last day of the current period, inclusive.
        pub window_end: NaiveDate,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        pub percentage_used: u32,
        pub over_budget: bool,
        pub status: BudgetStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetAlertView {
        pub status: BudgetStatus,
        pub category: String,
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetOverviewResponse {
        pub budgets: Vec<BudgetView>,
        pub total_limit_minor: i64,
        pub total_spent_minor: i64,
        pub over_by_minor: i64,
        pub alerts: Vec<BudgetAlertView>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target_minor: i64,
        pub deadline: NaiveDate,
        pub description: Option<String>,
        pub icon: Option<String>,
        pub color: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GoalUpdate {
        pub name: Option<String>,
        pub target_minor: Option<i64>,
        pub deadline: Option<NaiveDate>,
        pub description: Option<String>,
        pub icon: Option<String>,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionNew {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub contributed_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub icon: Option<String>,
        pub color: Option<String>,
        pub target_minor: i64,
        pub deadline: NaiveDate,
        pub saved_minor: i64,
        pub remaining_minor: i64,
        pub percentage: u32,
        pub achieved: bool,
        pub achieved_at: Option<DateTime<Utc>>,
        pub days_left: i64,
        pub contributions: Vec<ContributionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalSeriesView {
        pub goal_id: Uuid,
        pub name: String,
        pub color: Option<String>,
        pub data_minor: Vec<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalHistoryView {
        pub labels: Vec<String>,
        pub series: Vec<GoalSeriesView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalOverviewResponse {
        pub goals: Vec<GoalView>,
        pub total_target_minor: i64,
        pub total_saved_minor: i64,
        pub average_percentage: f64,
        pub history: GoalHistoryView,
    }
}

pub mod dashboard {
    use super::*;
    use crate::{budget::BudgetView, goal::GoalView, transaction::TransactionView};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PeriodSummaryView {
        pub start: NaiveDate,
        /// Inclusive.
        pub end: NaiveDate,
        pub income_minor: i64,
        pub expenses_minor: i64,
        pub net_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySliceView {
        pub category_id: Option<Uuid>,
        pub label: String,
        pub color: Option<String>,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendPointView {
        pub label: String,
        pub income_minor: i64,
        pub expenses_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryChartResponse {
        pub slices: Vec<CategorySliceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendChartResponse {
        pub points: Vec<TrendPointView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardResponse {
        pub total_balance_minor: i64,
        pub current_month: PeriodSummaryView,
        pub previous_month: PeriodSummaryView,
        /// Percent change against the previous month; `null` when that month is 0.
        pub income_change: Option<f64>,
        pub expense_change: Option<f64>,
        pub expense_breakdown: Vec<CategorySliceView>,
        pub trend: Vec<TrendPointView>,
        pub recent_transactions: Vec<TransactionView>,
        pub top_budgets: Vec<BudgetView>,
        pub top_goals: Vec<GoalView>,
    }
}

#[cfg(test)]
mod tests {
    use super::transaction::TransactionUpdate;

    #[test]
    fn patch_distinguishes_null_from_absent_category() {
        let absent: TransactionUpdate = serde_json::from_str(r#"{"note":"x"}"#).unwrap();
        assert_eq!(absent.category_id, None);

        let cleared: TransactionUpdate = serde_json::from_str(r#"{"category_id":null}"#).unwrap();
        assert_eq!(cleared.category_id, Some(None));

        let set: TransactionUpdate = serde_json::from_str(
            r#"{"category_id":"67e55044-10b1-426f-9247-bb680e5fe0c8"}"#,
        )
        .unwrap();
        assert!(matches!(set.category_id, Some(Some(_))));
    }
}
