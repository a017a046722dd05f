//! Actual-vs-budgeted computation.
//!
//! Everything here is pure: callers load the budget, its category and the
//! transactions, and these functions derive the report.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Budget, Category, Money, PeriodWindow, Transaction, TransactionKind};

/// Maximum number of alerts shown in the budget overview.
pub const MAX_BUDGET_ALERTS: usize = 4;

/// Traffic-light status of a budget.
///
/// - `Green`: less than 75% of the limit spent
/// - `Yellow`: from 75% up to (excluding) 100%
/// - `Red`: 100% or more
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Green,
    Yellow,
    Red,
}

impl BudgetStatus {
    /// Classifies `spent` against `limit` using exact integer arithmetic.
    pub fn classify(spent: Money, limit: Money) -> Self {
        let spent = i128::from(spent.cents());
        let limit = i128::from(limit.cents());
        if limit <= 0 {
            return if spent > 0 { Self::Red } else { Self::Green };
        }
        if spent >= limit {
            Self::Red
        } else if spent * 4 >= limit * 3 {
            Self::Yellow
        } else {
            Self::Green
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub budget: Budget,
    pub category: Category,
    pub window: PeriodWindow,
    pub spent: Money,
    /// `limit - spent`; negative once the budget is exceeded.
    pub remaining: Money,
    /// Unclamped `spent / limit`.
    pub ratio: f64,
    /// `round(ratio * 100)` capped at 100, for progress bars.
    pub percentage_used: u32,
    pub over_budget: bool,
    pub status: BudgetStatus,
}

impl BudgetReport {
    pub fn new(budget: Budget, category: Category, window: PeriodWindow, spent: Money) -> Self {
        let limit = budget.limit;
        let ratio = if limit.is_positive() {
            spent.cents() as f64 / limit.cents() as f64
        } else {
            0.0
        };
        Self {
            remaining: limit - spent,
            ratio,
            percentage_used: capped_percentage(spent, limit),
            over_budget: spent > limit,
            status: BudgetStatus::classify(spent, limit),
            budget,
            category,
            window,
            spent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub status: BudgetStatus,
    pub category: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetOverview {
    pub budgets: Vec<BudgetReport>,
    pub total_limit: Money,
    pub total_spent: Money,
    /// `total_spent - total_limit`; positive when overspent overall.
    pub over_by: Money,
    pub alerts: Vec<BudgetAlert>,
}

impl BudgetOverview {
    pub fn new(budgets: Vec<BudgetReport>) -> Self {
        let total_limit: Money = budgets.iter().map(|b| b.budget.limit).sum();
        let total_spent: Money = budgets.iter().map(|b| b.spent).sum();
        let alerts = alerts(&budgets);
        Self {
            budgets,
            total_limit,
            total_spent,
            over_by: total_spent - total_limit,
            alerts,
        }
    }
}

/// Sum of expenses filed under `category_id` whose date falls in `window`.
pub fn spent_in_window<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    category_id: Uuid,
    window: &PeriodWindow,
) -> Money {
    transactions
        .into_iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
        .filter(|tx| tx.category_id == Some(category_id))
        .filter(|tx| window.contains(tx.occurred_on))
        .map(|tx| tx.amount)
        .sum()
}

/// `round(part / whole * 100)` clamped to `0..=100`.
pub(crate) fn capped_percentage(part: Money, whole: Money) -> u32 {
    let part = i128::from(part.cents()).max(0);
    let whole = i128::from(whole.cents());
    if whole <= 0 {
        return 0;
    }
    let rounded = (part * 200 + whole) / (whole * 2);
    rounded.min(100) as u32
}

/// Alerts for the most used budgets first, at most [`MAX_BUDGET_ALERTS`].
pub fn alerts(budgets: &[BudgetReport]) -> Vec<BudgetAlert> {
    let mut ordered: Vec<&BudgetReport> = budgets.iter().collect();
    ordered.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));

    ordered
        .into_iter()
        .take(MAX_BUDGET_ALERTS)
        .map(|report| {
            let message = match report.status {
                BudgetStatus::Red if report.over_budget => {
                    let over = over_percentage(report.spent, report.budget.limit);
                    format!("is {over}% over budget")
                }
                BudgetStatus::Red => "has used its whole budget".to_string(),
                BudgetStatus::Yellow => {
                    format!("is at {}% of budget", report.percentage_used)
                }
                BudgetStatus::Green => "is within budget".to_string(),
            };
            BudgetAlert {
                status: report.status,
                category: report.category.name.clone(),
                message,
            }
        })
        .collect()
}

/// `round((spent - limit) / limit * 100)`, at least 1 once `spent > limit`.
fn over_percentage(spent: Money, limit: Money) -> i128 {
    let over = i128::from(spent.cents()) - i128::from(limit.cents());
    let limit = i128::from(limit.cents());
    if limit <= 0 {
        return 100;
    }
    if over <= 0 {
        return 0;
    }
    ((over * 200 + limit) / (limit * 2)).max(1)
}
