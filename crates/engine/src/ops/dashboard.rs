use chrono::NaiveDate;
use sea_orm::{DatabaseTransaction, TransactionTrait};
use uuid::Uuid;

use crate::{
    BudgetPeriod, CategorySlice, Dashboard, PeriodSummary, ResultEngine, TransactionFilter,
    TrendPoint,
    period::last_n_months,
    report::{
        RECENT_TRANSACTIONS, TOP_ITEMS, TREND_MONTHS, TransactionEntry, expense_breakdown,
        monthly_trend, percent_change, summarize,
    },
};

use super::{Engine, with_tx};

impl Engine {
    async fn build_dashboard(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<Dashboard> {
        let all = self
            .filtered_transactions(db, user_id, &TransactionFilter::default())
            .await?;
        let categories = self.categories_by_id(db, user_id).await?;

        let current_window = BudgetPeriod::Monthly.window(today)?;
        let previous_window = current_window.previous()?;
        let current_month = PeriodSummary::new(&all, current_window);
        let previous_month = PeriodSummary::new(&all, previous_window);

        let months = last_n_months(today, TREND_MONTHS)?;

        let mut top_budgets = self.budget_reports(db, user_id, today).await?;
        top_budgets.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
        top_budgets.truncate(TOP_ITEMS);

        let mut top_goals = self.goal_progresses(db, user_id, today).await?;
        top_goals.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
        top_goals.truncate(TOP_ITEMS);

        Ok(Dashboard {
            total_balance: summarize(&all).net(),
            income_change: percent_change(previous_month.income, current_month.income),
            expense_change: percent_change(previous_month.expenses, current_month.expenses),
            expense_breakdown: expense_breakdown(&all, &categories, &current_window),
            trend: monthly_trend(&all, &months),
            recent_transactions: all
                .iter()
                .take(RECENT_TRANSACTIONS)
                .cloned()
                .map(|tx| TransactionEntry::new(tx, &categories))
                .collect(),
            current_month,
            previous_month,
            top_budgets,
            top_goals,
        })
    }

    /// Balance, month-over-month totals, breakdown, trend, recent activity
    /// and the most advanced budgets and goals.
    pub async fn dashboard(&self, user_id: Uuid, today: NaiveDate) -> ResultEngine<Dashboard> {
        with_tx!(self, |db_tx| self.build_dashboard(&db_tx, user_id, today).await)
    }

    /// Current-month expenses by category, for the pie chart.
    pub async fn category_chart(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<Vec<CategorySlice>> {
        let window = BudgetPeriod::Monthly.window(today)?;
        with_tx!(self, |db_tx| {
            let filter = TransactionFilter {
                from: Some(window.start),
                to: Some(window.last_day()),
                ..Default::default()
            };
            let items = self.filtered_transactions(&db_tx, user_id, &filter).await?;
            let categories = self.categories_by_id(&db_tx, user_id).await?;
            Ok(expense_breakdown(&items, &categories, &window))
        })
    }

    /// Income and expenses of the last six months, oldest first.
    pub async fn trend_chart(&self, user_id: Uuid, today: NaiveDate) -> ResultEngine<Vec<TrendPoint>> {
        let months = last_n_months(today, TREND_MONTHS)?;
        with_tx!(self, |db_tx| {
            let filter = TransactionFilter {
                from: months.first().map(|w| w.start),
                to: months.last().map(|w| w.last_day()),
                ..Default::default()
            };
            let items = self.filtered_transactions(&db_tx, user_id, &filter).await?;
            Ok(monthly_trend(&items, &months))
        })
    }
}
