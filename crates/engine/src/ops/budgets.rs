use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, BudgetOverview, BudgetPeriod, BudgetReport, BudgetUpdate, Category, EngineError,
    Money, NewBudget, ResultEngine, Transaction, TransactionKind, budget_report::spent_in_window,
    budgets, transactions, util::normalize_optional_text,
};

use super::{Engine, with_tx};

fn validate_limit(limit: Money) -> ResultEngine<()> {
    limit.ensure_storable("budget limit")?;
    Ok(())
}

impl Engine {
    async fn ensure_budget_free(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        category: &Category,
        period: BudgetPeriod,
        exclude: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::CategoryId.eq(category.id))
            .filter(budgets::Column::Period.eq(period.as_str()));
        if let Some(id) = exclude {
            query = query.filter(budgets::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(format!(
                "{} budget for '{}'",
                period.as_str(),
                category.name
            )));
        }
        Ok(())
    }

    /// Expenses of `user_id` in any of `category_ids` dated within `[start, end)`.
    async fn expenses_between(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        category_ids: Vec<Uuid>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Kind.eq(TransactionKind::Expense.as_str()))
            .filter(transactions::Column::CategoryId.is_in(category_ids))
            .filter(transactions::Column::OccurredOn.gte(start))
            .filter(transactions::Column::OccurredOn.lt(end))
            .all(db)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn report_for(
        &self,
        db: &DatabaseTransaction,
        budget: Budget,
        category: Category,
        today: NaiveDate,
    ) -> ResultEngine<BudgetReport> {
        let window = budget.period.window(today)?;
        let expenses = self
            .expenses_between(db, budget.user_id, vec![category.id], window.start, window.end)
            .await?;
        let spent = spent_in_window(&expenses, category.id, &window);
        Ok(BudgetReport::new(budget, category, window, spent))
    }

    /// Reports of every budget of `user_id` for the periods containing
    /// `today`, ordered by category name then period.
    pub(super) async fn budget_reports(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<Vec<BudgetReport>> {
        let budgets = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_asc(budgets::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        if budgets.is_empty() {
            return Ok(Vec::new());
        }
        let categories = self.categories_by_id(db, user_id).await?;

        let windows = budgets
            .iter()
            .map(|b| b.period.window(today))
            .collect::<ResultEngine<Vec<_>>>()?;
        let earliest = windows.iter().map(|w| w.start).min().unwrap_or(today);
        let latest = windows.iter().map(|w| w.end).max().unwrap_or(today);
        let category_ids = budgets.iter().map(|b| b.category_id).collect();
        let expenses = self
            .expenses_between(db, user_id, category_ids, earliest, latest)
            .await?;

        let mut reports = Vec::with_capacity(budgets.len());
        for (budget, window) in budgets.into_iter().zip(windows) {
            let category = categories
                .get(&budget.category_id)
                .cloned()
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            let spent = spent_in_window(&expenses, category.id, &window);
            reports.push(BudgetReport::new(budget, category, window, spent));
        }
        reports.sort_by(|a, b| {
            a.category
                .name
                .to_lowercase()
                .cmp(&b.category.name.to_lowercase())
                .then_with(|| a.window.end.cmp(&b.window.end))
        });
        Ok(reports)
    }

    pub async fn create_budget(&self, cmd: NewBudget, now: DateTime<Utc>) -> ResultEngine<Budget> {
        validate_limit(cmd.limit)?;
        with_tx!(self, |db_tx| {
            let category = self
                .require_category_for(&db_tx, cmd.user_id, cmd.category_id, TransactionKind::Expense)
                .await?;
            self.ensure_budget_free(&db_tx, cmd.user_id, &category, cmd.period, None)
                .await?;
            let budget = Budget {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                category_id: category.id,
                limit: cmd.limit,
                period: cmd.period,
                description: normalize_optional_text(cmd.description.as_deref()),
                created_at: now,
            };
            budgets::ActiveModel::from(&budget).insert(&db_tx).await?;
            Ok(budget)
        })
    }

    /// Actual against budgeted for the period containing `today`.
    pub async fn budget_report(
        &self,
        user_id: Uuid,
        budget_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<BudgetReport> {
        with_tx!(self, |db_tx| {
            let budget = Budget::try_from(self.require_budget(&db_tx, user_id, budget_id).await?)?;
            let category =
                Category::try_from(self.require_category(&db_tx, user_id, budget.category_id).await?)?;
            self.report_for(&db_tx, budget, category, today).await
        })
    }

    pub async fn update_budget(
        &self,
        user_id: Uuid,
        budget_id: Uuid,
        update: BudgetUpdate,
    ) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let mut budget =
                Budget::try_from(self.require_budget(&db_tx, user_id, budget_id).await?)?;
            if let Some(limit) = update.limit {
                validate_limit(limit)?;
                budget.limit = limit;
            }
            if let Some(period) = update.period {
                budget.period = period;
            }
            if let Some(category_id) = update.category_id {
                budget.category_id = category_id;
            }
            if let Some(description) = update.description.as_deref() {
                budget.description = normalize_optional_text(Some(description));
            }

            let category = self
                .require_category_for(&db_tx, user_id, budget.category_id, TransactionKind::Expense)
                .await?;
            self.ensure_budget_free(&db_tx, user_id, &category, budget.period, Some(budget_id))
                .await?;
            budgets::ActiveModel::from(&budget).update(&db_tx).await?;
            Ok(budget)
        })
    }

    pub async fn delete_budget(&self, user_id: Uuid, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, user_id, budget_id).await?;
            budgets::Entity::delete_by_id(budget_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Every budget's report plus totals and alerts.
    pub async fn budget_overview(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<BudgetOverview> {
        with_tx!(self, |db_tx| {
            let reports = self.budget_reports(&db_tx, user_id, today).await?;
            Ok(BudgetOverview::new(reports))
        })
    }
}
