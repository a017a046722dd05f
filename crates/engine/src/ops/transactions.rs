use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Money, NewTransaction, ResultEngine, Transaction, TransactionFilter,
    TransactionKind, TransactionPage, TransactionUpdate,
    report::{Totals, TransactionEntry},
    transactions,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 200;

/// Page request for transaction listings. Pages are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Clamps the page to at least 1 and the size to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

fn validate_filter(filter: &TransactionFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::InvalidDate(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::OccurredOn.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::OccurredOn.lte(to));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id));
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        self
    }
}

/// Matching rows newest first: by date, then creation time, then id.
fn newest_first(user_id: Uuid, filter: &TransactionFilter) -> Select<transactions::Entity> {
    transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user_id))
        .apply_tx_filters(filter)
        .order_by_desc(transactions::Column::OccurredOn)
        .order_by_desc(transactions::Column::CreatedAt)
        .order_by_desc(transactions::Column::Id)
}

fn apply_text_patch(target: &mut Option<String>, patch: Option<&str>) {
    if let Some(value) = patch {
        *target = normalize_optional_text(Some(value));
    }
}

impl Engine {
    /// All transactions of `user_id` matching `filter`, newest first.
    pub(super) async fn filtered_transactions(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_filter(filter)?;
        newest_first(user_id, filter)
            .all(db)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Number of matching transactions and their income/expense sums,
    /// aggregated in the database.
    async fn filtered_totals(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> ResultEngine<(u64, Totals)> {
        let rows: Vec<(String, i64, Option<i64>)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::Kind)
            .column_as(transactions::Column::Id.count(), "items")
            .column_as(transactions::Column::AmountMinor.sum(), "total")
            .filter(transactions::Column::UserId.eq(user_id))
            .apply_tx_filters(filter)
            .group_by(transactions::Column::Kind)
            .into_tuple()
            .all(db)
            .await?;

        let mut count = 0u64;
        let mut totals = Totals::default();
        for (kind, items, total) in rows {
            count += u64::try_from(items).unwrap_or_default();
            let total = Money::new(total.unwrap_or_default());
            match TransactionKind::try_from(kind.as_str())? {
                TransactionKind::Income => totals.income = total,
                TransactionKind::Expense => totals.expenses = total,
            }
        }
        Ok((count, totals))
    }

    pub(super) async fn insert_transaction(
        &self,
        db: &DatabaseTransaction,
        cmd: NewTransaction,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        if let Some(category_id) = cmd.category_id {
            self.require_category_for(db, cmd.user_id, category_id, cmd.kind)
                .await?;
        }
        let tx = Transaction::new(
            cmd.user_id,
            cmd.category_id,
            cmd.kind,
            cmd.amount,
            cmd.occurred_on,
            normalize_optional_text(cmd.note.as_deref()),
            now,
        )?;
        transactions::ActiveModel::from(&tx).insert(db).await?;
        Ok(tx)
    }

    pub async fn create_transaction(
        &self,
        cmd: NewTransaction,
        now: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| self.insert_transaction(&db_tx, cmd, now).await)
    }

    pub async fn transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<TransactionEntry> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let categories = self.categories_by_id(&db_tx, user_id).await?;
            Ok(TransactionEntry::new(Transaction::try_from(model)?, &categories))
        })
    }

    /// Applies `update`. The category rule is checked against the resulting
    /// type, so switching type also requires a matching category.
    pub async fn update_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
        update: TransactionUpdate,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let mut tx = Transaction::try_from(model)?;

            if let Some(kind) = update.kind {
                tx.kind = kind;
            }
            if let Some(amount) = update.amount {
                tx.amount = amount.ensure_storable("amount")?;
            }
            if let Some(occurred_on) = update.occurred_on {
                tx.occurred_on = occurred_on;
            }
            if let Some(category_id) = update.category_id {
                tx.category_id = category_id;
            }
            apply_text_patch(&mut tx.note, update.note.as_deref());

            if let Some(category_id) = tx.category_id {
                self.require_category_for(&db_tx, user_id, category_id, tx.kind)
                    .await?;
            }

            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(tx)
        })
    }

    pub async fn delete_transaction(&self, user_id: Uuid, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            transactions::Entity::delete_by_id(transaction_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// One page of the filtered listing, newest first. A page past the end
    /// yields the last page.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> ResultEngine<TransactionPage> {
        validate_filter(filter)?;
        with_tx!(self, |db_tx| {
            let (total_items, totals) = self.filtered_totals(&db_tx, user_id, filter).await?;
            let total_pages = total_items.div_ceil(pagination.page_size).max(1);
            let page = pagination.page.min(total_pages);

            let categories = self.categories_by_id(&db_tx, user_id).await?;
            let items = newest_first(user_id, filter)
                .offset((page - 1) * pagination.page_size)
                .limit(pagination.page_size)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| {
                    Transaction::try_from(model).map(|tx| TransactionEntry::new(tx, &categories))
                })
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(TransactionPage {
                items,
                page,
                page_size: pagination.page_size,
                total_items,
                total_pages,
                totals,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(Pagination::new(None, None), Pagination::default());
        assert_eq!(
            Pagination::new(Some(0), Some(10_000)),
            Pagination {
                page: 1,
                page_size: MAX_PAGE_SIZE
            }
        );
        assert_eq!(Pagination::new(Some(3), Some(0)).page_size, 1);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let filter = TransactionFilter {
            from: NaiveDate::from_ymd_opt(2026, 10, 2),
            to: NaiveDate::from_ymd_opt(2026, 10, 1),
            ..Default::default()
        };
        assert!(matches!(
            validate_filter(&filter),
            Err(EngineError::InvalidDate(_))
        ));

        let same_day = TransactionFilter {
            from: NaiveDate::from_ymd_opt(2026, 10, 1),
            to: NaiveDate::from_ymd_opt(2026, 10, 1),
            ..Default::default()
        };
        assert!(validate_filter(&same_day).is_ok());
    }
}
