use std::collections::HashMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Category, CategoryStats, CategoryUpdate, EngineError, Money, NewCategory, ResultEngine,
    Transaction, TransactionKind, budgets, categories, transactions,
    util::{normalize_category_key, normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

fn apply_optional_text_patch(target: &mut Option<String>, patch: Option<&str>) {
    if let Some(value) = patch {
        *target = normalize_optional_text(Some(value));
    }
}

impl Engine {
    /// Loads every category of `user_id`, keyed by id.
    pub(super) async fn categories_by_id(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<HashMap<Uuid, Category>> {
        categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .all(db)
            .await?
            .into_iter()
            .map(|model| Category::try_from(model).map(|c| (c.id, c)))
            .collect()
    }

    /// Checks that `category_id` may label a transaction of `kind` owned by
    /// `user_id`. Missing and foreign ids get the same error.
    pub(super) async fn require_category_for(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        category_id: Uuid,
        kind: TransactionKind,
    ) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(category_id)
            .filter(categories::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::InvalidCategory("unknown category".to_string()))?;
        let category = Category::try_from(model)?;
        if category.kind != kind {
            return Err(EngineError::InvalidCategory(format!(
                "category '{}' is an {} category",
                category.name,
                category.kind.as_str()
            )));
        }
        Ok(category)
    }

    async fn ensure_category_name_free(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        name: &str,
        name_norm: &str,
        kind: TransactionKind,
        exclude: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::NameNorm.eq(name_norm))
            .filter(categories::Column::Kind.eq(kind.as_str()));
        if let Some(id) = exclude {
            query = query.filter(categories::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(format!(
                "{} category '{name}'",
                kind.as_str()
            )));
        }
        Ok(())
    }

    pub async fn create_category(&self, cmd: NewCategory) -> ResultEngine<Category> {
        let name = normalize_required_name(&cmd.name, "category")?;
        let name_norm = normalize_category_key(&name)?;

        with_tx!(self, |db_tx| {
            self.ensure_category_name_free(&db_tx, cmd.user_id, &name, &name_norm, cmd.kind, None)
                .await?;
            let category = Category {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                name,
                kind: cmd.kind,
                icon: normalize_optional_text(cmd.icon.as_deref()),
                color: normalize_optional_text(cmd.color.as_deref()),
                description: normalize_optional_text(cmd.description.as_deref()),
            };
            category.active_model(name_norm).insert(&db_tx).await?;
            Ok(category)
        })
    }

    pub async fn category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, user_id, category_id).await?;
            Category::try_from(model)
        })
    }

    pub async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        update: CategoryUpdate,
    ) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, user_id, category_id).await?;
            let mut name_norm = model.name_norm.clone();
            let mut category = Category::try_from(model)?;

            if let Some(name) = update.name.as_deref() {
                category.name = normalize_required_name(name, "category")?;
                name_norm = normalize_category_key(&category.name)?;
            }
            if let Some(kind) = update.kind
                && kind != category.kind
            {
                self.ensure_category_unused(&db_tx, category_id).await?;
                category.kind = kind;
            }
            apply_optional_text_patch(&mut category.icon, update.icon.as_deref());
            apply_optional_text_patch(&mut category.color, update.color.as_deref());
            apply_optional_text_patch(&mut category.description, update.description.as_deref());

            self.ensure_category_name_free(
                &db_tx,
                user_id,
                &category.name,
                &name_norm,
                category.kind,
                Some(category_id),
            )
            .await?;
            category.active_model(name_norm).update(&db_tx).await?;
            Ok(category)
        })
    }

    async fn ensure_category_unused(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        let used_by_tx = transactions::Entity::find()
            .filter(transactions::Column::CategoryId.eq(category_id))
            .one(db)
            .await?
            .is_some();
        let used_by_budget = budgets::Entity::find()
            .filter(budgets::Column::CategoryId.eq(category_id))
            .one(db)
            .await?
            .is_some();
        if used_by_tx || used_by_budget {
            return Err(EngineError::InvalidCategory(
                "type cannot change while transactions or budgets use the category".to_string(),
            ));
        }
        Ok(())
    }

    /// Deletes a category. Its transactions become uncategorized and its
    /// budgets are removed.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await?;

            transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::CategoryId,
                    Expr::value(Value::Uuid(None)),
                )
                .filter(transactions::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_many()
                .filter(budgets::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Categories of a user ordered by name, with usage statistics.
    pub async fn list_categories(
        &self,
        user_id: Uuid,
        kind: Option<TransactionKind>,
    ) -> ResultEngine<Vec<CategoryStats>> {
        with_tx!(self, |db_tx| {
            let mut query = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id))
                .order_by_asc(categories::Column::NameNorm)
                .order_by_asc(categories::Column::Kind);
            if let Some(kind) = kind {
                query = query.filter(categories::Column::Kind.eq(kind.as_str()));
            }
            let models = query.all(&db_tx).await?;

            let mut usage: HashMap<Uuid, (u64, Money)> = HashMap::new();
            for model in transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::CategoryId.is_not_null())
                .all(&db_tx)
                .await?
            {
                let tx = Transaction::try_from(model)?;
                if let Some(id) = tx.category_id {
                    let entry = usage.entry(id).or_insert((0, Money::ZERO));
                    entry.0 += 1;
                    entry.1 += tx.amount;
                }
            }

            models
                .into_iter()
                .map(|model| {
                    let category = Category::try_from(model)?;
                    let (transaction_count, total_amount) =
                        usage.get(&category.id).copied().unwrap_or((0, Money::ZERO));
                    Ok(CategoryStats {
                        category,
                        transaction_count,
                        total_amount,
                    })
                })
                .collect()
        })
    }

    /// Finds a category by display name and type, comparing normalized keys.
    pub(super) fn find_category_by_name<'a>(
        categories: &'a HashMap<Uuid, Category>,
        name: &str,
        kind: TransactionKind,
    ) -> ResultEngine<Option<&'a Category>> {
        let key = normalize_category_key(name)?;
        Ok(categories.values().find(|c| {
            c.kind == kind && normalize_category_key(&c.name).is_ok_and(|k| k == key)
        }))
    }
}
