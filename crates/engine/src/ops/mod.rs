use sea_orm::{DatabaseConnection, DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod budgets;
mod categories;
mod csv;
mod dashboard;
mod goals;
mod transactions;
mod users;

pub use csv::ImportSummary;
pub use transactions::Pagination;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The underlying connection, for health checks.
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

/// Generates a `require_*` lookup that loads a row by id and hides rows owned
/// by other users behind the same not-found error.
macro_rules! impl_require_owned {
    ($require_fn:ident, $entity:path, $model:path, $user_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: Uuid,
            id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id)
                .filter($user_col.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(
        require_category,
        crate::categories::Entity,
        crate::categories::Model,
        crate::categories::Column::UserId,
        "category not exists"
    );

    impl_require_owned!(
        require_transaction,
        crate::transactions::Entity,
        crate::transactions::Model,
        crate::transactions::Column::UserId,
        "transaction not exists"
    );

    impl_require_owned!(
        require_budget,
        crate::budgets::Entity,
        crate::budgets::Model,
        crate::budgets::Column::UserId,
        "budget not exists"
    );

    impl_require_owned!(
        require_goal,
        crate::goals::Entity,
        crate::goals::Model,
        crate::goals::Column::UserId,
        "goal not exists"
    );
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
