//! Savings goals and their contributions.
//!
//! A goal only stores its target; how much has been saved is the sum of the
//! rows in `goal_contributions`.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target: Money,
    pub deadline: NaiveDate,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub amount: Money,
    pub contributed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_minor: i64,
    pub deadline: Date,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "contributions::Entity")]
    Contributions,
}

impl Related<contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Goal> for ActiveModel {
    fn from(goal: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id),
            user_id: ActiveValue::Set(goal.user_id),
            name: ActiveValue::Set(goal.name.clone()),
            description: ActiveValue::Set(goal.description.clone()),
            target_minor: ActiveValue::Set(goal.target.cents()),
            deadline: ActiveValue::Set(goal.deadline),
            icon: ActiveValue::Set(goal.icon.clone()),
            color: ActiveValue::Set(goal.color.clone()),
            created_at: ActiveValue::Set(goal.created_at),
        }
    }
}

impl From<Model> for Goal {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            target: Money::new(model.target_minor),
            deadline: model.deadline,
            icon: model.icon,
            color: model.color,
            created_at: model.created_at,
        }
    }
}

pub mod contributions {
    use sea_orm::{ActiveValue, entity::prelude::*};

    use crate::Money;

    use super::Contribution;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "goal_contributions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub goal_id: Uuid,
        pub amount_minor: i64,
        pub contributed_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::Entity",
            from = "Column::GoalId",
            to = "super::Column::Id",
            on_update = "NoAction",
            on_delete = "Cascade"
        )]
        Goal,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Goal.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<&Contribution> for ActiveModel {
        fn from(value: &Contribution) -> Self {
            Self {
                id: ActiveValue::Set(value.id),
                goal_id: ActiveValue::Set(value.goal_id),
                amount_minor: ActiveValue::Set(value.amount.cents()),
                contributed_at: ActiveValue::Set(value.contributed_at),
            }
        }
    }

    impl From<Model> for Contribution {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                goal_id: model.goal_id,
                amount: Money::new(model.amount_minor),
                contributed_at: model.contributed_at,
            }
        }
    }
}
