//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create/update of
//! users, categories, transactions, budgets and goals), keeping call sites
//! readable and avoiding long argument lists.
//!
//! Update commands use `Option` for "leave unchanged". Optional text fields
//! are cleared by passing an empty string.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{BudgetPeriod, Money, TransactionKind};

/// Register a new account.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            password_confirm: password.clone(),
            password,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[must_use]
    pub fn password_confirm(mut self, confirm: impl Into<String>) -> Self {
        self.password_confirm = confirm.into();
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    #[must_use]
    pub fn names(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }
}

/// Create a category.
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub user_id: Uuid,
    pub name: String,
    pub kind: TransactionKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl NewCategory {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            user_id,
            name: name.into(),
            kind,
            icon: None,
            color: None,
            description: None,
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Update a category.
///
/// Changing `kind` is only allowed while no transaction or budget uses the
/// category.
#[derive(Clone, Debug, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub kind: Option<TransactionKind>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Record an income or expense.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    pub occurred_on: NaiveDate,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
}

impl NewTransaction {
    #[must_use]
    pub fn new(user_id: Uuid, kind: TransactionKind, amount: Money, occurred_on: NaiveDate) -> Self {
        Self {
            user_id,
            kind,
            amount,
            occurred_on,
            category_id: None,
            note: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Update a transaction.
///
/// `category_id: Some(None)` removes the category.
#[derive(Clone, Debug, Default)]
pub struct TransactionUpdate {
    pub kind: Option<TransactionKind>,
    pub amount: Option<Money>,
    pub occurred_on: Option<NaiveDate>,
    pub category_id: Option<Option<Uuid>>,
    pub note: Option<String>,
}

/// Filters for listing and exporting transactions.
///
/// Both `from` and `to` are inclusive.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
}

/// Create a budget.
#[derive(Clone, Debug)]
pub struct NewBudget {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub limit: Money,
    pub period: BudgetPeriod,
    pub description: Option<String>,
}

impl NewBudget {
    #[must_use]
    pub fn new(user_id: Uuid, category_id: Uuid, limit: Money) -> Self {
        Self {
            user_id,
            category_id,
            limit,
            period: BudgetPeriod::default(),
            description: None,
        }
    }

    #[must_use]
    pub fn period(mut self, period: BudgetPeriod) -> Self {
        self.period = period;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct BudgetUpdate {
    pub category_id: Option<Uuid>,
    pub limit: Option<Money>,
    pub period: Option<BudgetPeriod>,
    pub description: Option<String>,
}

/// Create a savings goal.
#[derive(Clone, Debug)]
pub struct NewGoal {
    pub user_id: Uuid,
    pub name: String,
    pub target: Money,
    pub deadline: NaiveDate,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl NewGoal {
    #[must_use]
    pub fn new(user_id: Uuid, name: impl Into<String>, target: Money, deadline: NaiveDate) -> Self {
        Self {
            user_id,
            name: name.into(),
            target,
            deadline,
            description: None,
            icon: None,
            color: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target: Option<Money>,
    pub deadline: Option<NaiveDate>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}
