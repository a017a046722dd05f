//! Core of the finance tracker: entities, validation and the read-side
//! aggregations behind budgets, savings goals and the dashboard.
//!
//! All access goes through [`Engine`], which scopes every operation to the
//! user id it receives.

pub use budget_report::{BudgetAlert, BudgetOverview, BudgetReport, BudgetStatus};
pub use budgets::Budget;
pub use categories::{Category, CategoryStats};
pub use commands::{
    BudgetUpdate, CategoryUpdate, GoalUpdate, NewBudget, NewCategory, NewGoal, NewTransaction,
    NewUser, TransactionFilter, TransactionUpdate,
};
pub use csv_io::{CSV_HEADER, MAX_IMPORT_BYTES, MAX_IMPORT_ERRORS};
pub use error::EngineError;
pub use goal_progress::{GoalHistory, GoalOverview, GoalProgress, GoalSeries};
pub use goals::{Contribution, Goal};
pub use money::Money;
pub use ops::{Engine, EngineBuilder, ImportSummary, Pagination};
pub use period::{BudgetPeriod, PeriodWindow, last_n_months};
pub use report::{
    CategorySlice, Dashboard, PeriodSummary, Totals, TransactionEntry, TransactionPage,
    TrendPoint,
};
pub use transactions::{Transaction, TransactionKind};
pub use users::{Theme, User};

pub mod budget_report;
mod budgets;
mod categories;
mod commands;
pub mod csv_io;
mod error;
pub mod goal_progress;
mod goals;
mod money;
mod ops;
mod period;
pub mod report;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
