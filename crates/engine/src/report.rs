//! Read-side aggregation over a user's transactions.
//!
//! The dashboard is assembled from these building blocks; none of them
//! touch the database.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BudgetReport, Category, GoalProgress, Money, PeriodWindow, Transaction, TransactionKind,
};

/// Label used for expenses without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Number of transactions listed on the dashboard.
pub const RECENT_TRANSACTIONS: usize = 5;

/// Number of months in the dashboard trend.
pub const TREND_MONTHS: usize = 6;

/// Number of budgets and goals highlighted on the dashboard.
pub const TOP_ITEMS: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Money,
    pub expenses: Money,
}

impl Totals {
    pub fn net(&self) -> Money {
        self.income - self.expenses
    }

    fn add(&mut self, tx: &Transaction) {
        match tx.kind {
            TransactionKind::Income => self.income += tx.amount,
            TransactionKind::Expense => self.expenses += tx.amount,
        }
    }
}

/// Income and expense sums of `transactions`.
pub fn summarize<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Totals {
    let mut totals = Totals::default();
    for tx in transactions {
        totals.add(tx);
    }
    totals
}

/// Sums restricted to the dates inside `window`.
pub fn summarize_window<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    window: &PeriodWindow,
) -> Totals {
    summarize(
        transactions
            .into_iter()
            .filter(|tx| window.contains(tx.occurred_on)),
    )
}

/// Percentage change from `previous` to `current`, `None` when `previous` is 0.
pub fn percent_change(previous: Money, current: Money) -> Option<f64> {
    if previous.is_zero() {
        return None;
    }
    let delta = (current - previous).cents() as f64;
    Some(delta * 100.0 / previous.cents().abs() as f64)
}

/// Totals of one period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub window: PeriodWindow,
    pub income: Money,
    pub expenses: Money,
    pub net: Money,
}

impl PeriodSummary {
    pub fn new<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
        window: PeriodWindow,
    ) -> Self {
        let totals = summarize_window(transactions, &window);
        Self {
            window,
            income: totals.income,
            expenses: totals.expenses,
            net: totals.net(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySlice {
    /// `None` for the uncategorized bucket.
    pub category_id: Option<Uuid>,
    pub label: String,
    pub color: Option<String>,
    pub total: Money,
}

/// Expenses in `window` grouped by category, largest first.
pub fn expense_breakdown<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    categories: &HashMap<Uuid, Category>,
    window: &PeriodWindow,
) -> Vec<CategorySlice> {
    let mut sums: HashMap<Option<Uuid>, Money> = HashMap::new();
    for tx in transactions {
        if tx.kind != TransactionKind::Expense || !window.contains(tx.occurred_on) {
            continue;
        }
        // A dangling id is reported as uncategorized.
        let key = tx.category_id.filter(|id| categories.contains_key(id));
        *sums.entry(key).or_default() += tx.amount;
    }

    let mut slices: Vec<CategorySlice> = sums
        .into_iter()
        .map(|(key, total)| match key.and_then(|id| categories.get(&id)) {
            Some(category) => CategorySlice {
                category_id: Some(category.id),
                label: category.name.clone(),
                color: category.color.clone(),
                total,
            },
            None => CategorySlice {
                category_id: None,
                label: UNCATEGORIZED_LABEL.to_string(),
                color: None,
                total,
            },
        })
        .collect();
    slices.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    slices
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub label: String,
    pub window: PeriodWindow,
    pub income: Money,
    pub expenses: Money,
}

/// One point per window, in the order given.
pub fn monthly_trend(transactions: &[Transaction], months: &[PeriodWindow]) -> Vec<TrendPoint> {
    months
        .iter()
        .map(|window| {
            let totals = summarize_window(transactions, window);
            TrendPoint {
                label: window.start.format("%b %Y").to_string(),
                window: *window,
                income: totals.income,
                expenses: totals.expenses,
            }
        })
        .collect()
}

/// A transaction along with the category it is filed under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub transaction: Transaction,
    pub category: Option<Category>,
}

impl TransactionEntry {
    pub fn new(transaction: Transaction, categories: &HashMap<Uuid, Category>) -> Self {
        let category = transaction
            .category_id
            .and_then(|id| categories.get(&id))
            .cloned();
        Self {
            transaction,
            category,
        }
    }
}

/// One page of a filtered transaction listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub items: Vec<TransactionEntry>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    /// Sums over the whole filtered set, not just this page.
    pub totals: Totals,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_balance: Money,
    pub current_month: PeriodSummary,
    pub previous_month: PeriodSummary,
    pub income_change: Option<f64>,
    pub expense_change: Option<f64>,
    pub expense_breakdown: Vec<CategorySlice>,
    pub trend: Vec<TrendPoint>,
    pub recent_transactions: Vec<TransactionEntry>,
    pub top_budgets: Vec<BudgetReport>,
    pub top_goals: Vec<GoalProgress>,
}
