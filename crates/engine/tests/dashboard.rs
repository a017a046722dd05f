mod common;

use engine::{Money, NewBudget, NewGoal, NewTransaction, TransactionKind, report::UNCATEGORIZED_LABEL};

use common::{at, category, d, engine_with_db, insert_user};

#[tokio::test]
async fn dashboard_summarizes_months_breakdown_and_recent() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;
    let food = category(&engine, alice, "Food", TransactionKind::Expense).await;
    let rent = category(&engine, alice, "Rent", TransactionKind::Expense).await;

    let rows = [
        (TransactionKind::Income, 300_000, d(2026, 9, 1), None),
        (TransactionKind::Expense, 100_000, d(2026, 9, 2), Some(rent.id)),
        (TransactionKind::Income, 330_000, d(2026, 10, 1), None),
        (TransactionKind::Expense, 100_000, d(2026, 10, 2), Some(rent.id)),
        (TransactionKind::Expense, 15_000, d(2026, 10, 5), Some(food.id)),
        (TransactionKind::Expense, 35_000, d(2026, 10, 6), None),
        (TransactionKind::Expense, 1_000, d(2026, 4, 6), None),
    ];
    for (kind, cents, on, category_id) in rows {
        let mut cmd = NewTransaction::new(alice, kind, Money::new(cents), on);
        if let Some(id) = category_id {
            cmd = cmd.category(id);
        }
        engine.create_transaction(cmd, at(2026, 10, 7)).await.unwrap();
    }
    engine
        .create_transaction(
            NewTransaction::new(bob, TransactionKind::Income, Money::new(999_999), d(2026, 10, 1)),
            at(2026, 10, 7),
        )
        .await
        .unwrap();

    engine
        .create_budget(NewBudget::new(alice, food.id, Money::new(20_000)), at(2026, 10, 1))
        .await
        .unwrap();
    let goal = engine
        .create_goal(NewGoal::new(alice, "Bike", Money::new(10_000), d(2026, 12, 31)), at(2026, 1, 1))
        .await
        .unwrap();
    engine
        .add_contribution(alice, goal.id, Money::new(2_500), at(2026, 10, 1))
        .await
        .unwrap();

    let dash = engine.dashboard(alice, d(2026, 10, 19)).await.unwrap();

    assert_eq!(dash.total_balance, Money::new(630_000 - 251_000));
    assert_eq!(dash.current_month.income, Money::new(330_000));
    assert_eq!(dash.current_month.expenses, Money::new(150_000));
    assert_eq!(dash.current_month.net, Money::new(180_000));
    assert_eq!(dash.previous_month.expenses, Money::new(100_000));
    assert_eq!(dash.income_change, Some(10.0));
    assert_eq!(dash.expense_change, Some(50.0));

    let breakdown: Vec<_> = dash
        .expense_breakdown
        .iter()
        .map(|s| (s.label.as_str(), s.total.cents()))
        .collect();
    assert_eq!(
        breakdown,
        vec![("Rent", 100_000), (UNCATEGORIZED_LABEL, 35_000), ("Food", 15_000)]
    );

    assert_eq!(dash.trend.len(), 6);
    // April falls outside the six-month window but still counts for the balance.
    assert_eq!(dash.trend[0].label, "May 2026");
    let trend_expenses: Money = dash.trend.iter().map(|p| p.expenses).sum();
    assert_eq!(trend_expenses, Money::new(250_000));

    let recent: Vec<_> = dash
        .recent_transactions
        .iter()
        .map(|e| e.transaction.occurred_on)
        .collect();
    assert_eq!(
        recent,
        vec![d(2026, 10, 6), d(2026, 10, 5), d(2026, 10, 2), d(2026, 10, 1), d(2026, 9, 2)]
    );

    assert_eq!(dash.top_budgets.len(), 1);
    assert_eq!(dash.top_budgets[0].spent, Money::new(15_000));
    assert_eq!(dash.top_goals[0].percentage, 25);
}

#[tokio::test]
async fn empty_dashboard_has_no_changes() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;

    let dash = engine.dashboard(alice, d(2026, 10, 19)).await.unwrap();
    assert_eq!(dash.total_balance, Money::ZERO);
    assert_eq!(dash.income_change, None);
    assert_eq!(dash.expense_change, None);
    assert!(dash.expense_breakdown.is_empty());
    assert!(dash.recent_transactions.is_empty());
    assert_eq!(dash.trend.len(), 6);
    assert!(dash.trend.iter().all(|p| p.income.is_zero() && p.expenses.is_zero()));
}

#[tokio::test]
async fn chart_endpoints_match_dashboard() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let food = category(&engine, alice, "Food", TransactionKind::Expense).await;
    engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Expense, Money::new(700), d(2026, 10, 31))
                .category(food.id),
            at(2026, 10, 31),
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Income, Money::new(900), d(2026, 5, 1)),
            at(2026, 5, 1),
        )
        .await
        .unwrap();

    let today = d(2026, 10, 19);
    let dash = engine.dashboard(alice, today).await.unwrap();
    assert_eq!(engine.category_chart(alice, today).await.unwrap(), dash.expense_breakdown);
    assert_eq!(engine.trend_chart(alice, today).await.unwrap(), dash.trend);
}
