mod common;

use engine::{
    EngineError, Money, NewBudget, NewGoal, NewTransaction, Pagination, TransactionFilter,
    TransactionKind, TransactionUpdate,
};
use uuid::Uuid;

use common::{at, category, d, engine_with_db, insert_user};

#[tokio::test]
async fn create_and_get_transaction_with_category() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let food = category(&engine, alice, "Food", TransactionKind::Expense).await;

    let tx = engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Expense, Money::new(1_250), d(2026, 10, 3))
                .category(food.id)
                .note("  pizza  "),
            at(2026, 10, 3),
        )
        .await
        .unwrap();
    assert_eq!(tx.note.as_deref(), Some("pizza"));

    let entry = engine.transaction(alice, tx.id).await.unwrap();
    assert_eq!(entry.transaction, tx);
    assert_eq!(entry.category.map(|c| c.name), Some("Food".to_string()));
}

#[tokio::test]
async fn rejects_non_positive_amounts() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;

    for cents in [0, -100] {
        let err = engine
            .create_transaction(
                NewTransaction::new(alice, TransactionKind::Income, Money::new(cents), d(2026, 10, 1)),
                at(2026, 10, 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}

#[tokio::test]
async fn rejects_other_users_category_and_type_mismatch() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;
    let bobs_food = category(&engine, bob, "Food", TransactionKind::Expense).await;
    let salary = category(&engine, alice, "Salary", TransactionKind::Income).await;

    let foreign = engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Expense, Money::new(100), d(2026, 10, 1))
                .category(bobs_food.id),
            at(2026, 10, 1),
        )
        .await
        .unwrap_err();
    assert_eq!(foreign, EngineError::InvalidCategory("unknown category".to_string()));

    let mismatch = engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Expense, Money::new(100), d(2026, 10, 1))
                .category(salary.id),
            at(2026, 10, 1),
        )
        .await
        .unwrap_err();
    assert!(matches!(mismatch, EngineError::InvalidCategory(_)));

    let missing = engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Expense, Money::new(100), d(2026, 10, 1))
                .category(Uuid::new_v4()),
            at(2026, 10, 1),
        )
        .await
        .unwrap_err();
    assert_eq!(missing, foreign);
}

#[tokio::test]
async fn other_users_transactions_are_not_found() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;
    let tx = engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Income, Money::new(100), d(2026, 10, 1)),
            at(2026, 10, 1),
        )
        .await
        .unwrap();

    let not_found = EngineError::KeyNotFound("transaction not exists".to_string());
    assert_eq!(engine.transaction(bob, tx.id).await.unwrap_err(), not_found);
    assert_eq!(
        engine.delete_transaction(bob, tx.id).await.unwrap_err(),
        not_found
    );
    assert_eq!(
        engine
            .transaction(alice, Uuid::new_v4())
            .await
            .unwrap_err(),
        not_found
    );
    assert!(engine.transaction(alice, tx.id).await.is_ok());
}

#[tokio::test]
async fn update_checks_category_against_new_type() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let food = category(&engine, alice, "Food", TransactionKind::Expense).await;
    let salary = category(&engine, alice, "Salary", TransactionKind::Income).await;

    let tx = engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Expense, Money::new(500), d(2026, 10, 1))
                .category(food.id)
                .note("groceries"),
            at(2026, 10, 1),
        )
        .await
        .unwrap();

    let err = engine
        .update_transaction(
            alice,
            tx.id,
            TransactionUpdate {
                kind: Some(TransactionKind::Income),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCategory(_)));

    let updated = engine
        .update_transaction(
            alice,
            tx.id,
            TransactionUpdate {
                kind: Some(TransactionKind::Income),
                category_id: Some(Some(salary.id)),
                amount: Some(Money::new(900)),
                note: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.kind, TransactionKind::Income);
    assert_eq!(updated.category_id, Some(salary.id));
    assert_eq!(updated.amount, Money::new(900));
    assert_eq!(updated.note, None);

    let cleared = engine
        .update_transaction(
            alice,
            tx.id,
            TransactionUpdate {
                category_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.category_id, None);
}

#[tokio::test]
async fn list_filters_paginates_and_totals_whole_set() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;
    let food = category(&engine, alice, "Food", TransactionKind::Expense).await;

    for day in 1..=9 {
        engine
            .create_transaction(
                NewTransaction::new(alice, TransactionKind::Expense, Money::new(100), d(2026, 10, day))
                    .category(food.id),
                at(2026, 10, day),
            )
            .await
            .unwrap();
    }
    engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Income, Money::new(5_000), d(2026, 10, 5)),
            at(2026, 10, 5),
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            NewTransaction::new(bob, TransactionKind::Income, Money::new(7_777), d(2026, 10, 5)),
            at(2026, 10, 5),
        )
        .await
        .unwrap();

    let all = engine
        .list_transactions(alice, &TransactionFilter::default(), Pagination::new(Some(1), Some(4)))
        .await
        .unwrap();
    assert_eq!(all.total_items, 10);
    assert_eq!(all.total_pages, 3);
    assert_eq!(all.items.len(), 4);
    assert_eq!(all.items[0].transaction.occurred_on, d(2026, 10, 9));
    assert_eq!(all.totals.income, Money::new(5_000));
    assert_eq!(all.totals.expenses, Money::new(900));
    assert_eq!(all.totals.net(), Money::new(4_100));

    let past_end = engine
        .list_transactions(alice, &TransactionFilter::default(), Pagination::new(Some(99), Some(4)))
        .await
        .unwrap();
    assert_eq!(past_end.page, 3);
    assert_eq!(past_end.items.len(), 2);

    let filtered = engine
        .list_transactions(
            alice,
            &TransactionFilter {
                from: Some(d(2026, 10, 3)),
                to: Some(d(2026, 10, 5)),
                kind: Some(TransactionKind::Expense),
                category_id: Some(food.id),
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(filtered.total_items, 3);
    assert_eq!(filtered.totals.expenses, Money::new(300));
    assert_eq!(filtered.totals.income, Money::ZERO);
}

#[tokio::test]
async fn deleting_category_uncategorizes_transactions() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let food = category(&engine, alice, "Food", TransactionKind::Expense).await;
    let tx = engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Expense, Money::new(300), d(2026, 10, 1))
                .category(food.id),
            at(2026, 10, 1),
        )
        .await
        .unwrap();

    engine.delete_category(alice, food.id).await.unwrap();

    let entry = engine.transaction(alice, tx.id).await.unwrap();
    assert_eq!(entry.transaction.category_id, None);
    assert_eq!(entry.category, None);
    assert!(matches!(
        engine.category(alice, food.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn amounts_above_the_maximum_are_rejected() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let food = category(&engine, alice, "Food", TransactionKind::Expense).await;
    let too_large = Money::new(Money::MAX.cents() + 1);

    for amount in [too_large, Money::new(i64::MAX / 2 + 1)] {
        let err = engine
            .create_transaction(
                NewTransaction::new(alice, TransactionKind::Income, amount, d(2026, 10, 1)),
                at(2026, 10, 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    let tx = engine
        .create_transaction(
            NewTransaction::new(alice, TransactionKind::Income, Money::MAX, d(2026, 10, 1)),
            at(2026, 10, 1),
        )
        .await
        .unwrap();
    let err = engine
        .update_transaction(
            alice,
            tx.id,
            TransactionUpdate {
                amount: Some(too_large),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_budget(NewBudget::new(alice, food.id, too_large), at(2026, 10, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_goal(NewGoal::new(alice, "Island", too_large, d(2027, 1, 1)), at(2026, 10, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let goal = engine
        .create_goal(NewGoal::new(alice, "Boat", Money::MAX, d(2027, 1, 1)), at(2026, 10, 1))
        .await
        .unwrap();
    let err = engine
        .add_contribution(alice, goal.id, too_large, at(2026, 10, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn largest_amounts_aggregate_exactly() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;

    for (kind, count) in [(TransactionKind::Income, 30), (TransactionKind::Expense, 12)] {
        for _ in 0..count {
            engine
                .create_transaction(
                    NewTransaction::new(alice, kind, Money::MAX, d(2026, 10, 3)),
                    at(2026, 10, 3),
                )
                .await
                .unwrap();
        }
    }

    let page = engine
        .list_transactions(alice, &TransactionFilter::default(), Pagination::new(Some(2), Some(25)))
        .await
        .unwrap();
    assert_eq!(page.total_items, 42);
    assert_eq!(page.items.len(), 17);
    assert_eq!(page.totals.income, Money::new(Money::MAX.cents() * 30));
    assert_eq!(page.totals.expenses, Money::new(Money::MAX.cents() * 12));

    let dash = engine.dashboard(alice, d(2026, 10, 19)).await.unwrap();
    assert_eq!(dash.total_balance, Money::new(Money::MAX.cents() * 18));
    assert_eq!(dash.current_month.net, Money::new(Money::MAX.cents() * 18));
}

#[tokio::test]
async fn listing_orders_same_day_entries_by_creation_time() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;

    for (cents, hour_day) in [(1, 1), (3, 3), (2, 2)] {
        engine
            .create_transaction(
                NewTransaction::new(alice, TransactionKind::Expense, Money::new(cents), d(2026, 10, 5)),
                at(2026, 10, hour_day),
            )
            .await
            .unwrap();
    }

    let page = engine
        .list_transactions(alice, &TransactionFilter::default(), Pagination::default())
        .await
        .unwrap();
    let amounts: Vec<i64> = page
        .items
        .iter()
        .map(|entry| entry.transaction.amount.cents())
        .collect();
    assert_eq!(amounts, vec![3, 2, 1]);
}
