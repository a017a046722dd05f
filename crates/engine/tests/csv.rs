mod common;

use engine::{
    EngineError, MAX_IMPORT_BYTES, Money, NewTransaction, Pagination, TransactionFilter,
    TransactionKind,
};

use common::{at, category, d, engine_with_db, insert_user};

#[tokio::test]
async fn export_then_import_round_trips() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let food = category(&engine, alice, "Food, drinks", TransactionKind::Expense).await;
    let salary = category(&engine, alice, "Salary", TransactionKind::Income).await;

    let inputs = [
        NewTransaction::new(alice, TransactionKind::Expense, Money::new(1_250), d(2026, 10, 3))
            .category(food.id)
            .note("pizza \"margherita\""),
        NewTransaction::new(alice, TransactionKind::Income, Money::new(300_000), d(2026, 10, 1))
            .category(salary.id),
        NewTransaction::new(alice, TransactionKind::Expense, Money::new(7), d(2026, 9, 30))
            .note("line\nbreak"),
    ];
    for cmd in inputs {
        engine.create_transaction(cmd, at(2026, 10, 3)).await.unwrap();
    }

    let exported = engine
        .export_csv(alice, &TransactionFilter::default())
        .await
        .unwrap();
    let text = String::from_utf8(exported.clone()).unwrap();
    assert!(text.starts_with("date,type,category,amount,note\n2026-10-03,expense,"));

    // Import into a second user that has the same categories.
    let bob = insert_user(&db, "bob").await;
    category(&engine, bob, "food, DRINKS", TransactionKind::Expense).await;
    category(&engine, bob, "Salary", TransactionKind::Income).await;
    let summary = engine.import_csv(bob, &exported, at(2026, 10, 4)).await.unwrap();
    assert_eq!(summary.imported, 3);

    let key = |page: engine::TransactionPage| {
        page.items
            .into_iter()
            .map(|e| {
                (
                    e.transaction.occurred_on,
                    e.transaction.kind,
                    e.transaction.amount,
                    e.transaction.note,
                    e.category.map(|c| c.kind),
                )
            })
            .collect::<Vec<_>>()
    };
    let original = engine
        .list_transactions(alice, &TransactionFilter::default(), Pagination::default())
        .await
        .unwrap();
    let imported = engine
        .list_transactions(bob, &TransactionFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(key(original), key(imported));

    let reexported = engine
        .export_csv(bob, &TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(reexported).unwrap(),
        text.replace("Food, drinks", "food, DRINKS")
    );
}

#[tokio::test]
async fn import_is_all_or_nothing() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    category(&engine, alice, "Food", TransactionKind::Expense).await;

    let input = b"date,type,category,amount,note\n\
2026-10-01,expense,Food,10.00,ok\n\
2026-10-02,expense,Travel,5.00,\n\
2026-10-03,income,Food,5.00,\n\
not-a-date,expense,,1,\n";
    let err = engine
        .import_csv(alice, input, at(2026, 10, 4))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ImportRejected(vec![
            "Row 3: unknown expense category 'Travel'".to_string(),
            "Row 4: unknown income category 'Food'".to_string(),
            "Row 5: invalid date 'not-a-date'".to_string(),
        ])
    );

    let page = engine
        .list_transactions(alice, &TransactionFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 0);
}

#[tokio::test]
async fn import_rejects_empty_and_oversized_input() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;

    let err = engine
        .import_csv(alice, b"date,type,category,amount,note\n", at(2026, 10, 4))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ImportRejected(vec!["no transactions found in the CSV file".to_string()])
    );

    let big = vec![b'a'; MAX_IMPORT_BYTES + 1];
    assert!(matches!(
        engine.import_csv(alice, &big, at(2026, 10, 4)).await,
        Err(EngineError::ImportRejected(_))
    ));
}

#[tokio::test]
async fn import_accepts_alternative_formats() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;

    let input = b"date,type,category,amount,note\n\
10/19/2026,Income,,\"1.234,5\",\n\
2026/10/18,EXPENSE,,\"2,50\",\n";
    // "1.234,5" is not a valid amount; only the comma decimal form is.
    assert!(engine.import_csv(alice, input, at(2026, 10, 20)).await.is_err());

    let input = b"date,type,category,amount,note\n\
10/19/2026,Income,,12,\n\
2026/10/18,EXPENSE,,\"2,50\",\n";
    let summary = engine
        .import_csv(alice, input, at(2026, 10, 20))
        .await
        .unwrap();
    assert_eq!(summary.imported, 2);

    let page = engine
        .list_transactions(alice, &TransactionFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].transaction.occurred_on, d(2026, 10, 19));
    assert_eq!(page.items[1].transaction.amount, Money::new(250));
    assert_eq!(page.totals.net(), Money::new(950));
}

#[tokio::test]
async fn export_honors_filters() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    for (kind, day) in [
        (TransactionKind::Income, 1),
        (TransactionKind::Expense, 2),
        (TransactionKind::Expense, 20),
    ] {
        engine
            .create_transaction(
                NewTransaction::new(alice, kind, Money::new(100), d(2026, 10, day)),
                at(2026, 10, day),
            )
            .await
            .unwrap();
    }

    let out = engine
        .export_csv(
            alice,
            &TransactionFilter {
                to: Some(d(2026, 10, 10)),
                kind: Some(TransactionKind::Expense),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "date,type,category,amount,note\n2026-10-02,expense,,1.00,\n"
    );
}
