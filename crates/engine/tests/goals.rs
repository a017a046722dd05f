mod common;

use engine::{EngineError, GoalUpdate, Money, NewGoal};

use common::{at, d, engine_with_db, insert_user};

#[tokio::test]
async fn contributions_accumulate_and_cap_display_percentage() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let goal = engine
        .create_goal(
            NewGoal::new(alice, "Bike", Money::new(50_000), d(2026, 12, 31)).color("#00ff00"),
            at(2026, 1, 1),
        )
        .await
        .unwrap();

    let progress = engine
        .add_contribution(alice, goal.id, Money::new(20_000), at(2026, 3, 1))
        .await
        .unwrap();
    assert_eq!(progress.saved, Money::new(20_000));
    assert_eq!(progress.percentage, 40);
    assert!(!progress.achieved);

    engine
        .add_contribution(alice, goal.id, Money::new(30_000), at(2026, 4, 1))
        .await
        .unwrap();
    let progress = engine
        .add_contribution(alice, goal.id, Money::new(10_000), at(2026, 5, 1))
        .await
        .unwrap();
    assert_eq!(progress.saved, Money::new(60_000));
    assert_eq!(progress.percentage, 100);
    assert!(progress.achieved);
    assert_eq!(progress.achieved_at, Some(at(2026, 4, 1)));
    assert_eq!(progress.remaining, Money::ZERO);
    assert_eq!(progress.contributions.len(), 3);

    let fetched = engine
        .goal_progress(alice, goal.id, d(2026, 12, 1))
        .await
        .unwrap();
    assert_eq!(fetched.saved, Money::new(60_000));
    assert_eq!(fetched.days_left, 30);
}

#[tokio::test]
async fn validation_errors() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;

    let err = engine
        .create_goal(NewGoal::new(alice, "Car", Money::ZERO, d(2027, 1, 1)), at(2026, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_goal(NewGoal::new(alice, "  ", Money::new(1), d(2027, 1, 1)), at(2026, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    let goal = engine
        .create_goal(NewGoal::new(alice, "Car", Money::new(100), d(2027, 1, 1)), at(2026, 1, 1))
        .await
        .unwrap();
    let err = engine
        .add_contribution(alice, goal.id, Money::new(-5), at(2026, 2, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn goals_are_scoped_to_owner() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let bob = insert_user(&db, "bob").await;
    let goal = engine
        .create_goal(NewGoal::new(alice, "Trip", Money::new(100), d(2027, 1, 1)), at(2026, 1, 1))
        .await
        .unwrap();

    assert!(matches!(
        engine.goal_progress(bob, goal.id, d(2026, 6, 1)).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .add_contribution(bob, goal.id, Money::new(5), at(2026, 2, 1))
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn update_and_delete_goal() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let goal = engine
        .create_goal(
            NewGoal::new(alice, "Trip", Money::new(100), d(2027, 1, 1)).description("Japan"),
            at(2026, 1, 1),
        )
        .await
        .unwrap();
    engine
        .add_contribution(alice, goal.id, Money::new(50), at(2026, 2, 1))
        .await
        .unwrap();

    let updated = engine
        .update_goal(
            alice,
            goal.id,
            GoalUpdate {
                name: Some("Big trip".to_string()),
                target: Some(Money::new(40)),
                description: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Big trip");
    assert_eq!(updated.description, None);

    let progress = engine
        .goal_progress(alice, goal.id, d(2026, 6, 1))
        .await
        .unwrap();
    assert!(progress.achieved);

    engine.delete_goal(alice, goal.id).await.unwrap();
    assert!(matches!(
        engine.goal_progress(alice, goal.id, d(2026, 6, 1)).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn overview_sums_goals_and_builds_history() {
    let (engine, db) = engine_with_db().await;
    let alice = insert_user(&db, "alice").await;
    let bike = engine
        .create_goal(NewGoal::new(alice, "Bike", Money::new(10_000), d(2026, 12, 31)), at(2026, 1, 1))
        .await
        .unwrap();
    let house = engine
        .create_goal(NewGoal::new(alice, "House", Money::new(90_000), d(2030, 1, 1)), at(2026, 1, 1))
        .await
        .unwrap();
    engine
        .add_contribution(alice, bike.id, Money::new(5_000), at(2026, 9, 10))
        .await
        .unwrap();
    engine
        .add_contribution(alice, house.id, Money::new(9_000), at(2026, 10, 10))
        .await
        .unwrap();

    let overview = engine.goal_overview(alice, d(2026, 10, 19)).await.unwrap();
    assert_eq!(overview.total_target, Money::new(100_000));
    assert_eq!(overview.total_saved, Money::new(14_000));
    assert!((overview.average_percentage - 30.0).abs() < f64::EPSILON);
    assert_eq!(overview.goals[0].goal.name, "Bike");

    let history = &overview.history;
    assert_eq!(history.labels.len(), 12);
    assert_eq!(history.labels[11], "Oct");
    let bike_series = &history.series[0].data;
    assert_eq!(bike_series[10], Money::new(5_000));
    assert_eq!(bike_series[9], Money::ZERO);
    let house_series = &history.series[1].data;
    assert_eq!(house_series[10], Money::ZERO);
    assert_eq!(house_series[11], Money::new(9_000));
}
