#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Category, Engine, NewCategory, TransactionKind};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Inserts a user row directly, skipping password hashing.
pub async fn insert_user(db: &DatabaseConnection, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, username, password_hash, email, first_name, last_name, theme, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            id.into(),
            username.into(),
            "not-a-hash".into(),
            format!("{username}@example.com").into(),
            username.into(),
            "Test".into(),
            "light".into(),
            at(2026, 1, 1).into(),
        ],
    ))
    .await
    .unwrap();
    id
}

pub async fn category(engine: &Engine, user_id: Uuid, name: &str, kind: TransactionKind) -> Category {
    engine
        .create_category(NewCategory::new(user_id, name, kind))
        .await
        .unwrap()
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn at(y: i32, m: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, day, 12, 0, 0).unwrap()
}
