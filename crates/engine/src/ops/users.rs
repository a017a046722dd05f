use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, NewUser, ResultEngine, Theme, User, users};

use super::{Engine, with_tx};

const MIN_PASSWORD_LEN: usize = 8;

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Internal(format!("failed to hash password: {err}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Runs password hashing off the async executor; argon2 is CPU and memory
/// heavy.
async fn blocking<T, F>(work: F) -> ResultEngine<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| EngineError::Internal(format!("password task failed: {err}")))
}

fn required_field(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}

fn validate_new_user(cmd: &NewUser) -> ResultEngine<()> {
    if cmd.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if cmd.password != cmd.password_confirm {
        return Err(EngineError::InvalidInput(
            "passwords do not match".to_string(),
        ));
    }
    let email = cmd.email.trim();
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(EngineError::InvalidInput("invalid email".to_string()));
    }
    Ok(())
}

impl Engine {
    /// Creates an account. Usernames are unique (case-sensitive).
    pub async fn register(&self, cmd: NewUser, now: DateTime<Utc>) -> ResultEngine<User> {
        let username = required_field(&cmd.username, "username")?;
        let email = required_field(&cmd.email, "email")?;
        let first_name = required_field(&cmd.first_name, "first name")?;
        let last_name = required_field(&cmd.last_name, "last name")?;
        validate_new_user(&cmd)?;
        let password = cmd.password.clone();
        let password_hash = blocking(move || hash_password(&password)).await??;

        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Username.eq(username.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(username));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                username: ActiveValue::Set(username.clone()),
                password_hash: ActiveValue::Set(password_hash),
                email: ActiveValue::Set(email),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                theme: ActiveValue::Set(Theme::default().as_str().to_string()),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(username = %username, "user registered");
            User::try_from(model)
        })
    }

    /// Checks a username/password pair. Unknown users and wrong passwords
    /// produce the same error.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.database)
            .await?;
        let rejected = || EngineError::Unauthorized("invalid username or password".to_string());
        let Some(model) = model else {
            return Err(rejected());
        };
        let password = password.to_string();
        let hash = model.password_hash.clone();
        if !blocking(move || verify_password(&password, &hash)).await? {
            return Err(rejected());
        }
        User::try_from(model)
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
            .and_then(User::try_from)
    }

    pub async fn user_by_username(&self, username: &str) -> ResultEngine<User> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(username.to_string()))
            .and_then(User::try_from)
    }

    pub async fn set_theme(&self, user_id: Uuid, theme: Theme) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            let mut active: users::ActiveModel = model.into();
            active.theme = ActiveValue::Set(theme.as_str().to_string());
            let model = active.update(&db_tx).await?;
            User::try_from(model)
        })
    }

    /// All accounts, oldest first.
    pub async fn list_users(&self) -> ResultEngine<Vec<User>> {
        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }
}
