//! Account endpoints.
//!
//! There are no sessions: every request carries Basic credentials, so login
//! only checks them and logout has nothing to tear down.

use api_types::user::{Register, ThemeUpdate, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use engine::{NewUser, User};

use crate::{ServerError, server::ServerState, views};

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Register>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let cmd = NewUser::new(payload.username, payload.password)
        .password_confirm(payload.password_confirm)
        .email(payload.email)
        .names(payload.first_name, payload.last_name);
    let user = state.engine.register(cmd, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(views::user(user))))
}

pub async fn login(Extension(user): Extension<User>) -> Json<UserView> {
    tracing::info!(username = %user.username, "user logged in");
    Json(views::user(user))
}

pub async fn logout(Extension(_): Extension<User>) -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn set_theme(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ThemeUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .set_theme(user.id, views::theme_from_api(payload.theme))
        .await?;
    Ok(Json(views::user(user)))
}
