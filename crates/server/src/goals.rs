//! Savings goals API endpoints.

use api_types::goal::{ContributionNew, GoalNew, GoalOverviewResponse, GoalUpdate, GoalView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Money, NewGoal, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn overview(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<GoalOverviewResponse>, ServerError> {
    let overview = state
        .engine
        .goal_overview(user.id, Utc::now().date_naive())
        .await?;
    Ok(Json(views::goal_overview(overview)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalView>), ServerError> {
    let mut cmd = NewGoal::new(
        user.id,
        payload.name,
        Money::new(payload.target_minor),
        payload.deadline,
    );
    cmd.description = payload.description;
    cmd.icon = payload.icon;
    cmd.color = payload.color;

    let now = Utc::now();
    let engine = &state.engine;
    let goal = engine.create_goal(cmd, now).await?;
    let progress = engine
        .goal_progress(user.id, goal.id, now.date_naive())
        .await?;
    Ok((StatusCode::CREATED, Json(views::goal(progress))))
}

pub async fn progress(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalView>, ServerError> {
    let progress = state
        .engine
        .goal_progress(user.id, id, Utc::now().date_naive())
        .await?;
    Ok(Json(views::goal(progress)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoalUpdate>,
) -> Result<Json<GoalView>, ServerError> {
    let engine = &state.engine;
    engine
        .update_goal(
            user.id,
            id,
            engine::GoalUpdate {
                name: payload.name,
                target: payload.target_minor.map(Money::new),
                deadline: payload.deadline,
                description: payload.description,
                icon: payload.icon,
                color: payload.color,
            },
        )
        .await?;
    let progress = engine
        .goal_progress(user.id, id, Utc::now().date_naive())
        .await?;
    Ok(Json(views::goal(progress)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_goal(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn contribute(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContributionNew>,
) -> Result<(StatusCode, Json<GoalView>), ServerError> {
    let progress = state
        .engine
        .add_contribution(user.id, id, Money::new(payload.amount_minor), Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(views::goal(progress))))
}
