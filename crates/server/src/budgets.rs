//! Budgets API endpoints.

use api_types::budget::{BudgetNew, BudgetOverviewResponse, BudgetUpdate, BudgetView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Money, NewBudget, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn overview(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetOverviewResponse>, ServerError> {
    let overview = state
        .engine
        .budget_overview(user.id, Utc::now().date_naive())
        .await?;
    Ok(Json(views::budget_overview(overview)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let mut cmd = NewBudget::new(user.id, payload.category_id, Money::new(payload.limit_minor));
    if let Some(period) = payload.period {
        cmd = cmd.period(views::period_from_api(period));
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let now = Utc::now();
    let engine = &state.engine;
    let budget = engine.create_budget(cmd, now).await?;
    let report = engine
        .budget_report(user.id, budget.id, now.date_naive())
        .await?;
    Ok((StatusCode::CREATED, Json(views::budget(report))))
}

pub async fn report(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let report = state
        .engine
        .budget_report(user.id, id, Utc::now().date_naive())
        .await?;
    Ok(Json(views::budget(report)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let engine = &state.engine;
    engine
        .update_budget(
            user.id,
            id,
            engine::BudgetUpdate {
                category_id: payload.category_id,
                limit: payload.limit_minor.map(Money::new),
                period: payload.period.map(views::period_from_api),
                description: payload.description,
            },
        )
        .await?;
    let report = engine
        .budget_report(user.id, id, Utc::now().date_naive())
        .await?;
    Ok(Json(views::budget(report)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
