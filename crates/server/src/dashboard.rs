//! Dashboard API endpoints

use api_types::dashboard::{CategoryChartResponse, DashboardResponse, TrendChartResponse};
use axum::{Extension, Json, extract::State};
use chrono::Utc;
use engine::User;

use crate::{ServerError, server::ServerState, views};

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<DashboardResponse>, ServerError> {
    let dash = state
        .engine
        .dashboard(user.id, Utc::now().date_naive())
        .await?;
    Ok(Json(views::dashboard(dash)))
}

pub async fn categories(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryChartResponse>, ServerError> {
    let slices = state
        .engine
        .category_chart(user.id, Utc::now().date_naive())
        .await?
        .into_iter()
        .map(views::slice)
        .collect();
    Ok(Json(CategoryChartResponse { slices }))
}

pub async fn trend(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<TrendChartResponse>, ServerError> {
    let points = state
        .engine
        .trend_chart(user.id, Utc::now().date_naive())
        .await?
        .into_iter()
        .map(views::trend_point)
        .collect();
    Ok(Json(TrendChartResponse { points }))
}
