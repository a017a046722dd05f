//! Categories API endpoints.

use api_types::category::{
    CategoryCreate, CategoryList, CategoryListResponse, CategoryUpdate, CategoryView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{NewCategory, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<CategoryList>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories(user.id, query.kind.map(views::kind_from_api))
        .await?
        .into_iter()
        .map(views::category_stats)
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let mut cmd = NewCategory::new(user.id, payload.name, views::kind_from_api(payload.kind));
    cmd.icon = payload.icon;
    cmd.color = payload.color;
    cmd.description = payload.description;

    let category = state.engine.create_category(cmd).await?;
    Ok((StatusCode::CREATED, Json(views::category(category))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(user.id, id).await?;
    Ok(Json(views::category(category)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(
            user.id,
            id,
            engine::CategoryUpdate {
                name: payload.name,
                kind: payload.kind.map(views::kind_from_api),
                icon: payload.icon,
                color: payload.color,
                description: payload.description,
            },
        )
        .await?;
    Ok(Json(views::category(category)))
}

/// Transactions of the category become uncategorized; its budgets are removed.
pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
