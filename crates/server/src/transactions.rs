//! Transactions API endpoints

use api_types::transaction::{
    ImportResponse, TransactionList, TransactionListResponse, TransactionNew, TransactionUpdate,
    TransactionView,
};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use engine::{Money, NewTransaction, Pagination, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let page = state
        .engine
        .list_transactions(
            user.id,
            &views::filter(&query),
            Pagination::new(query.page, query.page_size),
        )
        .await?;
    Ok(Json(views::transaction_page(page)))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = NewTransaction::new(
        user.id,
        views::kind_from_api(payload.kind),
        Money::new(payload.amount_minor),
        payload.occurred_on,
    );
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category(category_id);
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let engine = &state.engine;
    let tx = engine.create_transaction(cmd, Utc::now()).await?;
    let entry = engine.transaction(user.id, tx.id).await?;
    Ok((StatusCode::CREATED, Json(views::transaction(entry))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let entry = state.engine.transaction(user.id, id).await?;
    Ok(Json(views::transaction(entry)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let engine = &state.engine;
    engine
        .update_transaction(
            user.id,
            id,
            engine::TransactionUpdate {
                kind: payload.kind.map(views::kind_from_api),
                amount: payload.amount_minor.map(Money::new),
                occurred_on: payload.occurred_on,
                category_id: payload.category_id,
                note: payload.note,
            },
        )
        .await?;
    let entry = engine.transaction(user.id, id).await?;
    Ok(Json(views::transaction(entry)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// CSV download of the filtered transactions; paging parameters are ignored.
pub async fn export(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<impl IntoResponse, ServerError> {
    let csv = state
        .engine
        .export_csv(user.id, &views::filter(&query))
        .await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    ))
}

/// Raw CSV in the request body.
pub async fn import(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportResponse>), ServerError> {
    let summary = state
        .engine
        .import_csv(user.id, &body, Utc::now())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            imported: summary.imported,
        }),
    ))
}
