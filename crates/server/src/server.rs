use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{ServerError, budgets, categories, dashboard, goals, transactions, user};
use engine::{Engine, EngineError, MAX_IMPORT_BYTES};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the Basic credentials to a user and stores it in the request
/// extensions for the handlers.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(EngineError::Unauthorized("missing credentials".to_string()).into());
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(EngineError::Unauthorized("missing credentials".to_string()).into());
    }

    let user = state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn protected(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/auth/login", post(user::login))
        .route("/auth/logout", post(user::logout))
        .route("/user/theme", put(user::set_theme))
        .route("/dashboard", get(dashboard::summary))
        .route("/dashboard/charts/categories", get(dashboard::categories))
        .route("/dashboard/charts/trend", get(dashboard::trend))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/export", get(transactions::export))
        .route(
            "/transactions/import",
            post(transactions::import).layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES)),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get)
                .patch(categories::update)
                .delete(categories::delete),
        )
        .route("/budgets", get(budgets::overview).post(budgets::create))
        .route(
            "/budgets/{id}",
            get(budgets::report)
                .patch(budgets::update)
                .delete(budgets::delete),
        )
        .route("/goals", get(goals::overview).post(goals::create))
        .route(
            "/goals/{id}",
            get(goals::progress).patch(goals::update).delete(goals::delete),
        )
        .route("/goals/{id}/contributions", post(goals::contribute))
        .route_layer(middleware::from_fn_with_state(state, auth))
}

/// The whole HTTP API. Everything but registration requires Basic auth.
pub fn app(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/auth/register", post(user::register))
        .merge(protected(state.clone()))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
