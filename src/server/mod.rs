mod handlers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::error::Error;
use crate::Tracker;

/// Default listen address for `serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:8001";

pub struct AppState {
    pub tracker: Tracker,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Crate error carried out of a handler.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("request failed: {}", self.0);
        } else {
            log::warn!("request rejected: {}", self.0);
        }
        let body = ErrorBody {
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// All routes, nested under `/api`.
pub fn router(tracker: Tracker) -> Router {
    let state = Arc::new(AppState { tracker });

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/users", post(handlers::create_user).get(handlers::list_users))
        .route("/users/{id}", get(handlers::get_user))
        .route("/tasks", post(handlers::create_task).get(handlers::list_tasks))
        .route(
            "/tasks/{id}",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route(
            "/time-entries",
            post(handlers::create_time_entry).get(handlers::list_time_entries),
        )
        .route("/goals", post(handlers::create_goal).get(handlers::list_goals))
        .route(
            "/standups",
            post(handlers::create_standup).get(handlers::list_standups),
        )
        .route("/analytics/team-overview", get(handlers::team_overview))
        .route(
            "/analytics/individual-performance",
            get(handlers::individual_performance),
        )
        .route(
            "/analytics/productivity-trends",
            get(handlers::productivity_trends),
        )
        .route("/analytics/team-leaderboard", get(handlers::team_leaderboard))
        .route("/init-sample-data", post(handlers::init_sample_data))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until the process is interrupted.
pub async fn serve(tracker: Tracker, addr: &str) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Config(format!("cannot bind {addr}: {e}")))?;
    log::info!("Listening on http://{addr}");

    axum::serve(listener, router(tracker))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Other(e.to_string()))?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
