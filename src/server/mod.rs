//! HTTP API
//!
//! | Route                     | Purpose                                   |
//! |---------------------------|-------------------------------------------|
//! | `POST /query`             | classify and submit a command             |
//! | `POST /approve`           | approve or reject a pending request       |
//! | `GET /pending-approvals`  | list requests awaiting a decision         |
//! | `GET /health`             | liveness plus collection and queue sizes  |
//! | `GET /data/users`         | dump the users collection                 |
//! | `GET /data/projects`      | dump the projects collection              |

pub mod errors;
pub mod handlers;
pub mod models;

use axum::http::HeaderMap;
use axum::middleware::{from_fn, Next};
use axum::routing::{get, post};
use axum::Router;

pub use errors::ApiError;

use crate::core::{GatekeeperError, GatekeeperResult};
use crate::service::Gatekeeper;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared handler state
#[derive(Clone, Debug)]
pub struct AppState {
    pub gatekeeper: Gatekeeper,
}

impl AppState {
    pub fn new(gatekeeper: Gatekeeper) -> Self {
        Self { gatekeeper }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/query", post(handlers::query))
        .route("/approve", post(handlers::approve))
        .route("/pending-approvals", get(handlers::pending_approvals))
        .route("/health", get(handlers::health))
        .route("/data/users", get(handlers::users))
        .route("/data/projects", get(handlers::projects))
        .layer(from_fn(request_log_middleware))
        .with_state(state)
}

/// Bind `addr` and serve until ctrl-c
pub async fn serve(gatekeeper: Gatekeeper, addr: &str) -> GatekeeperResult<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("Gatekeeper listening on http://{}", local);

    axum::serve(listener, build_router(AppState::new(gatekeeper)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| GatekeeperError::other(format!("server error: {}", err)))?;

    tracing::info!("Gatekeeper stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

async fn request_log_middleware(
    headers: HeaderMap,
    request: axum::extract::Request,
    next: Next,
) -> axum::response::Response {
    let rid = request_id(&headers);
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = std::time::Instant::now();

    let response = next.run(request).await;
    tracing::info!(
        request_id = %rid,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "HTTP request"
    );
    response
}
