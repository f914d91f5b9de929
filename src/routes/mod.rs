//! HTTP route definitions and handlers.
//!
//! Health probes, the protected relay endpoints, and a 404 for everything
//! else. Tracing and the bearer gate wrap all of them, fallback included.

mod health_routes;
mod item_routes;

use crate::auth::{require_bearer, trace_request};
use crate::state::AppState;
use crate::utils::http_helpers::RelayError;
use axum::{middleware, Router};

/// Creates the application router with all configured routes.
///
/// Dispatch order per request: tracing span, health bypass, token
/// configuration check, bearer check, then method + path.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes::routes())
        .merge(item_routes::routes())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .layer(middleware::from_fn(trace_request))
        .with_state(state)
}

/// Unknown paths, and unknown methods on known paths.
async fn not_found() -> RelayError {
    RelayError::NotFound
}
