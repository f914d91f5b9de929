//! Health check endpoints.

use super::not_found;
use crate::auth::HEALTH_PATHS;
use crate::state::AppState;
use axum::{routing::get, Router};

/// Registers the liveness probes. `get` also answers `HEAD`.
pub fn routes() -> Router<AppState> {
    HEALTH_PATHS.iter().fold(Router::new(), |router, path| {
        router.route(path, get(health_check).fallback(not_found))
    })
}

/// Returns 200 `ok` to show the service is running.
async fn health_check() -> &'static str {
    "ok"
}
