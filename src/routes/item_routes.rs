//! The protected relay endpoints.

use axum::body::Bytes;
use axum::extract::State;
use axum::{routing::post, Router};

use super::not_found;
use crate::state::AppState;
use crate::utils::http_helpers::RelayError;

/// Registers `POST /add` and `POST /reset`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_item).fallback(not_found))
        .route("/reset", post(reset_session).fallback(not_found))
}

/// Adds `{"item": ...}` to the grocery list; answers with the upstream's text.
/// The body is taken raw so that a failed login is reported before a bad body.
/// Bodies over axum's default 2 MB limit are refused with 413 before any login.
async fn add_item(State(state): State<AppState>, body: Bytes) -> Result<String, RelayError> {
    state.relay.add_item(&body).await
}

async fn reset_session(State(state): State<AppState>) -> Result<&'static str, RelayError> {
    state.relay.reset().await?;
    Ok("OK")
}
