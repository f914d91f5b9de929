//! Middleware in front of every route: request tracing and the bearer gate.

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use super::bearer::authorize;
use crate::state::AppState;

/// Liveness paths answered without credentials.
pub const HEALTH_PATHS: [&str; 3] = ["/", "/health", "/healthz"];

/// Platform warm-up probes: `GET`/`HEAD` on one of the health paths.
pub fn is_health_probe(method: &Method, path: &str) -> bool {
    (method == Method::GET || method == Method::HEAD) && HEALTH_PATHS.contains(&path)
}

/// Runs the rest of the stack inside a `request` span with a fresh id.
pub async fn trace_request(request: Request, next: Next) -> Response {
    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path()
    );
    async move {
        let response = next.run(request).await;
        debug!(status = response.status().as_u16(), "request finished");
        response
    }
    .instrument(span)
    .await
}

/// Health probes pass straight through. Everything else needs a configured
/// token and a matching `Authorization: Bearer` header before routing,
/// including paths that end up as 404.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_health_probe(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match authorize(header, state.config.expected_token()) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
