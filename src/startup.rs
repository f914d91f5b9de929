//! Application startup and server initialization.
//!
//! Builds the upstream session client and the router, then binds the
//! listener from the configuration and serves until the process ends.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ConfigV1;
use crate::routes;
use crate::state::AppState;
use crate::upstream::MealimeClient;

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the upstream client cannot be built, the listener
/// cannot bind to the configured address, or the server fails while running.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let session = MealimeClient::new(&config.upstream)?;
    if config.expected_token().is_none() {
        warn!("TOKEN is not configured; protected routes will answer 500");
    }

    let state = AppState::new(config.clone(), Box::new(session));
    let app = routes::create_router(state);

    let bind_address = config.bind_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|e| format!("Could not bind to {}: {}", bind_address, e))?;

    info!("HTTP webserver running. Listening on {}", bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
