//! Shared application state.
//!
//! Contains the state that is shared across all request handlers:
//! the configuration and the relay owning the upstream session.

use crate::config::ConfigV1;
use crate::relay::Relay;
use crate::upstream::UpstreamSession;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; both fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The add/reset flows and the single upstream session behind them.
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(config: Arc<ConfigV1>, session: Box<dyn UpstreamSession>) -> Self {
        AppState {
            config,
            relay: Arc::new(Relay::new(session)),
        }
    }
}
