//! The add-item and reset flows against the single upstream session.
//!
//! Each request holds the session lock for its whole sequence
//! (login, add, and on a stale session one reset plus one retry), so two
//! requests never interleave session transitions and concurrent retries
//! cannot double-reset.

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::models::AddItemRequest;
use crate::upstream::{UpstreamError, UpstreamSession};
use crate::utils::http_helpers::RelayError;

/// Owns the upstream session and serializes access to it.
pub struct Relay {
    session: Mutex<Box<dyn UpstreamSession>>,
}

impl Relay {
    pub fn new(session: Box<dyn UpstreamSession>) -> Self {
        Relay {
            session: Mutex::new(session),
        }
    }

    /// Add the item named in `body` and return the upstream's answer text.
    ///
    /// Login failures win over a bad body. A session-invalid failure gets
    /// exactly one reset and one retry; any other failure is final.
    pub async fn add_item(&self, body: &[u8]) -> Result<String, RelayError> {
        let mut session = self.session.lock().await;

        if let Err(e) = session.login().await {
            error!(
                event_name = "relay.login.failed",
                event_domain = "relay",
                error = %e,
                "Login failed"
            );
            return Err(RelayError::LoginFailed);
        }

        let request = AddItemRequest::from_body(body)?;

        match session.add_query(&request.item).await {
            Ok(added) => {
                info!(event_name = "relay.add.ok", event_domain = "relay", "item added");
                Ok(added.result)
            }
            Err(UpstreamError::SessionInvalid(reason)) => {
                warn!(
                    event_name = "relay.add.session_invalid",
                    event_domain = "relay",
                    reason = %reason,
                    "Error while adding item, trying reset"
                );
                retry_after_reset(&mut **session, &request.item).await
            }
            Err(UpstreamError::Other(reason)) => {
                error!(
                    event_name = "relay.add.failed",
                    event_domain = "relay",
                    error = %reason,
                    "Unexpected error"
                );
                Err(RelayError::Unexpected)
            }
        }
    }

    /// Tear down and re-establish the upstream session. One attempt.
    pub async fn reset(&self) -> Result<(), RelayError> {
        let mut session = self.session.lock().await;
        session.reset().await.map_err(|e| {
            error!(
                event_name = "relay.reset.failed",
                event_domain = "relay",
                error = %e,
                "Error while resetting"
            );
            RelayError::ResetFailed
        })
    }
}

async fn retry_after_reset(
    session: &mut dyn UpstreamSession,
    item: &str,
) -> Result<String, RelayError> {
    if let Err(e) = session.reset().await {
        error!(
            event_name = "relay.retry.reset_failed",
            event_domain = "relay",
            error = %e,
            "Reset didn't work"
        );
        return Err(RelayError::RetryFailed);
    }

    match session.add_query(item).await {
        Ok(added) => {
            info!(
                event_name = "relay.retry.ok",
                event_domain = "relay",
                "item added after session reset"
            );
            Ok(added.result)
        }
        Err(e) => {
            error!(
                event_name = "relay.retry.failed",
                event_domain = "relay",
                error = %e,
                "Reset didn't work"
            );
            Err(RelayError::RetryFailed)
        }
    }
}
