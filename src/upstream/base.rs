use async_trait::async_trait;
use thiserror::Error;

/// How an upstream operation failed. Only `SessionInvalid` is worth a reset
/// and one more attempt; everything else is final.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The session went stale: CSRF token mismatch or permission denied.
    #[error("session invalid: {0}")]
    SessionInvalid(String),
    #[error("{0}")]
    Other(String),
}

/// What the upstream answered to an added item, relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddResult {
    pub result: String,
}

/// An authenticated session against the grocery-list service.
///
/// Implementations own their session state. Callers serialize access, so the
/// methods take `&mut self`.
#[async_trait]
pub trait UpstreamSession: Send + Sync {
    /// Establish the session if there is none yet. A no-op when logged in.
    async fn login(&mut self) -> Result<(), UpstreamError>;

    /// Add a free-text item to the grocery list.
    async fn add_query(&mut self, text: &str) -> Result<AddResult, UpstreamError>;

    /// Tear the session down and establish a fresh one.
    async fn reset(&mut self) -> Result<(), UpstreamError>;
}
