use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Every way a relay request can end badly. The `Display` text is exactly
/// what the caller receives; upstream detail is logged where it happens and
/// never carried in here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Body of `/add` failed validation; lists every violation.
    #[error("{0}")]
    Validation(String),
    #[error("Not Authorized")]
    Unauthorized,
    /// No bearer token configured: protected routes fail closed.
    #[error("Server misconfigured")]
    Misconfigured,
    #[error("Login failed")]
    LoginFailed,
    /// The reset-and-retry after a stale session did not work out.
    #[error("Reset didn't work")]
    RetryFailed,
    /// An explicit `/reset` failed.
    #[error("NOK")]
    ResetFailed,
    #[error("Unexpected error")]
    Unexpected,
    #[error("Not Found")]
    NotFound,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::Misconfigured
            | RelayError::LoginFailed
            | RelayError::RetryFailed
            | RelayError::ResetFailed
            | RelayError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts a `RelayError` into a plain-text response with the matching status.
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn statuses_follow_the_error_class() {
        assert_eq!(
            RelayError::Validation("item: Required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RelayError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(RelayError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RelayError::Misconfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::RetryFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn response_body_is_plain_text() {
        let response = RelayError::RetryFailed.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Reset didn't work");
    }
}
