use tracing::{info, warn};

use crate::utils::http_helpers::RelayError;

const BEARER_PREFIX: &str = "bearer ";

/// Decides whether a request may reach the protected routes.
///
/// `header` is the raw `Authorization` value, if any; `expected` the
/// configured token, if any. An unset or empty `expected` is a server
/// misconfiguration and is reported before anything is compared, so an
/// empty credential can never match an empty secret.
pub fn authorize(header: Option<&str>, expected: Option<&str>) -> Result<(), RelayError> {
    let expected = match expected {
        Some(token) if !token.is_empty() => token,
        _ => {
            warn!(
                event_name = "auth.misconfigured",
                event_domain = "auth",
                "no bearer token configured, refusing protected route"
            );
            return Err(RelayError::Misconfigured);
        }
    };

    let Some(provided) = header.and_then(strip_bearer) else {
        info!(
            event_name = "auth.denied",
            event_domain = "auth",
            reason = "missing_or_malformed",
            "Request does not include a valid Bearer auth header"
        );
        return Err(RelayError::Unauthorized);
    };

    if provided.trim() != expected {
        info!(
            event_name = "auth.denied",
            event_domain = "auth",
            reason = "token_mismatch",
            "Request does not include the right auth token"
        );
        return Err(RelayError::Unauthorized);
    }

    Ok(())
}

/// The part after a case-insensitive `Bearer ` scheme.
fn strip_bearer(header: &str) -> Option<&str> {
    let scheme = header.get(..BEARER_PREFIX.len())?;
    if scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        Some(&header[BEARER_PREFIX.len()..])
    } else {
        None
    }
}
