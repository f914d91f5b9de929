pub mod bearer;
pub mod gate;

// Re-export so the router can do "use crate::auth::{...};"
pub use gate::{require_bearer, trace_request, HEALTH_PATHS};
