//! Application Error Types
//!
//! Outcome taxonomy for backend API calls. Transport-level and malformed
//! responses are never authoritative; only explicit statuses drive state
//! transitions in the services.

use serde::Serialize;

/// Classified failure of a backend API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network unreachable, timeout, connection reset. Retried implicitly
    /// by the next scheduled attempt, never surfaced as session loss.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Explicit rate-limit signal (HTTP 429), optionally carrying the
    /// server-advertised retry delay in seconds.
    #[error("too many requests")]
    Throttled { retry_after: Option<u64> },

    /// Explicit unauthenticated status (HTTP 401).
    #[error("not authenticated")]
    Unauthenticated,

    /// Explicit forbidden status (HTTP 403); for the chat endpoint this
    /// means the account email is not verified yet.
    #[error("forbidden")]
    Forbidden,

    /// Server rejected the input (HTTP 400 with field errors).
    #[error("rejected input")]
    Rejected { fields: Vec<FieldError> },

    /// Response arrived but could not be parsed. Absorbed like transport
    /// failures.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Any other unexpected status code.
    #[error("unexpected status {0}")]
    Status(u16),
}

impl ApiError {
    /// Whether this failure carries no authority over session or cooldown
    /// state.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Malformed(_))
    }
}

/// Field-level validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
