//! Error types for expansion maps and related-entity fetches
//!
//! Fetch errors never reach the client: the resolver logs them and omits
//! the relation. Map errors surface at startup, when the map is built.

use thiserror::Error;

/// Errors building an expansion map.
#[derive(Debug, Error)]
pub enum MapError {
    /// A route template is malformed
    #[error("Invalid route template '{route}': {message}")]
    InvalidRoute {
        /// The declared template
        route: String,
        /// What is wrong with it
        message: String,
    },

    /// The declarative map is not valid JSON of the expected shape
    #[error("Invalid expansion map: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors fetching a related entity.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream returned an error response
    #[error("Upstream error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the upstream
        message: String,
    },

    /// Upstream returned something that is not an entity
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Repository or other non-HTTP failure
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// The owning request was cancelled or ran out of time
    #[error("Fetch cancelled")]
    Cancelled,
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

impl FetchError {
    /// Check if retrying the fetch may succeed.
    ///
    /// Transport failures, 429 and 5xx responses are retryable; client
    /// errors, malformed bodies and cancellation are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RequestFailed(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Upstream(_) => true,
            FetchError::InvalidResponse(_) | FetchError::Cancelled => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        let status = |status| FetchError::Status {
            status,
            message: String::new(),
        };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!status(403).is_retryable());
        assert!(FetchError::Upstream("db down".into()).is_retryable());
        assert!(!FetchError::Cancelled.is_retryable());
        assert!(!FetchError::InvalidResponse("not json".into()).is_retryable());
    }
}
