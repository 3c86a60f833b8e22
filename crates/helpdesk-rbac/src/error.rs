//! Error types for access-control decisions
//!
//! Denials short-circuit a request with a client error and no partial body.
//! Messages never describe the scope that filtered entities out.

use thiserror::Error;

/// Access-control error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No principal on the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Principal present but role or ownership check failed
    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    /// The principal could not be resolved
    #[error("Principal resolution failed: {0}")]
    Resolver(String),
}

/// Result type for access-control operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AccessError::Resolver(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::Unauthenticated => 401,
            AccessError::Forbidden => 403,
            AccessError::Resolver(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::Unauthenticated => "UNAUTHENTICATED",
            AccessError::Forbidden => "FORBIDDEN",
            AccessError::Resolver(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AccessError::Unauthenticated.status_code(), 401);
        assert_eq!(AccessError::Forbidden.status_code(), 403);
        assert_eq!(AccessError::Resolver("x".into()).status_code(), 500);
        assert!(AccessError::Resolver("x".into()).is_server_error());
        assert!(!AccessError::Forbidden.is_server_error());
    }
}
