//! Error types surfaced to API clients
//!
//! Every failure of the list/get pipeline ends up as an [`ApiError`] with a
//! status code, a stable error code and a message that never reveals the
//! access scope. Expansion failures are not here: they only drop a relation.

use serde::Serialize;
use thiserror::Error;

use helpdesk_query::QueryError;
use helpdesk_rbac::AccessError;

use crate::repository::RepositoryError;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No principal on the request
    #[error("Authentication required")]
    Unauthenticated,

    /// The principal may not perform this action
    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    /// Malformed query parameters or filter values
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No visible entity with this identifier
    #[error("{resource} '{id}' not found")]
    NotFound {
        /// Resource namespace
        resource: String,
        /// Requested identifier
        id: String,
    },

    /// The repository failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Check if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Repository(_) | ApiError::Internal(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthenticated => 401,
            ApiError::Forbidden => 403,
            ApiError::Validation(_) => 400,
            ApiError::NotFound { .. } => 404,
            ApiError::Repository(_) | ApiError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "UNAUTHENTICATED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Repository(_) => "REPOSITORY_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Response body for this error.
    ///
    /// Server errors get a generic message so backend details stay in logs.
    pub fn body(&self) -> ErrorBody {
        let message = if self.is_server_error() {
            "The server failed to process the request".to_string()
        } else {
            self.to_string()
        };

        ErrorBody {
            error: ErrorDetail {
                code: self.error_code(),
                message,
            },
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => ApiError::Unauthenticated,
            AccessError::Forbidden => ApiError::Forbidden,
            AccessError::Resolver(message) => ApiError::Internal(message),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Repository(err.to_string())
    }
}

/// Serialized error response: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Error details
    pub error: ErrorDetail,
}

/// Code and message of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    /// Stable error code
    pub code: &'static str,
    /// Human-readable message
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_and_codes() {
        let cases = [
            (ApiError::Unauthenticated, 401, "UNAUTHENTICATED"),
            (ApiError::Forbidden, 403, "FORBIDDEN"),
            (ApiError::Validation("page".into()), 400, "VALIDATION_ERROR"),
            (
                ApiError::NotFound {
                    resource: "tickets".into(),
                    id: "t-1".into(),
                },
                404,
                "NOT_FOUND",
            ),
            (ApiError::Repository("down".into()), 500, "REPOSITORY_ERROR"),
        ];

        for (error, status, code) in cases {
            assert_eq!(error.status_code(), status);
            assert_eq!(error.error_code(), code);
        }
    }

    #[test]
    fn test_from_access_error() {
        assert!(matches!(
            ApiError::from(AccessError::Unauthenticated),
            ApiError::Unauthenticated
        ));
        assert!(matches!(ApiError::from(AccessError::Forbidden), ApiError::Forbidden));
        assert!(ApiError::from(AccessError::Resolver("boom".into())).is_server_error());
    }

    #[test]
    fn test_from_query_error() {
        let err: ApiError = QueryError::invalid_parameter("page", "must be at least 1").into();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("page"));
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(ApiError::Forbidden.body()).unwrap();
        assert_eq!(
            body,
            json!({"error": {"code": "FORBIDDEN", "message": "Forbidden: insufficient permissions"}})
        );
    }

    #[test]
    fn test_server_error_body_is_generic() {
        let body = ApiError::Repository("connection refused to 10.0.0.3".into()).body();
        assert_eq!(body.error.code, "REPOSITORY_ERROR");
        assert!(!body.error.message.contains("10.0.0.3"));
    }
}
