//! Error types for query parameter handling

use thiserror::Error;

/// Query errors.
///
/// All variants describe malformed client input and map to a 400 response.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A reserved query parameter has an unusable value
    #[error("Invalid value for parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// What is wrong with it
        message: String,
    },

    /// A filter value could not be produced
    #[error("Invalid filter '{field}': {message}")]
    InvalidFilter {
        /// Filter field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    /// Shorthand for an invalid parameter.
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        QueryError::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }
}
