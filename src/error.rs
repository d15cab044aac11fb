use thiserror::Error;

use crate::types::SemanticKind;

/// Error type for sqlnorm operations
#[derive(Debug, Error)]
pub enum SqlNormError {
    /// Incomplete or contradictory normalization settings. Raised while a
    /// policy is being built, never during normalization.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value could not be materialized for the kind it was classified as.
    #[error("Unrepresentable {kind} value '{text}': {reason}")]
    UnrepresentableValue {
        kind: SemanticKind,
        text: String,
        reason: String,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),
}

impl SqlNormError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        SqlNormError::Configuration(message.into())
    }

    pub(crate) fn unrepresentable(
        kind: SemanticKind,
        text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SqlNormError::UnrepresentableValue {
            kind,
            text: text.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for sqlnorm operations
pub type Result<T> = std::result::Result<T, SqlNormError>;
