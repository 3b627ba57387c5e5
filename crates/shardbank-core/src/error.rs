//! Error types for shardbank domain validation.

use crate::ids::IdError;

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while validating domain input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The region code is not one of NA, EU or APAC.
    #[error("Invalid region: {0}. Must be NA, EU, or APAC")]
    InvalidRegion(String),

    /// The request is missing fields or contradicts itself.
    #[error("{0}")]
    InvalidRequest(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}

impl CoreError {
    /// Shorthand for an `InvalidRequest` with the given message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}
