//! Error types for shard routing and storage.

use shardbank_core::CoreError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while routing to or talking with the catalog and shards.
///
/// A lookup that finds nothing is not an error; gateways return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The catalog or a shard could not be reached, or a call ran past its deadline.
    #[error("connection error: {0}")]
    Connection(String),

    /// A statement failed to execute.
    #[error("query error: {0}")]
    Query(String),

    /// The request is missing fields, contradicts itself or names an unknown account.
    #[error("{0}")]
    InvalidRequest(String),

    /// The region code is not one of NA, EU or APAC.
    #[error("Invalid region: {0}. Must be NA, EU, or APAC")]
    InvalidRegion(String),

    /// A shard-resident atomic procedure rejected the operation.
    #[error("procedure error: {0}")]
    Procedure(String),
}

impl StoreError {
    /// Shorthand for an `InvalidRequest` with the given message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRegion(code) => Self::InvalidRegion(code),
            CoreError::InvalidRequest(msg) => Self::InvalidRequest(msg),
            CoreError::InvalidId(e) => Self::InvalidRequest(e.to_string()),
        }
    }
}
