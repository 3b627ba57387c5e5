//! API error types and responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use shardbank_store::StoreError;

/// Hint attached to connection failures on the overall stats endpoint.
pub const CONNECTION_HINT: &str = "Check database is running and connection settings";

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - missing, malformed or contradictory input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An explicit lookup found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// The catalog or a shard could not be reached.
    #[error("database unavailable: {cause}")]
    Unavailable {
        /// Underlying cause, logged only.
        cause: String,
        /// Hint returned to the caller.
        details: Option<&'static str>,
    },

    /// A shard procedure rejected a money movement.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// The request did not finish within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Attach the connection hint to an unavailable-database error.
    #[must_use]
    pub fn with_connection_hint(self) -> Self {
        match self {
            Self::Unavailable { cause, .. } => Self::Unavailable {
                cause,
                details: Some(CONNECTION_HINT),
            },
            other => other,
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            Self::Unavailable { cause, details } => {
                tracing::error!(error = %cause, "Database connection failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database connection failed".to_string(),
                    details,
                )
            }
            Self::TransactionFailed(msg) => {
                tracing::warn!(error = %msg, "Transaction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Transaction failed: {msg}"),
                    None,
                )
            }
            Self::Timeout => {
                tracing::warn!("Request timed out");
                (
                    StatusCode::REQUEST_TIMEOUT,
                    "Request timed out".to_string(),
                    None,
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidRequest(_) | StoreError::InvalidRegion(_) => {
                Self::BadRequest(err.to_string())
            }
            StoreError::Connection(cause) => Self::Unavailable {
                cause,
                details: None,
            },
            StoreError::Procedure(msg) => Self::TransactionFailed(msg),
            StoreError::Query(msg) => Self::Internal(msg),
        }
    }
}

impl From<shardbank_core::CoreError> for ApiError {
    fn from(err: shardbank_core::CoreError) -> Self {
        StoreError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_status() {
        let cases = [
            (StoreError::invalid("amount is required"), StatusCode::BAD_REQUEST),
            (StoreError::InvalidRegion("XX".into()), StatusCode::BAD_REQUEST),
            (
                StoreError::Connection("refused".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::Query("syntax".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StoreError::Procedure("Insufficient balance".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn hint_only_applies_to_connection_failures() {
        let hinted = ApiError::from(StoreError::Connection("x".into())).with_connection_hint();
        assert!(matches!(
            hinted,
            ApiError::Unavailable {
                details: Some(CONNECTION_HINT),
                ..
            }
        ));
        let other = ApiError::from(StoreError::Query("x".into())).with_connection_hint();
        assert!(matches!(other, ApiError::Internal(_)));
    }
}
