//! API handlers.

pub mod accounts;
pub mod health;
pub mod shards;
pub mod stats;
pub mod transactions;
pub mod users;

use serde::Serialize;

/// Confirmation body for inserts and money movements.
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    /// Always `true`.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Operation-specific fields.
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    /// A successful response carrying `data`.
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}
