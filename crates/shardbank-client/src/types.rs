//! Request and response types for the shardbank API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use shardbank_core::{AccountId, Region, ShardLocation, UserId, UserLocation};

/// A normalized report row: lower-case keys, datetimes as strings, numbers as floats.
pub type Record = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Requests
// ============================================================================

/// Body of `POST /api/insert/user`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateUser {
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Home region; the server defaults to NA.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

/// Body of `POST /api/insert/account`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAccount {
    /// Owning user.
    pub user_id: UserId,
    /// Globally unique account number.
    pub account_number: String,
    /// Product type.
    pub account_type: String,
    /// Opening balance; the server defaults to zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    /// Currency; the server defaults to USD.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Region; must match the owner's when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

/// Body of `POST /api/insert/transaction`.
///
/// Name accounts by number where possible; a shard-local id without a region
/// is placed on a best-effort basis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransactionRequest {
    /// DEPOSIT, WITHDRAWAL, TRANSFER or another code.
    pub transaction_type: String,
    /// Shard-local id of the debited account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<AccountId>,
    /// Shard-local id of the credited account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<AccountId>,
    /// Number of the debited account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account_number: Option<String>,
    /// Number of the credited account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account_number: Option<String>,
    /// Region for both endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    /// Region of the debited account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_region: Option<Region>,
    /// Region of the credited account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_region: Option<Region>,
    /// Amount to move.
    pub amount: Decimal,
    /// Free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Status for non-balance transaction rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl TransactionRequest {
    /// Deposit into the account with the given number.
    #[must_use]
    pub fn deposit_to_number(account_number: impl Into<String>, amount: Decimal) -> Self {
        Self {
            transaction_type: "DEPOSIT".into(),
            to_account_number: Some(account_number.into()),
            amount,
            ..Self::default()
        }
    }

    /// Withdraw from the account with the given number.
    #[must_use]
    pub fn withdraw_from_number(account_number: impl Into<String>, amount: Decimal) -> Self {
        Self {
            transaction_type: "WITHDRAWAL".into(),
            from_account_number: Some(account_number.into()),
            amount,
            ..Self::default()
        }
    }

    /// Transfer between two accounts named by number.
    #[must_use]
    pub fn transfer_between_numbers(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            transaction_type: "TRANSFER".into(),
            from_account_number: Some(from.into()),
            to_account_number: Some(to.into()),
            amount,
            ..Self::default()
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Readiness response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessResponse {
    /// `ready` when the catalog answered.
    pub status: String,
    /// Catalog address as `host:port`.
    pub catalog: String,
}

/// Confirmation returned by insert endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertResponse<T> {
    /// Always `true` on success.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// Operation-specific fields.
    #[serde(flatten)]
    pub data: T,
}

/// Placement of a newly opened account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AccountCreated {
    /// Shard-local id.
    pub account_id: AccountId,
    /// Region of the owner.
    pub region: Region,
    /// Shard holding the row.
    pub shard_location: ShardLocation,
}

/// Result of a money movement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionResult {
    /// Kind of movement.
    pub transaction_type: String,
    /// Shards written, in write order.
    pub shards: Vec<Region>,
    /// Saga id for cross-shard transfers.
    #[serde(default)]
    pub saga_id: Option<String>,
}

/// Address a region or the catalog resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedEndpoint {
    /// What lives at this address.
    pub target: String,
    /// Hostname.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Database name.
    pub service_name: String,
}

/// Error payload returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Sanitized error message.
    pub error: String,
    /// Optional hint.
    #[serde(default)]
    pub details: Option<String>,
}
