//! Account types.
//!
//! An account lives on the shard of its owning user. Its `AccountId` is issued
//! by that shard; its `AccountNumber` is unique everywhere.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::lenient::{optional_amount, optional_id, optional_text};
use crate::region::{Region, ShardLocation};
use crate::user::required;
use crate::{AccountNumber, UserId};

/// Currency used when the request does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Payload for opening an account, as submitted by the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAccountRequest {
    /// Owning user.
    #[serde(default, deserialize_with = "optional_id")]
    pub user_id: Option<UserId>,
    /// Globally unique account number.
    #[serde(default, deserialize_with = "optional_text")]
    pub account_number: Option<String>,
    /// Product type (CHECKING, SAVINGS, ...).
    #[serde(default, deserialize_with = "optional_text")]
    pub account_type: Option<String>,
    /// Opening balance; defaults to zero.
    #[serde(default, deserialize_with = "optional_amount")]
    pub balance: Option<Decimal>,
    /// ISO currency code; defaults to USD.
    #[serde(default, deserialize_with = "optional_text")]
    pub currency: Option<String>,
    /// Region code. Must agree with the owner's region when given.
    #[serde(default, deserialize_with = "optional_text")]
    pub region: Option<String>,
}

/// A validated account. The target shard is decided later from the owner's region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Owning user.
    pub user_id: UserId,
    /// Globally unique account number.
    pub account_number: AccountNumber,
    /// Product type.
    pub account_type: String,
    /// Opening balance.
    pub balance: Decimal,
    /// ISO currency code.
    pub currency: String,
    /// Region claimed by the request, if any.
    pub region: Option<Region>,
}

impl NewAccountRequest {
    /// Check required fields and defaults.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRequest` for missing fields or a negative
    /// opening balance, and `CoreError::InvalidRegion` for an unknown region.
    pub fn validate(self) -> Result<NewAccount> {
        let user_id = self
            .user_id
            .ok_or_else(|| CoreError::invalid("user_id is required"))?;
        let account_number: AccountNumber =
            required(self.account_number, "account_number")?.parse()?;
        let account_type = required(self.account_type, "account_type")?;
        let balance = self.balance.unwrap_or(Decimal::ZERO);
        if balance.is_sign_negative() && !balance.is_zero() {
            return Err(CoreError::invalid("balance must not be negative"));
        }
        let currency = self
            .currency
            .map(|c| c.trim().to_ascii_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        Ok(NewAccount {
            user_id,
            account_number,
            account_type: account_type.to_ascii_uppercase(),
            balance,
            currency,
            region: Region::parse_optional(self.region.as_deref())?,
        })
    }
}

/// Catalog view of an account, keyed by its global account number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Globally unique account number.
    pub account_number: AccountNumber,
    /// Region of the owning user.
    pub region: Region,
    /// Shard holding the account row.
    pub shard_location: ShardLocation,
}
