//! User types.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::lenient::optional_text;
use crate::region::{Region, ShardLocation};
use crate::UserId;

/// Payload for creating a user, as submitted by the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserRequest {
    /// Login name.
    #[serde(default, deserialize_with = "optional_text")]
    pub username: Option<String>,
    /// Contact email.
    #[serde(default, deserialize_with = "optional_text")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, deserialize_with = "optional_text")]
    pub full_name: Option<String>,
    /// Phone number.
    #[serde(default, deserialize_with = "optional_text")]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(default, deserialize_with = "optional_text")]
    pub address: Option<String>,
    /// Region code; defaults to NA.
    #[serde(default, deserialize_with = "optional_text")]
    pub region: Option<String>,
}

/// A validated user ready to be written to its region's shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Home region, fixed for the lifetime of the user.
    pub region: Region,
}

impl NewUserRequest {
    /// Check required fields and resolve the region.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRequest` for a missing required field and
    /// `CoreError::InvalidRegion` for an unknown region code.
    pub fn validate(self) -> Result<NewUser> {
        let region = Region::parse_optional(self.region.as_deref())?.unwrap_or(Region::Na);
        Ok(NewUser {
            username: required(self.username, "username")?,
            email: required(self.email, "email")?,
            full_name: required(self.full_name, "full_name")?,
            phone: self.phone,
            address: self.address,
            region,
        })
    }
}

pub(crate) fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::invalid(format!("{field} is required")))
}

/// Where a user lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLocation {
    /// The user's global id.
    pub user_id: UserId,
    /// The user's home region.
    pub region: Region,
    /// The shard holding the user's rows.
    pub shard_location: ShardLocation,
}

impl UserLocation {
    /// Location of a user homed in `region`.
    #[must_use]
    pub const fn new(user_id: UserId, region: Region) -> Self {
        Self {
            user_id,
            region,
            shard_location: region.shard_location(),
        }
    }
}
