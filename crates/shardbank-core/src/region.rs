//! Regions, shard locations and deployment contexts.
//!
//! A region decides which shard owns a user and all of that user's accounts.
//! The assignment is made when the user is created and never changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A data-residency region. Each region is served by exactly one shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    /// North America (`SHARD1`).
    Na,
    /// Europe (`SHARD2`).
    Eu,
    /// Asia-Pacific (`SHARD3`).
    Apac,
}

impl Region {
    /// Every region, in shard probe order.
    pub const ALL: [Self; 3] = [Self::Na, Self::Eu, Self::Apac];

    /// The canonical upper-case code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Na => "NA",
            Self::Eu => "EU",
            Self::Apac => "APAC",
        }
    }

    /// The shard holding this region's rows.
    #[must_use]
    pub const fn shard_location(self) -> ShardLocation {
        match self {
            Self::Na => ShardLocation(1),
            Self::Eu => ShardLocation(2),
            Self::Apac => ShardLocation(3),
        }
    }

    /// Parse an optional region code, treating blank input as absent.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRegion` for a non-blank unknown code.
    pub fn parse_optional(code: Option<&str>) -> Result<Option<Self>, CoreError> {
        match code.map(str::trim) {
            None | Some("") => Ok(None),
            Some(code) => code.parse().map(Some),
        }
    }
}

impl FromStr for Region {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NA" => Ok(Self::Na),
            "EU" => Ok(Self::Eu),
            "APAC" => Ok(Self::Apac),
            _ => Err(CoreError::InvalidRegion(s.to_string())),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for Region {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.code().to_string()
    }
}

/// The physical shard name as stored in the catalog (`SHARD1`..`SHARD3`).
///
/// Ordering follows the shard ordinal, which is also the tie-break used when a
/// shard-local identifier matches rows on several shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShardLocation(u8);

impl ShardLocation {
    /// The shard ordinal (1-based).
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self.0
    }

    /// The region served by this shard.
    #[must_use]
    pub const fn region(self) -> Region {
        match self.0 {
            1 => Region::Na,
            2 => Region::Eu,
            _ => Region::Apac,
        }
    }
}

impl FromStr for ShardLocation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("SHARD").and_then(|n| n.parse::<u8>().ok()) {
            Some(n @ 1..=3) => Ok(Self(n)),
            _ => Err(CoreError::invalid(format!("unknown shard location: {s}"))),
        }
    }
}

impl fmt::Display for ShardLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHARD{}", self.0)
    }
}

impl TryFrom<String> for ShardLocation {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShardLocation> for String {
    fn from(location: ShardLocation) -> Self {
        location.to_string()
    }
}

/// Where the service runs relative to the databases.
///
/// Container deployments reach every database by its service hostname on the
/// default port; local deployments reach them through host-mapped ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentContext {
    /// Inside the container network.
    Container,
    /// On the host, with database ports published to localhost.
    Local,
}

impl FromStr for DeploymentContext {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "container" | "docker" => Ok(Self::Container),
            "local" | "host" => Ok(Self::Local),
            other => Err(CoreError::invalid(format!(
                "unknown deployment context: {other}"
            ))),
        }
    }
}

impl fmt::Display for DeploymentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => f.write_str("container"),
            Self::Local => f.write_str("local"),
        }
    }
}
