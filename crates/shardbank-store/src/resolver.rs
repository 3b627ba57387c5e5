//! Connection Resolver: maps a target and deployment context to a network address.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use shardbank_core::{DeploymentContext, Region};

use crate::config::{DatabaseConfig, DEFAULT_DB_PORT};
use crate::error::Result;

/// Catalog hostname inside the container network.
pub const CONTAINER_CATALOG_HOST: &str = "db-catalog";

/// Host used for every shard in the local topology.
pub const LOCAL_SHARD_HOST: &str = "localhost";

/// A database server the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Target {
    /// The catalog holding union and reporting views.
    Catalog,
    /// The shard serving one region.
    Shard(Region),
}

impl From<Option<Region>> for Target {
    fn from(region: Option<Region>) -> Self {
        region.map_or(Self::Catalog, Self::Shard)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog => f.write_str("catalog"),
            Self::Shard(region) => write!(f, "shard {region} ({})", region.shard_location()),
        }
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.to_string()
    }
}

/// A resolved network address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// What lives at this address.
    pub target: Target,
    /// Hostname.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Database name.
    pub service_name: String,
}

/// Resolve the address for `region` (or the catalog when `None`) in `context`.
///
/// The local catalog address comes from the configured host and port; every
/// other address is fixed per topology.
#[must_use]
pub fn resolve(
    region: Option<Region>,
    context: DeploymentContext,
    config: &DatabaseConfig,
) -> Endpoint {
    let target = Target::from(region);
    let (host, port) = match (target, context) {
        (Target::Catalog, DeploymentContext::Container) => {
            (CONTAINER_CATALOG_HOST.to_string(), DEFAULT_DB_PORT)
        }
        (Target::Catalog, DeploymentContext::Local) => (config.host.clone(), config.port),
        (Target::Shard(region), DeploymentContext::Container) => {
            (container_shard_host(region).to_string(), DEFAULT_DB_PORT)
        }
        (Target::Shard(region), DeploymentContext::Local) => {
            (LOCAL_SHARD_HOST.to_string(), local_shard_port(region))
        }
    };
    Endpoint {
        target,
        host,
        port,
        service_name: config.service_name.clone(),
    }
}

const fn container_shard_host(region: Region) -> &'static str {
    match region {
        Region::Na => "db-shard1",
        Region::Eu => "db-shard2",
        Region::Apac => "db-shard3",
    }
}

const fn local_shard_port(region: Region) -> u16 {
    match region {
        Region::Na => 1522,
        Region::Eu => 1523,
        Region::Apac => 1524,
    }
}

/// Resolver bound to one configuration.
#[derive(Debug, Clone)]
pub struct ConnectionResolver {
    config: Arc<DatabaseConfig>,
}

impl ConnectionResolver {
    /// Create a resolver over `config`.
    #[must_use]
    pub fn new(config: Arc<DatabaseConfig>) -> Self {
        Self { config }
    }

    /// The configuration this resolver reads.
    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Resolve a target in the configured deployment context.
    #[must_use]
    pub fn resolve(&self, target: Target) -> Endpoint {
        let region = match target {
            Target::Catalog => None,
            Target::Shard(region) => Some(region),
        };
        let endpoint = resolve(region, self.config.context, &self.config);
        tracing::debug!(
            target_db = %endpoint.target,
            host = %endpoint.host,
            port = endpoint.port,
            "Resolved database endpoint"
        );
        endpoint
    }

    /// Resolve an optional region code; a blank or missing code is the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRegion` for an unknown code.
    pub fn resolve_code(&self, code: Option<&str>) -> Result<Endpoint> {
        let region = Region::parse_optional(code)?;
        Ok(self.resolve(Target::from(region)))
    }
}
