//! Database configuration.
//!
//! Built once at process start and handed to every gateway constructor.

use std::path::Path;
use std::time::Duration;

use shardbank_core::DeploymentContext;

/// Default database port (catalog, and every shard inside the container network).
pub const DEFAULT_DB_PORT: u16 = 1521;

/// Default database (service) name.
pub const DEFAULT_SERVICE_NAME: &str = "freepdb1";

/// Marker file present inside container images.
const CONTAINER_MARKER: &str = "/.dockerenv";

/// Connection settings shared by the catalog and every shard.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Catalog host for the local topology (default: "localhost").
    pub host: String,

    /// Catalog port for the local topology (default: 1521).
    pub port: u16,

    /// Database name on every server, trimmed and lower-cased.
    pub service_name: String,

    /// Login role.
    pub user: String,

    /// Login password.
    pub password: String,

    /// Container or local topology.
    pub context: DeploymentContext,

    /// Upper bound on pooled connections per target.
    pub max_connections: u32,

    /// How long to wait for a pooled connection.
    pub acquire_timeout: Duration,

    /// Deadline for a single database round trip.
    pub query_timeout: Duration,
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let context = var("DEPLOYMENT_CONTEXT")
            .and_then(|value| match value.parse() {
                Ok(context) => Some(context),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring DEPLOYMENT_CONTEXT");
                    None
                }
            })
            .unwrap_or_else(detect_context);

        let password = var("DB_PASSWORD").unwrap_or_default();
        if password.is_empty() {
            tracing::warn!("DB_PASSWORD is not set - connecting without a password");
        }

        Self {
            host: var("DB_HOST").unwrap_or_else(|| "localhost".into()),
            port: var("DB_PORT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_DB_PORT),
            service_name: normalize_service_name(
                &var("DB_SERVICE_NAME").unwrap_or_else(|| DEFAULT_SERVICE_NAME.into()),
            ),
            user: var("DB_USER").unwrap_or_else(|| "bank_app".into()),
            password,
            context,
            max_connections: var("DB_POOL_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            acquire_timeout: Duration::from_millis(
                var("DB_ACQUIRE_TIMEOUT_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
            ),
            query_timeout: Duration::from_millis(
                var("DB_QUERY_TIMEOUT_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            ),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: DEFAULT_DB_PORT,
            service_name: DEFAULT_SERVICE_NAME.into(),
            user: "bank_app".into(),
            password: String::new(),
            context: DeploymentContext::Local,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(3),
            query_timeout: Duration::from_secs(5),
        }
    }
}

/// Detect the deployment context from the container marker file.
#[must_use]
pub fn detect_context() -> DeploymentContext {
    if Path::new(CONTAINER_MARKER).exists() {
        DeploymentContext::Container
    } else {
        DeploymentContext::Local
    }
}

fn normalize_service_name(name: &str) -> String {
    name.trim().to_lowercase()
}
