//! Service configuration.

use std::sync::Arc;

use shardbank_store::{CrossShardPolicy, DatabaseConfig};

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 5001;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP port, bound on all interfaces (default: 5001).
    pub port: u16,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Handling of transfers between accounts on different shards.
    pub cross_shard_policy: CrossShardPolicy,

    /// Catalog and shard connection settings.
    pub database: Arc<DatabaseConfig>,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let cross_shard_policy = var("CROSS_SHARD_TRANSFERS")
            .and_then(|value| match value.parse() {
                Ok(policy) => Some(policy),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring CROSS_SHARD_TRANSFERS");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            port: var("PORT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            cors_origins: var("CORS_ORIGINS")
                .unwrap_or_else(|| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            max_body_bytes: var("MAX_BODY_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: var("REQUEST_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            cross_shard_policy,
            database: Arc::new(DatabaseConfig::from_vars(&var)),
        }
    }

    /// Address the HTTP server binds to.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            cross_shard_policy: CrossShardPolicy::default(),
            database: Arc::new(DatabaseConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServiceConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServiceConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[("DEPLOYMENT_CONTEXT", "local")]);
        assert_eq!(cfg.listen_addr(), "0.0.0.0:5001");
        assert_eq!(cfg.cors_origins, ["*"]);
        assert_eq!(cfg.cross_shard_policy, CrossShardPolicy::Reject);
        assert_eq!(cfg.database.port, 1521);
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
            ("CROSS_SHARD_TRANSFERS", "compensate"),
            ("DB_HOST", "catalog.test"),
            ("DEPLOYMENT_CONTEXT", "local"),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.cors_origins, ["http://a.test", "http://b.test"]);
        assert_eq!(cfg.cross_shard_policy, CrossShardPolicy::Compensate);
        assert_eq!(cfg.database.host, "catalog.test");
    }

    #[test]
    fn unknown_policy_falls_back_to_reject() {
        let cfg = config(&[("CROSS_SHARD_TRANSFERS", "2pc"), ("DEPLOYMENT_CONTEXT", "local")]);
        assert_eq!(cfg.cross_shard_policy, CrossShardPolicy::Reject);
    }
}
