//! Connection pools, one per database target.
//!
//! Pools connect lazily so the service starts even when a shard is down; a
//! request that needs an unreachable target fails on its own without
//! affecting requests routed elsewhere.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use shardbank_core::Region;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::error::{Result, StoreError};
use crate::resolver::{ConnectionResolver, Target};

/// Pools for the catalog and every region shard.
#[derive(Debug, Clone)]
pub struct PoolRegistry {
    resolver: ConnectionResolver,
    catalog: PgPool,
    na: PgPool,
    eu: PgPool,
    apac: PgPool,
}

impl PoolRegistry {
    /// Build lazily-connected pools for every target.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn new(config: Arc<DatabaseConfig>) -> Self {
        let resolver = ConnectionResolver::new(config);
        let catalog = build_pool(&resolver, Target::Catalog);
        let na = build_pool(&resolver, Target::Shard(Region::Na));
        let eu = build_pool(&resolver, Target::Shard(Region::Eu));
        let apac = build_pool(&resolver, Target::Shard(Region::Apac));
        Self {
            resolver,
            catalog,
            na,
            eu,
            apac,
        }
    }

    /// The pool serving `target`.
    #[must_use]
    pub fn pool(&self, target: Target) -> &PgPool {
        match target {
            Target::Catalog => &self.catalog,
            Target::Shard(Region::Na) => &self.na,
            Target::Shard(Region::Eu) => &self.eu,
            Target::Shard(Region::Apac) => &self.apac,
        }
    }

    /// The resolver the pools were built from.
    #[must_use]
    pub fn resolver(&self) -> &ConnectionResolver {
        &self.resolver
    }

    /// Deadline applied to each database round trip.
    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        self.resolver.config().query_timeout
    }

    /// Run `fut` under the per-call deadline.
    ///
    /// See [`with_deadline`].
    pub async fn with_deadline<T, F>(&self, target: Target, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        with_deadline(target, self.query_timeout(), fut).await
    }

    /// Close every pool, waiting for leased connections to return.
    pub async fn close(&self) {
        for pool in [&self.catalog, &self.na, &self.eu, &self.apac] {
            pool.close().await;
        }
    }
}

/// Run `fut` against `target`, giving up after `deadline`.
///
/// An elapsed deadline is a connection error. Dropping the future drops any
/// open transaction, which rolls it back.
pub async fn with_deadline<T, F>(target: Target, deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(target_db = %target, ?deadline, "Database call timed out");
            Err(StoreError::Connection(format!(
                "{target} did not answer within {}ms",
                deadline.as_millis()
            )))
        }
    }
}

fn build_pool(resolver: &ConnectionResolver, target: Target) -> PgPool {
    let config = resolver.config();
    let endpoint = resolver.resolve(target);
    let mut options = PgConnectOptions::new()
        .host(&endpoint.host)
        .port(endpoint.port)
        .database(&endpoint.service_name)
        .username(&config.user)
        .application_name("shardbank");
    if !config.password.is_empty() {
        options = options.password(&config.password);
    }
    tracing::info!(
        target_db = %target,
        host = %endpoint.host,
        port = endpoint.port,
        database = %endpoint.service_name,
        "Configured connection pool"
    );
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(0)
        .acquire_timeout(config.acquire_timeout)
        .test_before_acquire(true)
        .connect_lazy_with(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Sets its flag when dropped, standing in for an open transaction.
    struct OpenTransaction(Arc<AtomicBool>);

    impl Drop for OpenTransaction {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_is_a_connection_error() {
        let err = with_deadline(
            Target::Catalog,
            Duration::from_millis(250),
            std::future::pending::<Result<()>>(),
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            StoreError::Connection("catalog did not answer within 250ms".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_drops_the_open_transaction() {
        let rolled_back = Arc::new(AtomicBool::new(false));
        let tx = OpenTransaction(rolled_back.clone());

        let result = with_deadline(
            Target::Shard(Region::Eu),
            Duration::from_secs(5),
            async move {
                let _tx = tx;
                std::future::pending::<Result<()>>().await
            },
        )
        .await;

        assert!(matches!(result, Err(StoreError::Connection(_))));
        assert!(rolled_back.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn answers_within_the_deadline_pass_through() {
        let ok = with_deadline(Target::Catalog, Duration::from_millis(10), async {
            Ok::<_, StoreError>(7)
        })
        .await;
        assert_eq!(ok, Ok(7));

        let err = with_deadline(Target::Catalog, Duration::from_millis(10), async {
            Err::<(), _>(StoreError::Query("syntax error".into()))
        })
        .await;
        assert_eq!(err, Err(StoreError::Query("syntax error".into())));
    }
}
