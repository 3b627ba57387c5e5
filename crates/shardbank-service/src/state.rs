//! Application state.

use std::sync::Arc;

use shardbank_store::{
    CatalogGateway, ConnectionResolver, PgCatalog, PgShards, PoolRegistry, Provisioner,
    ShardGateway, ShardLocator, TransactionDispatcher,
};

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// Catalog lookups and reports.
    pub catalog: Arc<dyn CatalogGateway>,

    /// Maps targets to network addresses.
    pub resolver: ConnectionResolver,

    /// Places users and accounts on shards.
    pub locator: ShardLocator,

    /// Executes money movements.
    pub dispatcher: TransactionDispatcher,

    /// Creates users and accounts.
    pub provisioner: Provisioner,

    pools: Option<Arc<PoolRegistry>>,
}

impl AppState {
    /// Create application state over the given gateways.
    #[must_use]
    pub fn new(
        config: ServiceConfig,
        catalog: Arc<dyn CatalogGateway>,
        shards: Arc<dyn ShardGateway>,
    ) -> Self {
        tracing::info!(
            cross_shard_policy = %config.cross_shard_policy,
            context = %config.database.context,
            "Routing configured"
        );
        Self {
            resolver: ConnectionResolver::new(config.database.clone()),
            locator: ShardLocator::new(catalog.clone(), shards.clone()),
            dispatcher: TransactionDispatcher::new(
                catalog.clone(),
                shards.clone(),
                config.cross_shard_policy,
            ),
            provisioner: Provisioner::new(catalog.clone(), shards),
            catalog,
            config,
            pools: None,
        }
    }

    /// Create application state backed by PostgreSQL pools.
    ///
    /// Pools connect lazily; no database is contacted here.
    #[must_use]
    pub fn connect(config: ServiceConfig) -> Self {
        let pools = Arc::new(PoolRegistry::new(config.database.clone()));
        let catalog = Arc::new(PgCatalog::new(pools.clone()));
        let shards = Arc::new(PgShards::new(pools.clone()));
        let mut state = Self::new(config, catalog, shards);
        state.pools = Some(pools);
        state
    }

    /// Close database pools, if any.
    pub async fn shutdown(&self) {
        if let Some(pools) = &self.pools {
            pools.close().await;
            tracing::info!("Database pools closed");
        }
    }
}
