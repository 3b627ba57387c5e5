//! Shard Locator: turns user and account references into shard placements.

use std::sync::Arc;

use serde::Serialize;
use shardbank_core::{AccountId, AccountNumber, AccountRef, Region, UserId, UserLocation};

use crate::error::{Result, StoreError};
use crate::{CatalogGateway, ShardGateway};

/// An account pinned to the shard that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlacedAccount {
    /// Region whose shard holds the account.
    pub region: Region,
    /// Shard-local id.
    pub account_id: AccountId,
}

/// Resolves where users and accounts live.
#[derive(Clone)]
pub struct ShardLocator {
    catalog: Arc<dyn CatalogGateway>,
    shards: Arc<dyn ShardGateway>,
}

impl ShardLocator {
    /// Create a locator over the given gateways.
    pub fn new(catalog: Arc<dyn CatalogGateway>, shards: Arc<dyn ShardGateway>) -> Self {
        Self { catalog, shards }
    }

    /// Home region of a user, from the catalog.
    pub async fn locate_user(&self, user_id: UserId) -> Result<Option<UserLocation>> {
        Ok(self
            .catalog
            .user_region(user_id)
            .await?
            .map(|region| UserLocation::new(user_id, region)))
    }

    /// A user by username, probing NA, EU and APAC in turn.
    pub async fn locate_username(&self, username: &str) -> Result<Option<UserLocation>> {
        self.shards.find_user_by_username(username).await
    }

    /// An account by its global number: catalog for the region, then the
    /// owning shard for the shard-local id.
    pub async fn locate_account_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<PlacedAccount>> {
        let Some(info) = self.catalog.account_info_by_number(number).await? else {
            return Ok(None);
        };
        let account_id = self
            .shards
            .find_account_id_by_number(info.region, number)
            .await?;
        Ok(account_id.map(|account_id| PlacedAccount {
            region: info.region,
            account_id,
        }))
    }

    /// Place an account reference.
    ///
    /// A bare shard-local id goes through the catalog's best-effort id lookup,
    /// which may pick an account on the wrong shard when ids collide.
    pub async fn locate(&self, account: &AccountRef) -> Result<Option<PlacedAccount>> {
        match account {
            AccountRef::Number(number) => self.locate_account_number(number).await,
            AccountRef::Placed { account_id, region } => Ok(Some(PlacedAccount {
                region: *region,
                account_id: *account_id,
            })),
            AccountRef::Unplaced(account_id) => {
                #[allow(deprecated)]
                let region = self.catalog.account_region_by_id(*account_id).await?;
                tracing::warn!(
                    account_id = %account_id,
                    resolved = ?region,
                    "Placing account by shard-local id; pass an account number or region instead"
                );
                Ok(region.map(|region| PlacedAccount {
                    region,
                    account_id: *account_id,
                }))
            }
        }
    }

    /// Place an account reference, failing when it names no account.
    pub async fn require(&self, account: &AccountRef) -> Result<PlacedAccount> {
        self.locate(account)
            .await?
            .ok_or_else(|| StoreError::invalid(format!("{account} not found")))
    }
}
