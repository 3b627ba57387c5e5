//! Creating users and accounts on their home shard.

use std::sync::Arc;

use serde::Serialize;
use shardbank_core::{AccountId, NewAccount, NewUser, Region, ShardLocation, UserLocation};

use crate::error::{Result, StoreError};
use crate::{CatalogGateway, ShardGateway};

/// Where a new account was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreatedAccount {
    /// Shard-local id issued by the owning shard.
    pub account_id: AccountId,
    /// Region of the owner.
    pub region: Region,
    /// Shard holding the row.
    pub shard_location: ShardLocation,
}

/// Inserts users and accounts.
#[derive(Clone)]
pub struct Provisioner {
    catalog: Arc<dyn CatalogGateway>,
    shards: Arc<dyn ShardGateway>,
}

impl Provisioner {
    /// Create a provisioner over the given gateways.
    pub fn new(catalog: Arc<dyn CatalogGateway>, shards: Arc<dyn ShardGateway>) -> Self {
        Self { catalog, shards }
    }

    /// Allocate a user id from the catalog and write the user to its region's shard.
    pub async fn create_user(&self, user: &NewUser) -> Result<UserLocation> {
        let user_id = self.catalog.next_user_id().await?;
        self.shards.insert_user(user_id, user).await?;
        tracing::info!(%user_id, region = %user.region, "User created");
        Ok(UserLocation::new(user_id, user.region))
    }

    /// Write an account to its owner's shard.
    ///
    /// The owner's region decides the shard. A region given in the request
    /// must agree with it.
    pub async fn create_account(&self, account: &NewAccount) -> Result<CreatedAccount> {
        let region = self
            .catalog
            .user_region(account.user_id)
            .await?
            .ok_or_else(|| StoreError::invalid(format!("user {} not found", account.user_id)))?;
        if let Some(claimed) = account.region {
            if claimed != region {
                return Err(StoreError::invalid(format!(
                    "region {claimed} does not match the owner's region {region}"
                )));
            }
        }
        let account_id = self.shards.insert_account(region, account).await?;
        tracing::info!(
            %account_id,
            account_number = %account.account_number,
            %region,
            "Account created"
        );
        Ok(CreatedAccount {
            account_id,
            region,
            shard_location: region.shard_location(),
        })
    }
}
