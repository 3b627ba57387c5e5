//! Shard routing and storage for shardbank.
//!
//! This crate decides, for any entity key, which physical shard holds the
//! authoritative row, and executes money movements against the owning
//! shard(s).
//!
//! # Architecture
//!
//! - [`resolver`]: pure mapping from a target (catalog or region shard) and
//!   deployment context to a network address.
//! - [`CatalogGateway`]: read-only lookups against the catalog's union views
//!   (`users_all`, `accounts_all`) and reporting views.
//! - [`ShardGateway`]: reads and writes scoped to one shard, including the
//!   shard-resident atomic money procedures.
//! - [`locator`]: turns account and user references into shard placements.
//! - [`dispatch`]: validates, routes and executes deposits, withdrawals and
//!   transfers, including transfers whose endpoints live on different shards.
//!
//! Two gateway implementations ship with the crate: [`postgres`] (pooled
//! `sqlx` connections per target) and [`memory`] (in-process shards for tests).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod locator;
pub mod memory;
pub mod ops;
pub mod pool;
pub mod postgres;
pub mod provision;
pub mod record;
pub mod report;
pub mod resolver;

pub use config::DatabaseConfig;
pub use dispatch::{CrossShardPolicy, DispatchOutcome, Phase, TransactionDispatcher};
pub use error::{Result, StoreError};
pub use locator::{PlacedAccount, ShardLocator};
pub use memory::MemoryBackend;
pub use ops::AtomicOp;
pub use pool::PoolRegistry;
pub use postgres::{PgCatalog, PgShards};
pub use provision::{CreatedAccount, Provisioner};
pub use record::{Cell, Normalizer, RawRow, Record};
pub use report::Report;
pub use resolver::{ConnectionResolver, Endpoint, Target};

use async_trait::async_trait;
use shardbank_core::{
    AccountId, AccountInfo, AccountNumber, NewAccount, NewUser, Region, UserId, UserLocation,
};

/// Read-only access to the catalog.
///
/// The catalog sees every shard through union views. Only globally unique keys
/// (`UserId`, `AccountNumber`) give reliable answers here.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Region of a user. `Ok(None)` when the user does not exist.
    async fn user_region(&self, user_id: UserId) -> Result<Option<Region>>;

    /// Region and shard of an account, by its global number.
    ///
    /// This is the only reliable way to find an account's shard.
    async fn account_info_by_number(&self, number: &AccountNumber) -> Result<Option<AccountInfo>>;

    /// Region of *some* account with this shard-local id.
    ///
    /// Several shards may hold an account with the same id; the match on the
    /// lowest shard location wins. The answer may name the wrong account.
    #[deprecated(note = "account ids are shard-local; resolve by account number instead")]
    async fn account_region_by_id(&self, account_id: AccountId) -> Result<Option<Region>>;

    /// Allocate a globally unique user id.
    async fn next_user_id(&self) -> Result<UserId>;

    /// Raw rows of a report.
    async fn report_rows(&self, report: Report) -> Result<Vec<RawRow>>;

    /// Round trip to the catalog without reading any view.
    async fn ping(&self) -> Result<()>;
}

/// Reads and writes against exactly one shard per call.
#[async_trait]
pub trait ShardGateway: Send + Sync {
    /// Shard-local id of an account, by its global number.
    async fn find_account_id_by_number(
        &self,
        region: Region,
        number: &AccountNumber,
    ) -> Result<Option<AccountId>>;

    /// A user on one shard, by username.
    async fn user_by_username(&self, region: Region, username: &str)
        -> Result<Option<UserLocation>>;

    /// Insert a user on the shard of its region.
    async fn insert_user(&self, user_id: UserId, user: &NewUser) -> Result<()>;

    /// Insert an account on `region`'s shard and return its shard-local id.
    async fn insert_account(&self, region: Region, account: &NewAccount) -> Result<AccountId>;

    /// Run an atomic operation on `region`'s shard, rolling back on failure.
    async fn execute(&self, region: Region, op: &AtomicOp) -> Result<()>;

    /// Find a user by probing every shard in region order; the first hit wins.
    ///
    /// Unreachable shards are skipped.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserLocation>> {
        for region in Region::ALL {
            match self.user_by_username(region, username).await {
                Ok(Some(location)) => return Ok(Some(location)),
                Ok(None) => {}
                Err(StoreError::Connection(e)) => {
                    tracing::warn!(region = %region, error = %e, "Skipping unreachable shard");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}
