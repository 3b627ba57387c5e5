//! Catalog gateway backed by PostgreSQL.

use std::sync::Arc;

use async_trait::async_trait;
use shardbank_core::{AccountId, AccountInfo, AccountNumber, Region, UserId};

use super::{classify, parse_region, raw_row};
use crate::error::{Result, StoreError};
use crate::pool::PoolRegistry;
use crate::record::RawRow;
use crate::report::Report;
use crate::resolver::Target;
use crate::CatalogGateway;

/// Catalog lookups over the pooled catalog connection.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pools: Arc<PoolRegistry>,
}

impl PgCatalog {
    /// Create a catalog gateway.
    #[must_use]
    pub fn new(pools: Arc<PoolRegistry>) -> Self {
        Self { pools }
    }
}

#[async_trait]
impl CatalogGateway for PgCatalog {
    async fn user_region(&self, user_id: UserId) -> Result<Option<Region>> {
        let pool = self.pools.pool(Target::Catalog);
        let code: Option<String> = self
            .pools
            .with_deadline(Target::Catalog, async {
                sqlx::query_scalar("SELECT region FROM users_all WHERE user_id = $1 LIMIT 1")
                    .bind(user_id.get())
                    .fetch_optional(pool)
                    .await
                    .map_err(classify)
            })
            .await?;
        code.as_deref().map(parse_region).transpose()
    }

    async fn account_info_by_number(&self, number: &AccountNumber) -> Result<Option<AccountInfo>> {
        let pool = self.pools.pool(Target::Catalog);
        let row: Option<(String, String, String)> = self
            .pools
            .with_deadline(Target::Catalog, async {
                sqlx::query_as(
                    "SELECT account_number, region, shard_location \
                     FROM accounts_all WHERE account_number = $1 LIMIT 1",
                )
                .bind(number.as_str())
                .fetch_optional(pool)
                .await
                .map_err(classify)
            })
            .await?;

        row.map(|(account_number, region, shard_location)| {
            Ok(AccountInfo {
                account_number: account_number
                    .parse()
                    .map_err(|e| StoreError::Query(format!("bad account number: {e}")))?,
                region: parse_region(&region)?,
                shard_location: shard_location
                    .parse()
                    .map_err(|e| StoreError::Query(format!("bad shard location: {e}")))?,
            })
        })
        .transpose()
    }

    async fn account_region_by_id(&self, account_id: AccountId) -> Result<Option<Region>> {
        let pool = self.pools.pool(Target::Catalog);
        let code: Option<String> = self
            .pools
            .with_deadline(Target::Catalog, async {
                sqlx::query_scalar(
                    "SELECT region FROM accounts_all WHERE account_id = $1 \
                     ORDER BY shard_location LIMIT 1",
                )
                .bind(account_id.get())
                .fetch_optional(pool)
                .await
                .map_err(classify)
            })
            .await?;
        code.as_deref().map(parse_region).transpose()
    }

    async fn next_user_id(&self) -> Result<UserId> {
        let pool = self.pools.pool(Target::Catalog);
        let id: i64 = self
            .pools
            .with_deadline(Target::Catalog, async {
                sqlx::query_scalar("SELECT nextval('user_seq')")
                    .fetch_one(pool)
                    .await
                    .map_err(classify)
            })
            .await?;
        Ok(UserId::new(id))
    }

    async fn ping(&self) -> Result<()> {
        let pool = self.pools.pool(Target::Catalog);
        self.pools
            .with_deadline(Target::Catalog, async {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .map(|_| ())
                    .map_err(classify)
            })
            .await
    }

    async fn report_rows(&self, report: Report) -> Result<Vec<RawRow>> {
        let pool = self.pools.pool(Target::Catalog);
        let rows = self
            .pools
            .with_deadline(Target::Catalog, async {
                sqlx::query(report.sql())
                    .fetch_all(pool)
                    .await
                    .map_err(classify)
            })
            .await?;
        rows.iter().map(raw_row).collect()
    }
}
