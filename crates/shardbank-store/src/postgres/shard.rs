//! Shard gateway backed by PostgreSQL.

use std::sync::Arc;

use async_trait::async_trait;
use shardbank_core::{AccountId, AccountNumber, NewAccount, NewUser, Region, UserId, UserLocation};
use sqlx::PgConnection;

use super::{classify, parse_region, procedure_error};
use crate::error::Result;
use crate::ops::AtomicOp;
use crate::pool::PoolRegistry;
use crate::resolver::Target;
use crate::ShardGateway;

/// Shard reads and writes over per-region pools.
#[derive(Debug, Clone)]
pub struct PgShards {
    pools: Arc<PoolRegistry>,
}

impl PgShards {
    /// Create a shard gateway.
    #[must_use]
    pub fn new(pools: Arc<PoolRegistry>) -> Self {
        Self { pools }
    }
}

#[async_trait]
impl ShardGateway for PgShards {
    async fn find_account_id_by_number(
        &self,
        region: Region,
        number: &AccountNumber,
    ) -> Result<Option<AccountId>> {
        let target = Target::Shard(region);
        let pool = self.pools.pool(target);
        let id: Option<i64> = self
            .pools
            .with_deadline(target, async {
                sqlx::query_scalar(
                    "SELECT account_id FROM accounts WHERE account_number = $1 LIMIT 1",
                )
                .bind(number.as_str())
                .fetch_optional(pool)
                .await
                .map_err(classify)
            })
            .await?;
        Ok(id.map(AccountId::new))
    }

    async fn user_by_username(
        &self,
        region: Region,
        username: &str,
    ) -> Result<Option<UserLocation>> {
        let target = Target::Shard(region);
        let pool = self.pools.pool(target);
        let row: Option<(i64, String)> = self
            .pools
            .with_deadline(target, async {
                sqlx::query_as("SELECT user_id, region FROM users WHERE username = $1 LIMIT 1")
                    .bind(username)
                    .fetch_optional(pool)
                    .await
                    .map_err(classify)
            })
            .await?;

        row.map(|(user_id, code)| {
            Ok(UserLocation {
                user_id: UserId::new(user_id),
                region: parse_region(&code)?,
                shard_location: region.shard_location(),
            })
        })
        .transpose()
    }

    async fn insert_user(&self, user_id: UserId, user: &NewUser) -> Result<()> {
        let target = Target::Shard(user.region);
        let pool = self.pools.pool(target);
        self.pools
            .with_deadline(target, async {
                sqlx::query(
                    "INSERT INTO users (user_id, username, email, full_name, phone, address, region) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(user_id.get())
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.full_name)
                .bind(user.phone.as_deref())
                .bind(user.address.as_deref())
                .bind(user.region.code())
                .execute(pool)
                .await
                .map_err(classify)
            })
            .await?;
        Ok(())
    }

    async fn insert_account(&self, region: Region, account: &NewAccount) -> Result<AccountId> {
        let target = Target::Shard(region);
        let pool = self.pools.pool(target);
        let id: i64 = self
            .pools
            .with_deadline(target, async {
                sqlx::query_scalar(
                    "INSERT INTO accounts \
                     (account_id, user_id, account_number, account_type, balance, currency, region) \
                     VALUES (nextval('account_seq'), $1, $2, $3, $4, $5, $6) \
                     RETURNING account_id",
                )
                .bind(account.user_id.get())
                .bind(account.account_number.as_str())
                .bind(&account.account_type)
                .bind(account.balance)
                .bind(&account.currency)
                .bind(region.code())
                .fetch_one(pool)
                .await
                .map_err(classify)
            })
            .await?;
        Ok(AccountId::new(id))
    }

    async fn execute(&self, region: Region, op: &AtomicOp) -> Result<()> {
        let target = Target::Shard(region);
        let pool = self.pools.pool(target);
        self.pools
            .with_deadline(target, async {
                let mut tx = pool.begin().await.map_err(classify)?;
                match run(&mut tx, op).await {
                    Ok(()) => tx.commit().await.map_err(classify),
                    Err(e) => {
                        if let Err(rollback) = tx.rollback().await {
                            tracing::error!(
                                region = %region,
                                error = %rollback,
                                "Rollback failed"
                            );
                        }
                        Err(e)
                    }
                }
            })
            .await
    }
}

async fn run(conn: &mut PgConnection, op: &AtomicOp) -> Result<()> {
    match op {
        AtomicOp::Deposit {
            to,
            amount,
            description,
        } => sqlx::query("CALL deposit_money($1, $2, $3)")
            .bind(to.get())
            .bind(*amount)
            .bind(description.as_str())
            .execute(conn)
            .await
            .map_err(procedure_error)?,
        AtomicOp::Withdraw {
            from,
            amount,
            description,
        } => sqlx::query("CALL withdraw_money($1, $2, $3)")
            .bind(from.get())
            .bind(*amount)
            .bind(description.as_str())
            .execute(conn)
            .await
            .map_err(procedure_error)?,
        AtomicOp::Transfer {
            from,
            to,
            amount,
            description,
        } => sqlx::query("CALL transfer_money($1, $2, $3, $4)")
            .bind(from.get())
            .bind(to.get())
            .bind(*amount)
            .bind(description.as_str())
            .execute(conn)
            .await
            .map_err(procedure_error)?,
        AtomicOp::Record {
            kind,
            from,
            to,
            amount,
            status,
            description,
        } => sqlx::query(
            "INSERT INTO transactions \
             (from_account_id, to_account_id, transaction_type, amount, status, description) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(from.map(AccountId::get))
        .bind(to.map(AccountId::get))
        .bind(kind.as_str())
        .bind(*amount)
        .bind(status.as_str())
        .bind(description.as_str())
        .execute(conn)
        .await
        .map_err(classify)?,
    };
    Ok(())
}
