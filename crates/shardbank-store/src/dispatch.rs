//! Transaction Dispatcher.
//!
//! A request moves through `Received -> Validated -> Routed -> Executing` and
//! ends `Committed` or `RolledBack`. Each shard-local step runs as one atomic
//! procedure call; a transfer whose accounts live on different shards is either
//! rejected or run as a compensated saga, depending on [`CrossShardPolicy`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shardbank_core::{MoneyMovement, MoneyOp, MoneyRequest, Region, TransactionType};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::locator::{PlacedAccount, ShardLocator};
use crate::ops::AtomicOp;
use crate::{CatalogGateway, ShardGateway};

/// What to do with a transfer between accounts on different shards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossShardPolicy {
    /// Refuse before touching any balance.
    #[default]
    Reject,
    /// Withdraw on the source shard, deposit on the destination shard and
    /// refund the source if the deposit fails.
    Compensate,
}

impl FromStr for CrossShardPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "compensate" => Ok(Self::Compensate),
            other => Err(format!(
                "unknown cross-shard policy '{other}', expected reject or compensate"
            )),
        }
    }
}

impl fmt::Display for CrossShardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::Compensate => f.write_str("compensate"),
        }
    }
}

/// Dispatch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Raw payload accepted.
    Received,
    /// Field rules passed.
    Validated,
    /// Owning shards known.
    Routed,
    /// Procedure running.
    Executing,
    /// Mutation and record persisted.
    Committed,
    /// Procedure failed; nothing persisted on that shard.
    RolledBack,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Routed => "routed",
            Self::Executing => "executing",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        })
    }
}

/// Result of a committed money movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    /// Kind of movement.
    pub transaction_type: TransactionType,
    /// Human-readable confirmation.
    #[serde(skip)]
    pub message: String,
    /// Shards written, in write order.
    pub shards: Vec<Region>,
    /// Saga id when the movement spanned two shards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saga_id: Option<Uuid>,
}

impl DispatchOutcome {
    fn local(transaction_type: TransactionType, region: Region) -> Self {
        let message = match transaction_type {
            TransactionType::Deposit => "Deposit completed successfully",
            TransactionType::Withdrawal => "Withdrawal completed successfully",
            TransactionType::Transfer => "Transfer completed successfully",
            TransactionType::Other(_) => "Transaction inserted successfully",
        };
        Self {
            transaction_type,
            message: message.to_string(),
            shards: vec![region],
            saga_id: None,
        }
    }
}

/// Validates, routes and executes money movements.
#[derive(Clone)]
pub struct TransactionDispatcher {
    locator: ShardLocator,
    shards: Arc<dyn ShardGateway>,
    policy: CrossShardPolicy,
}

impl TransactionDispatcher {
    /// Create a dispatcher.
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        shards: Arc<dyn ShardGateway>,
        policy: CrossShardPolicy,
    ) -> Self {
        Self {
            locator: ShardLocator::new(catalog, shards.clone()),
            shards,
            policy,
        }
    }

    /// The cross-shard policy in force.
    #[must_use]
    pub fn policy(&self) -> CrossShardPolicy {
        self.policy
    }

    /// The locator used for routing.
    #[must_use]
    pub fn locator(&self) -> &ShardLocator {
        &self.locator
    }

    /// Validate and execute a raw request.
    ///
    /// Validation failures return before any gateway is called.
    pub async fn dispatch(&self, request: MoneyRequest) -> Result<DispatchOutcome> {
        let span = tracing::info_span!(
            "dispatch",
            transaction_type = request.transaction_type.as_deref().unwrap_or_default()
        );
        async move {
            tracing::debug!(phase = %Phase::Received, "Transaction request");
            let movement = request.validate()?;
            self.execute(movement).await
        }
        .instrument(span)
        .await
    }

    /// Route and execute a validated movement.
    pub async fn execute(&self, movement: MoneyMovement) -> Result<DispatchOutcome> {
        let kind = movement.transaction_type();
        tracing::debug!(phase = %Phase::Validated, amount = %movement.amount, "Transaction valid");
        let MoneyMovement {
            op,
            amount,
            description,
        } = movement;

        match op {
            MoneyOp::Deposit { to } => {
                let to = self.locator.require(&to).await?;
                routed(&[to]);
                self.run(
                    to.region,
                    AtomicOp::Deposit {
                        to: to.account_id,
                        amount,
                        description,
                    },
                )
                .await?;
                Ok(DispatchOutcome::local(kind, to.region))
            }
            MoneyOp::Withdrawal { from } => {
                let from = self.locator.require(&from).await?;
                routed(&[from]);
                self.run(
                    from.region,
                    AtomicOp::Withdraw {
                        from: from.account_id,
                        amount,
                        description,
                    },
                )
                .await?;
                Ok(DispatchOutcome::local(kind, from.region))
            }
            MoneyOp::Transfer { from, to } => {
                let from = self.locator.require(&from).await?;
                let to = self.locator.require(&to).await?;
                if from == to {
                    return Err(StoreError::invalid("Cannot transfer to the same account"));
                }
                routed(&[from, to]);
                if from.region == to.region {
                    self.run(
                        from.region,
                        AtomicOp::Transfer {
                            from: from.account_id,
                            to: to.account_id,
                            amount,
                            description,
                        },
                    )
                    .await?;
                    return Ok(DispatchOutcome::local(kind, from.region));
                }
                match self.policy {
                    CrossShardPolicy::Reject => {
                        tracing::info!(
                            from = %from.region,
                            to = %to.region,
                            "Rejecting cross-shard transfer"
                        );
                        Err(StoreError::invalid("cross-shard transfers are not supported"))
                    }
                    CrossShardPolicy::Compensate => {
                        let saga_id = self.saga(from, to, amount, &description).await?;
                        Ok(DispatchOutcome {
                            transaction_type: kind,
                            message: "Transfer completed successfully".into(),
                            shards: vec![from.region, to.region],
                            saga_id: Some(saga_id),
                        })
                    }
                }
            }
            MoneyOp::Other {
                kind: code,
                from,
                to,
                status,
            } => {
                let from = match from {
                    Some(reference) => Some(self.locator.require(&reference).await?),
                    None => None,
                };
                let to = match to {
                    Some(reference) => Some(self.locator.require(&reference).await?),
                    None => None,
                };
                let region = match (from, to) {
                    (Some(a), Some(b)) if a.region != b.region => {
                        return Err(StoreError::invalid(
                            "Transaction accounts must be on the same shard",
                        ));
                    }
                    (Some(placed), _) | (None, Some(placed)) => placed.region,
                    (None, None) => {
                        return Err(StoreError::invalid(
                            "Transaction requires from_account_id or to_account_id",
                        ));
                    }
                };
                routed(&[from, to].into_iter().flatten().collect::<Vec<_>>());
                self.run(
                    region,
                    AtomicOp::Record {
                        kind: code,
                        from: from.map(|p| p.account_id),
                        to: to.map(|p| p.account_id),
                        amount,
                        status,
                        description,
                    },
                )
                .await?;
                Ok(DispatchOutcome::local(kind, region))
            }
        }
    }

    async fn run(&self, region: Region, op: AtomicOp) -> Result<()> {
        tracing::debug!(phase = %Phase::Executing, %region, op = op.name(), "Executing");
        match self.shards.execute(region, &op).await {
            Ok(()) => {
                tracing::debug!(phase = %Phase::Committed, %region, op = op.name(), "Committed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    phase = %Phase::RolledBack,
                    %region,
                    op = op.name(),
                    error = %e,
                    "Rolled back"
                );
                Err(e)
            }
        }
    }

    /// Withdraw on the source shard, then deposit on the destination shard.
    ///
    /// A deposit the shard rejected is undone by refunding the source. A deposit
    /// whose outcome is unknown (connection lost, deadline elapsed) is never
    /// refunded and is reported for reconciliation instead.
    async fn saga(
        &self,
        from: PlacedAccount,
        to: PlacedAccount,
        amount: Decimal,
        description: &str,
    ) -> Result<Uuid> {
        let saga_id = Uuid::new_v4();
        let tag = if description.is_empty() {
            format!("[saga {saga_id}]")
        } else {
            format!("{description} [saga {saga_id}]")
        };
        tracing::info!(%saga_id, from = %from.region, to = %to.region, "Starting cross-shard transfer");

        self.run(
            from.region,
            AtomicOp::Withdraw {
                from: from.account_id,
                amount,
                description: tag.clone(),
            },
        )
        .await?;

        let deposit = self
            .run(
                to.region,
                AtomicOp::Deposit {
                    to: to.account_id,
                    amount,
                    description: tag,
                },
            )
            .await;
        let Err(deposit_error) = deposit else {
            return Ok(saga_id);
        };

        // A lost connection or elapsed deadline may hide a committed deposit.
        if matches!(deposit_error, StoreError::Connection(_)) {
            tracing::error!(
                %saga_id,
                from_region = %from.region,
                from_account_id = %from.account_id,
                to_region = %to.region,
                to_account_id = %to.account_id,
                %amount,
                withdraw = "committed",
                deposit = "unknown",
                error = %deposit_error,
                "Cross-shard transfer outcome unknown, not refunding"
            );
            return Err(StoreError::Procedure(format!(
                "saga {saga_id} outcome unknown; manual reconciliation required"
            )));
        }

        tracing::warn!(%saga_id, error = %deposit_error, "Deposit leg failed, refunding source");
        let refund = AtomicOp::Deposit {
            to: from.account_id,
            amount,
            description: format!("refund [saga {saga_id}]"),
        };
        match self.run(from.region, refund).await {
            Ok(()) => Err(deposit_error),
            Err(refund_error) => {
                tracing::error!(
                    %saga_id,
                    account_id = %from.account_id,
                    region = %from.region,
                    %amount,
                    deposit_error = %deposit_error,
                    refund_error = %refund_error,
                    "Cross-shard transfer left unbalanced"
                );
                Err(StoreError::Procedure(format!(
                    "saga {saga_id} could not be compensated; manual reconciliation required"
                )))
            }
        }
    }
}

fn routed(accounts: &[PlacedAccount]) {
    for account in accounts {
        tracing::debug!(
            phase = %Phase::Routed,
            region = %account.region,
            account_id = %account.account_id,
            "Routed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::resolver::Target;
    use async_trait::async_trait;
    use serde_json::json;
    use shardbank_core::{AccountId, AccountNumber, NewAccount, NewUser, UserId, UserLocation};

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn request(payload: serde_json::Value) -> MoneyRequest {
        serde_json::from_value(payload).unwrap()
    }

    fn dispatcher(backend: &Arc<MemoryBackend>, policy: CrossShardPolicy) -> TransactionDispatcher {
        TransactionDispatcher::new(backend.clone(), backend.clone(), policy)
    }

    /// Accounts NA-1 (balance 100) and EU-1 (balance 20).
    fn two_shards() -> (Arc<MemoryBackend>, AccountId, AccountId) {
        let backend = Arc::new(MemoryBackend::new());
        let ana = backend.seed_user("ana", Region::Na).unwrap();
        let eve = backend.seed_user("eve", Region::Eu).unwrap();
        let na = backend.seed_account(ana, "NA-1", dec(100)).unwrap();
        let eu = backend.seed_account(eve, "EU-1", dec(20)).unwrap();
        (backend, na, eu)
    }

    #[tokio::test]
    async fn deposit_commits_balance_and_record() {
        let backend = Arc::new(MemoryBackend::new());
        let ana = backend.seed_user("ana", Region::Na).unwrap();
        backend
            .seed_account_with_id(AccountId::new(42), ana, "NA-42", dec(50))
            .unwrap();

        let outcome = dispatcher(&backend, CrossShardPolicy::Reject)
            .dispatch(request(json!({
                "transaction_type": "DEPOSIT",
                "to_account_id": 42,
                "amount": 100.00
            })))
            .await
            .unwrap();

        assert_eq!(outcome.message, "Deposit completed successfully");
        assert_eq!(outcome.shards, vec![Region::Na]);
        assert_eq!(backend.balance(Region::Na, AccountId::new(42)), Some(dec(150)));
        let records = backend.transactions(Region::Na);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].to_account_id, Some(AccountId::new(42)));
        assert_eq!(records[0].from_account_id, None);
        assert_eq!(records[0].transaction_type, "DEPOSIT");
    }

    #[tokio::test]
    async fn self_transfer_is_rejected_before_any_call() {
        let (backend, na, _) = two_shards();
        backend.set_offline(Target::Catalog, true);
        for region in Region::ALL {
            backend.set_offline(Target::Shard(region), true);
        }

        let err = dispatcher(&backend, CrossShardPolicy::Reject)
            .dispatch(request(json!({
                "transaction_type": "TRANSFER",
                "from_account_id": 10,
                "to_account_id": 10,
                "amount": 25
            })))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::invalid("Cannot transfer to the same account"));
        assert_eq!(backend.balance(Region::Na, na), Some(dec(100)));
    }

    #[tokio::test]
    async fn same_account_named_two_ways_is_rejected_after_routing() {
        let (backend, na, _) = two_shards();
        let err = dispatcher(&backend, CrossShardPolicy::Reject)
            .dispatch(request(json!({
                "transaction_type": "transfer",
                "from_account_number": "NA-1",
                "to_account_id": na.get(),
                "to_region": "na",
                "amount": 5
            })))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::invalid("Cannot transfer to the same account"));
        assert!(backend.transactions(Region::Na).is_empty());
    }

    #[tokio::test]
    async fn overdraft_rolls_back() {
        let (backend, na, _) = two_shards();
        let err = dispatcher(&backend, CrossShardPolicy::Reject)
            .dispatch(request(json!({
                "transaction_type": "WITHDRAWAL",
                "from_account_number": "NA-1",
                "amount": "100.01"
            })))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Procedure("Insufficient balance".into()));
        assert_eq!(backend.balance(Region::Na, na), Some(dec(100)));
        assert!(backend.transactions(Region::Na).is_empty());
    }

    #[tokio::test]
    async fn same_shard_transfer_uses_one_procedure() {
        let backend = Arc::new(MemoryBackend::new());
        let ana = backend.seed_user("ana", Region::Apac).unwrap();
        let a = backend.seed_account(ana, "AP-1", dec(40)).unwrap();
        let b = backend.seed_account(ana, "AP-2", dec(0)).unwrap();

        let outcome = dispatcher(&backend, CrossShardPolicy::Reject)
            .dispatch(request(json!({
                "transaction_type": "TRANSFER",
                "from_account_number": "AP-1",
                "to_account_number": "AP-2",
                "amount": 15
            })))
            .await
            .unwrap();

        assert_eq!(outcome.message, "Transfer completed successfully");
        assert_eq!(outcome.saga_id, None);
        assert_eq!(backend.balance(Region::Apac, a), Some(dec(25)));
        assert_eq!(backend.balance(Region::Apac, b), Some(dec(15)));
        assert_eq!(backend.transactions(Region::Apac).len(), 1);
    }

    #[tokio::test]
    async fn cross_shard_transfer_is_rejected_by_default() {
        let (backend, na, eu) = two_shards();
        let err = dispatcher(&backend, CrossShardPolicy::default())
            .dispatch(request(json!({
                "transaction_type": "TRANSFER",
                "from_account_number": "NA-1",
                "to_account_number": "EU-1",
                "amount": 10
            })))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::invalid("cross-shard transfers are not supported"));
        assert_eq!(backend.balance(Region::Na, na), Some(dec(100)));
        assert_eq!(backend.balance(Region::Eu, eu), Some(dec(20)));
    }

    #[tokio::test]
    async fn compensated_transfer_moves_funds_across_shards() {
        let (backend, na, eu) = two_shards();
        let outcome = dispatcher(&backend, CrossShardPolicy::Compensate)
            .dispatch(request(json!({
                "transaction_type": "TRANSFER",
                "from_account_number": "NA-1",
                "to_account_number": "EU-1",
                "amount": 30,
                "description": "rent"
            })))
            .await
            .unwrap();

        let saga_id = outcome.saga_id.unwrap();
        assert_eq!(outcome.shards, vec![Region::Na, Region::Eu]);
        assert_eq!(backend.balance(Region::Na, na), Some(dec(70)));
        assert_eq!(backend.balance(Region::Eu, eu), Some(dec(50)));
        let tag = format!("rent [saga {saga_id}]");
        assert_eq!(backend.transactions(Region::Na)[0].description, tag);
        assert_eq!(backend.transactions(Region::Eu)[0].description, tag);
    }

    #[tokio::test]
    async fn failed_deposit_leg_refunds_source() {
        let (backend, na, eu) = two_shards();
        backend.fail_procedures(Region::Eu, Some("Account is frozen"));

        let err = dispatcher(&backend, CrossShardPolicy::Compensate)
            .dispatch(request(json!({
                "transaction_type": "TRANSFER",
                "from_account_number": "NA-1",
                "to_account_number": "EU-1",
                "amount": 30
            })))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::Procedure("Account is frozen".into()));
        assert_eq!(backend.balance(Region::Na, na), Some(dec(100)));
        assert_eq!(backend.balance(Region::Eu, eu), Some(dec(20)));
        let kinds: Vec<_> = backend
            .transactions(Region::Na)
            .into_iter()
            .map(|t| t.transaction_type)
            .collect();
        assert_eq!(kinds, ["WITHDRAWAL", "DEPOSIT"]);
    }

    /// Shard gateway that rejects every deposit, refunds included.
    struct NoDeposits(Arc<MemoryBackend>);

    #[async_trait]
    impl ShardGateway for NoDeposits {
        async fn find_account_id_by_number(
            &self,
            region: Region,
            number: &AccountNumber,
        ) -> Result<Option<AccountId>> {
            self.0.find_account_id_by_number(region, number).await
        }

        async fn user_by_username(
            &self,
            region: Region,
            username: &str,
        ) -> Result<Option<UserLocation>> {
            self.0.user_by_username(region, username).await
        }

        async fn insert_user(&self, user_id: UserId, user: &NewUser) -> Result<()> {
            self.0.insert_user(user_id, user).await
        }

        async fn insert_account(&self, region: Region, account: &NewAccount) -> Result<AccountId> {
            self.0.insert_account(region, account).await
        }

        async fn execute(&self, region: Region, op: &AtomicOp) -> Result<()> {
            if matches!(op, AtomicOp::Deposit { .. }) {
                return Err(StoreError::Procedure("Account is frozen".into()));
            }
            self.0.execute(region, op).await
        }
    }

    /// Shard gateway that commits deposits on `lossy` and then loses the reply.
    struct LostCommitAck {
        inner: Arc<MemoryBackend>,
        lossy: Region,
    }

    #[async_trait]
    impl ShardGateway for LostCommitAck {
        async fn find_account_id_by_number(
            &self,
            region: Region,
            number: &AccountNumber,
        ) -> Result<Option<AccountId>> {
            self.inner.find_account_id_by_number(region, number).await
        }

        async fn user_by_username(
            &self,
            region: Region,
            username: &str,
        ) -> Result<Option<UserLocation>> {
            self.inner.user_by_username(region, username).await
        }

        async fn insert_user(&self, user_id: UserId, user: &NewUser) -> Result<()> {
            self.inner.insert_user(user_id, user).await
        }

        async fn insert_account(&self, region: Region, account: &NewAccount) -> Result<AccountId> {
            self.inner.insert_account(region, account).await
        }

        async fn execute(&self, region: Region, op: &AtomicOp) -> Result<()> {
            self.inner.execute(region, op).await?;
            if region == self.lossy && matches!(op, AtomicOp::Deposit { .. }) {
                return Err(StoreError::Connection("deadline elapsed after commit".into()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn uncertain_deposit_is_not_refunded() {
        let (backend, na, eu) = two_shards();
        let dispatcher = TransactionDispatcher::new(
            backend.clone(),
            Arc::new(LostCommitAck {
                inner: backend.clone(),
                lossy: Region::Eu,
            }),
            CrossShardPolicy::Compensate,
        );

        let err = dispatcher
            .dispatch(request(json!({
                "transaction_type": "TRANSFER",
                "from_account_number": "NA-1",
                "to_account_number": "EU-1",
                "amount": 30
            })))
            .await
            .unwrap_err();

        let StoreError::Procedure(message) = err else {
            panic!("expected procedure error, got {err:?}");
        };
        assert!(message.contains("outcome unknown"));
        assert!(message.contains("manual reconciliation"));
        let na_balance = backend.balance(Region::Na, na).unwrap();
        let eu_balance = backend.balance(Region::Eu, eu).unwrap();
        assert_eq!((na_balance, eu_balance), (dec(70), dec(50)));
        assert_eq!(na_balance + eu_balance, dec(120));
        let kinds: Vec<_> = backend
            .transactions(Region::Na)
            .into_iter()
            .map(|t| t.transaction_type)
            .collect();
        assert_eq!(kinds, ["WITHDRAWAL"]);
    }

    #[tokio::test]
    async fn failed_refund_names_the_saga() {
        let (backend, na, _) = two_shards();
        let dispatcher = TransactionDispatcher::new(
            backend.clone(),
            Arc::new(NoDeposits(backend.clone())),
            CrossShardPolicy::Compensate,
        );

        let err = dispatcher
            .dispatch(request(json!({
                "transaction_type": "TRANSFER",
                "from_account_number": "NA-1",
                "to_account_number": "EU-1",
                "amount": 30
            })))
            .await
            .unwrap_err();

        let StoreError::Procedure(message) = err else {
            panic!("expected procedure error, got {err:?}");
        };
        assert!(message.starts_with("saga "));
        assert!(message.contains("manual reconciliation"));
        assert_eq!(backend.balance(Region::Na, na), Some(dec(70)));
    }

    #[tokio::test]
    async fn other_types_are_recorded_without_balance_change() {
        let (backend, na, _) = two_shards();
        let outcome = dispatcher(&backend, CrossShardPolicy::Reject)
            .dispatch(request(json!({
                "transaction_type": "fee",
                "from_account_number": "NA-1",
                "amount": "2.50"
            })))
            .await
            .unwrap();

        assert_eq!(outcome.message, "Transaction inserted successfully");
        assert_eq!(outcome.transaction_type, TransactionType::Other("FEE".into()));
        assert_eq!(backend.balance(Region::Na, na), Some(dec(100)));
        let records = backend.transactions(Region::Na);
        assert_eq!(records[0].transaction_type, "FEE");
        assert_eq!(records[0].status, "COMPLETED");
        assert_eq!(records[0].amount, Decimal::new(250, 2));
    }

    #[tokio::test]
    async fn unknown_account_is_invalid() {
        let (backend, _, _) = two_shards();
        let err = dispatcher(&backend, CrossShardPolicy::Reject)
            .dispatch(request(json!({
                "transaction_type": "DEPOSIT",
                "to_account_id": 77,
                "amount": 1
            })))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::invalid("account 77 not found"));
    }

    #[tokio::test]
    async fn unreachable_shard_surfaces_connection_error() {
        let (backend, _, _) = two_shards();
        backend.set_offline(Target::Shard(Region::Eu), true);
        let err = dispatcher(&backend, CrossShardPolicy::Reject)
            .dispatch(request(json!({
                "transaction_type": "DEPOSIT",
                "to_account_number": "EU-1",
                "amount": 1
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("Compensate".parse(), Ok(CrossShardPolicy::Compensate));
        assert_eq!(" reject ".parse(), Ok(CrossShardPolicy::Reject));
        assert!("2pc".parse::<CrossShardPolicy>().is_err());
    }
}
