//! In-process catalog and shards.
//!
//! `MemoryBackend` implements both gateways over plain collections so routing
//! and dispatch can be exercised without a database. Each region keeps its own
//! users, accounts and transactions, and issues its own account ids, so ids
//! collide across shards exactly as they do in production.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use shardbank_core::{
    AccountId, AccountInfo, AccountNumber, NewAccount, NewUser, Region, UserId, UserLocation,
};

use crate::error::{Result, StoreError};
use crate::ops::AtomicOp;
use crate::record::{Cell, RawRow};
use crate::report::Report;
use crate::resolver::Target;
use crate::{CatalogGateway, ShardGateway};

/// Number of rows returned by the recent transactions report.
const RECENT_LIMIT: usize = 10;

/// A transaction row as stored on a shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTransaction {
    /// Shard-local transaction id.
    pub transaction_id: i64,
    /// Debited account.
    pub from_account_id: Option<AccountId>,
    /// Credited account.
    pub to_account_id: Option<AccountId>,
    /// Transaction code.
    pub transaction_type: String,
    /// Amount.
    pub amount: Decimal,
    /// Status.
    pub status: String,
    /// Description.
    pub description: String,
    /// Insert time.
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone)]
struct UserRow {
    user_id: UserId,
    username: String,
    email: String,
    full_name: String,
    phone: Option<String>,
    address: Option<String>,
    region: Region,
    created_date: NaiveDateTime,
}

#[derive(Debug, Clone)]
struct AccountRow {
    account_id: AccountId,
    user_id: UserId,
    account_number: AccountNumber,
    account_type: String,
    balance: Decimal,
    currency: String,
    region: Region,
    status: String,
    created_date: NaiveDateTime,
}

#[derive(Debug)]
struct Shard {
    users: Vec<UserRow>,
    accounts: Vec<AccountRow>,
    transactions: Vec<StoredTransaction>,
    next_account_id: i64,
    next_transaction_id: i64,
}

impl Default for Shard {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            accounts: Vec::new(),
            transactions: Vec::new(),
            next_account_id: 1,
            next_transaction_id: 1,
        }
    }
}

impl Shard {
    fn account(&self, id: AccountId) -> Option<&AccountRow> {
        self.accounts.iter().find(|a| a.account_id == id)
    }

    fn account_mut(&mut self, id: AccountId) -> Option<&mut AccountRow> {
        self.accounts.iter_mut().find(|a| a.account_id == id)
    }

    fn require(&self, id: AccountId) -> Result<&AccountRow> {
        self.account(id)
            .ok_or_else(|| StoreError::Procedure(format!("Account {id} not found")))
    }

    fn credit(&mut self, id: AccountId, amount: Decimal) {
        if let Some(account) = self.account_mut(id) {
            account.balance += amount;
        }
    }

    fn record(
        &mut self,
        kind: &str,
        from: Option<AccountId>,
        to: Option<AccountId>,
        amount: Decimal,
        status: &str,
        description: &str,
    ) {
        let transaction_id = self.next_transaction_id;
        self.next_transaction_id += 1;
        self.transactions.push(StoredTransaction {
            transaction_id,
            from_account_id: from,
            to_account_id: to,
            transaction_type: kind.to_string(),
            amount,
            status: status.to_string(),
            description: description.to_string(),
            created_date: now(),
        });
    }

    /// Apply `op`; nothing changes when it fails.
    fn apply(&mut self, op: &AtomicOp) -> Result<()> {
        match op {
            AtomicOp::Deposit {
                to,
                amount,
                description,
            } => {
                self.require(*to)?;
                self.credit(*to, *amount);
                self.record("DEPOSIT", None, Some(*to), *amount, "COMPLETED", description);
            }
            AtomicOp::Withdraw {
                from,
                amount,
                description,
            } => {
                if self.require(*from)?.balance < *amount {
                    return Err(StoreError::Procedure("Insufficient balance".into()));
                }
                self.credit(*from, -*amount);
                self.record("WITHDRAWAL", Some(*from), None, *amount, "COMPLETED", description);
            }
            AtomicOp::Transfer {
                from,
                to,
                amount,
                description,
            } => {
                let available = self.require(*from)?.balance;
                self.require(*to)?;
                if available < *amount {
                    return Err(StoreError::Procedure("Insufficient balance".into()));
                }
                self.credit(*from, -*amount);
                self.credit(*to, *amount);
                self.record(
                    "TRANSFER",
                    Some(*from),
                    Some(*to),
                    *amount,
                    "COMPLETED",
                    description,
                );
            }
            AtomicOp::Record {
                kind,
                from,
                to,
                amount,
                status,
                description,
            } => self.record(kind, *from, *to, *amount, status, description),
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct State {
    shards: HashMap<Region, Shard>,
    next_user_id: i64,
    offline: HashSet<Target>,
    failing: HashMap<Region, String>,
}

impl State {
    fn reachable(&self, target: Target) -> Result<()> {
        if self.offline.contains(&target) {
            return Err(StoreError::Connection(format!("{target} is unreachable")));
        }
        Ok(())
    }

    fn shard(&mut self, region: Region) -> &mut Shard {
        self.shards.entry(region).or_default()
    }

    /// Shards in ascending shard-location order.
    fn ordered(&self) -> impl Iterator<Item = (Region, &Shard)> {
        Region::ALL
            .into_iter()
            .filter_map(|region| self.shards.get(&region).map(|shard| (region, shard)))
    }

    fn users(&self) -> impl Iterator<Item = &UserRow> {
        self.ordered().flat_map(|(_, shard)| shard.users.iter())
    }

    fn accounts(&self) -> impl Iterator<Item = &AccountRow> {
        self.ordered().flat_map(|(_, shard)| shard.accounts.iter())
    }

    fn transactions(&self) -> impl Iterator<Item = (Region, &StoredTransaction)> {
        self.ordered()
            .flat_map(|(region, shard)| shard.transactions.iter().map(move |t| (region, t)))
    }

    fn allocate_user_id(&mut self) -> UserId {
        self.next_user_id += 1;
        UserId::new(self.next_user_id)
    }

    fn insert_user(&mut self, user_id: UserId, user: &NewUser) -> Result<()> {
        if self.users().any(|u| u.user_id == user_id) {
            return Err(duplicate("users_pk"));
        }
        let shard = self.shard(user.region);
        if shard.users.iter().any(|u| u.username == user.username) {
            return Err(duplicate("users_username_uk"));
        }
        shard.users.push(UserRow {
            user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            region: user.region,
            created_date: now(),
        });
        self.next_user_id = self.next_user_id.max(user_id.get());
        Ok(())
    }

    fn insert_account(
        &mut self,
        region: Region,
        account_id: Option<AccountId>,
        account: &NewAccount,
    ) -> Result<AccountId> {
        let shard = self.shard(region);
        if !shard.users.iter().any(|u| u.user_id == account.user_id) {
            return Err(StoreError::Query(
                "insert or update on table \"accounts\" violates foreign key constraint".into(),
            ));
        }
        if shard
            .accounts
            .iter()
            .any(|a| a.account_number == account.account_number)
        {
            return Err(duplicate("accounts_number_uk"));
        }
        let account_id = account_id.unwrap_or(AccountId::new(shard.next_account_id));
        if shard.account(account_id).is_some() {
            return Err(duplicate("accounts_pk"));
        }
        shard.next_account_id = shard.next_account_id.max(account_id.get() + 1);
        shard.accounts.push(AccountRow {
            account_id,
            user_id: account.user_id,
            account_number: account.account_number.clone(),
            account_type: account.account_type.clone(),
            balance: account.balance,
            currency: account.currency.clone(),
            region,
            status: "ACTIVE".into(),
            created_date: now(),
        });
        Ok(account_id)
    }

    fn report(&self, report: Report) -> Vec<RawRow> {
        match report {
            Report::RegionalStats => self.regional_stats(),
            Report::OverallStats => vec![self.overall_stats()],
            Report::RecentTransactions => self.recent_transactions(),
            Report::AccountsByRegion => self.accounts_by_region(),
            Report::TransactionsByDate => self.transactions_by_date(),
            Report::UserDirectory => self.user_directory(),
            Report::UserSummaries => self.user_summaries(),
            Report::AccountListing => self.account_listing(),
        }
    }

    fn regional_stats(&self) -> Vec<RawRow> {
        self.ordered()
            .map(|(region, shard)| {
                RawRow::new()
                    .with("REGION", Cell::Text(region.code().into()))
                    .with("USER_COUNT", count(shard.users.len()))
                    .with("ACCOUNT_COUNT", count(shard.accounts.len()))
                    .with(
                        "TOTAL_BALANCE",
                        Cell::Numeric(shard.accounts.iter().map(|a| a.balance).sum()),
                    )
                    .with("TRANSACTION_COUNT", count(shard.transactions.len()))
            })
            .collect()
    }

    fn overall_stats(&self) -> RawRow {
        RawRow::new()
            .with("TOTAL_USERS", count(self.users().count()))
            .with("TOTAL_ACCOUNTS", count(self.accounts().count()))
            .with(
                "TOTAL_BALANCE",
                Cell::Numeric(self.accounts().map(|a| a.balance).sum()),
            )
            .with("TOTAL_TRANSACTIONS", count(self.transactions().count()))
    }

    fn recent_transactions(&self) -> Vec<RawRow> {
        let mut rows: Vec<_> = self.transactions().collect();
        rows.sort_by(|(_, a), (_, b)| {
            b.created_date
                .cmp(&a.created_date)
                .then(b.transaction_id.cmp(&a.transaction_id))
        });
        rows.into_iter()
            .take(RECENT_LIMIT)
            .map(|(region, t)| {
                RawRow::new()
                    .with("TRANSACTION_ID", Cell::Int(t.transaction_id))
                    .with("REGION", Cell::Text(region.code().into()))
                    .with("FROM_ACCOUNT_ID", optional_id(t.from_account_id))
                    .with("TO_ACCOUNT_ID", optional_id(t.to_account_id))
                    .with("TRANSACTION_TYPE", Cell::Text(t.transaction_type.clone()))
                    .with("AMOUNT", Cell::Numeric(t.amount))
                    .with("STATUS", Cell::Text(t.status.clone()))
                    .with("DESCRIPTION", Cell::Text(t.description.clone()))
                    .with("CREATED_DATE", Cell::Timestamp(t.created_date))
            })
            .collect()
    }

    fn accounts_by_region(&self) -> Vec<RawRow> {
        let mut groups: BTreeMap<(u8, String), (Region, usize, Decimal)> = BTreeMap::new();
        for account in self.accounts() {
            let key = (
                account.region.shard_location().ordinal(),
                account.account_type.clone(),
            );
            let entry = groups
                .entry(key)
                .or_insert((account.region, 0, Decimal::ZERO));
            entry.1 += 1;
            entry.2 += account.balance;
        }
        groups
            .into_iter()
            .map(|((_, account_type), (region, accounts, balance))| {
                RawRow::new()
                    .with("REGION", Cell::Text(region.code().into()))
                    .with("ACCOUNT_TYPE", Cell::Text(account_type))
                    .with("ACCOUNT_COUNT", count(accounts))
                    .with("TOTAL_BALANCE", Cell::Numeric(balance))
            })
            .collect()
    }

    fn transactions_by_date(&self) -> Vec<RawRow> {
        let mut days: BTreeMap<NaiveDate, (usize, Decimal)> = BTreeMap::new();
        for (_, t) in self.transactions() {
            let entry = days.entry(t.created_date.date()).or_default();
            entry.0 += 1;
            entry.1 += t.amount;
        }
        days.into_iter()
            .map(|(day, (transactions, amount))| {
                RawRow::new()
                    .with("TRANSACTION_DATE", Cell::Date(day))
                    .with("TRANSACTION_COUNT", count(transactions))
                    .with("TOTAL_AMOUNT", Cell::Numeric(amount))
            })
            .collect()
    }

    fn user_directory(&self) -> Vec<RawRow> {
        let mut users: Vec<_> = self.users().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
            .into_iter()
            .map(|u| {
                RawRow::new()
                    .with("USER_ID", Cell::Int(u.user_id.get()))
                    .with("USERNAME", Cell::Text(u.username.clone()))
                    .with("FULL_NAME", Cell::Text(u.full_name.clone()))
            })
            .collect()
    }

    fn user_summaries(&self) -> Vec<RawRow> {
        let mut users: Vec<_> = self.users().collect();
        users.sort_by_key(|u| u.user_id);
        users
            .into_iter()
            .map(|u| {
                let owned: Vec<_> = self.accounts().filter(|a| a.user_id == u.user_id).collect();
                RawRow::new()
                    .with("USER_ID", Cell::Int(u.user_id.get()))
                    .with("USERNAME", Cell::Text(u.username.clone()))
                    .with("EMAIL", Cell::Text(u.email.clone()))
                    .with("FULL_NAME", Cell::Text(u.full_name.clone()))
                    .with("PHONE", optional_text(u.phone.as_ref()))
                    .with("ADDRESS", optional_text(u.address.as_ref()))
                    .with("REGION", Cell::Text(u.region.code().into()))
                    .with("CREATED_DATE", Cell::Timestamp(u.created_date))
                    .with("ACCOUNT_COUNT", count(owned.len()))
                    .with(
                        "TOTAL_BALANCE",
                        Cell::Numeric(owned.iter().map(|a| a.balance).sum()),
                    )
            })
            .collect()
    }

    fn account_listing(&self) -> Vec<RawRow> {
        let mut accounts: Vec<_> = self.accounts().collect();
        accounts.sort_by_key(|a| (a.account_id, a.region.shard_location()));
        accounts
            .into_iter()
            .map(|a| {
                let owner = self.users().find(|u| u.user_id == a.user_id);
                RawRow::new()
                    .with("ACCOUNT_ID", Cell::Int(a.account_id.get()))
                    .with("ACCOUNT_NUMBER", Cell::Text(a.account_number.to_string()))
                    .with("ACCOUNT_TYPE", Cell::Text(a.account_type.clone()))
                    .with("BALANCE", Cell::Numeric(a.balance))
                    .with("CURRENCY", Cell::Text(a.currency.clone()))
                    .with("REGION", Cell::Text(a.region.code().into()))
                    .with("STATUS", Cell::Text(a.status.clone()))
                    .with("CREATED_DATE", Cell::Timestamp(a.created_date))
                    .with("USER_ID", owner.map_or(Cell::Null, |u| Cell::Int(u.user_id.get())))
                    .with(
                        "USERNAME",
                        owner.map_or(Cell::Null, |u| Cell::Text(u.username.clone())),
                    )
                    .with(
                        "FULL_NAME",
                        owner.map_or(Cell::Null, |u| Cell::Text(u.full_name.clone())),
                    )
            })
            .collect()
    }
}

/// Catalog and shards held in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// An empty backend with every target reachable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make a target unreachable, or reachable again.
    pub fn set_offline(&self, target: Target, offline: bool) {
        let mut state = self.lock();
        if offline {
            state.offline.insert(target);
        } else {
            state.offline.remove(&target);
        }
    }

    /// Make every balance procedure on `region` fail with `message`, or stop failing.
    pub fn fail_procedures(&self, region: Region, message: Option<&str>) {
        let mut state = self.lock();
        match message {
            Some(message) => {
                state.failing.insert(region, message.to_string());
            }
            None => {
                state.failing.remove(&region);
            }
        }
    }

    /// Create a user with generated contact fields.
    pub fn seed_user(&self, username: &str, region: Region) -> Result<UserId> {
        let mut state = self.lock();
        let user_id = state.allocate_user_id();
        state.insert_user(
            user_id,
            &NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                full_name: username.to_string(),
                phone: None,
                address: None,
                region,
            },
        )?;
        Ok(user_id)
    }

    /// Open an account on the owner's shard with the next shard-local id.
    pub fn seed_account(
        &self,
        user_id: UserId,
        account_number: &str,
        balance: Decimal,
    ) -> Result<AccountId> {
        let mut state = self.lock();
        let region = owner_region(&state, user_id)?;
        state.insert_account(region, None, &seeded(user_id, account_number, balance)?)
    }

    /// Open an account with a chosen shard-local id.
    pub fn seed_account_with_id(
        &self,
        account_id: AccountId,
        user_id: UserId,
        account_number: &str,
        balance: Decimal,
    ) -> Result<()> {
        let mut state = self.lock();
        let region = owner_region(&state, user_id)?;
        state.insert_account(
            region,
            Some(account_id),
            &seeded(user_id, account_number, balance)?,
        )?;
        Ok(())
    }

    /// Current balance of an account on `region`'s shard.
    #[must_use]
    pub fn balance(&self, region: Region, account_id: AccountId) -> Option<Decimal> {
        let state = self.lock();
        state
            .shards
            .get(&region)
            .and_then(|shard| shard.account(account_id))
            .map(|account| account.balance)
    }

    /// Transaction rows stored on `region`'s shard, oldest first.
    #[must_use]
    pub fn transactions(&self, region: Region) -> Vec<StoredTransaction> {
        let state = self.lock();
        state
            .shards
            .get(&region)
            .map(|shard| shard.transactions.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogGateway for MemoryBackend {
    async fn user_region(&self, user_id: UserId) -> Result<Option<Region>> {
        let state = self.lock();
        state.reachable(Target::Catalog)?;
        let found = state
            .users()
            .find(|u| u.user_id == user_id)
            .map(|u| u.region);
        Ok(found)
    }

    async fn account_info_by_number(&self, number: &AccountNumber) -> Result<Option<AccountInfo>> {
        let state = self.lock();
        state.reachable(Target::Catalog)?;
        let found = state
            .accounts()
            .find(|a| &a.account_number == number)
            .map(|a| AccountInfo {
                account_number: a.account_number.clone(),
                region: a.region,
                shard_location: a.region.shard_location(),
            });
        Ok(found)
    }

    async fn account_region_by_id(&self, account_id: AccountId) -> Result<Option<Region>> {
        let state = self.lock();
        state.reachable(Target::Catalog)?;
        let found = state
            .ordered()
            .find(|(_, shard)| shard.account(account_id).is_some())
            .map(|(region, _)| region);
        Ok(found)
    }

    async fn next_user_id(&self) -> Result<UserId> {
        let mut state = self.lock();
        state.reachable(Target::Catalog)?;
        Ok(state.allocate_user_id())
    }

    async fn report_rows(&self, report: Report) -> Result<Vec<RawRow>> {
        let state = self.lock();
        state.reachable(Target::Catalog)?;
        Ok(state.report(report))
    }

    async fn ping(&self) -> Result<()> {
        self.lock().reachable(Target::Catalog)
    }
}

#[async_trait]
impl ShardGateway for MemoryBackend {
    async fn find_account_id_by_number(
        &self,
        region: Region,
        number: &AccountNumber,
    ) -> Result<Option<AccountId>> {
        let state = self.lock();
        state.reachable(Target::Shard(region))?;
        Ok(state.shards.get(&region).and_then(|shard| {
            shard
                .accounts
                .iter()
                .find(|a| &a.account_number == number)
                .map(|a| a.account_id)
        }))
    }

    async fn user_by_username(
        &self,
        region: Region,
        username: &str,
    ) -> Result<Option<UserLocation>> {
        let state = self.lock();
        state.reachable(Target::Shard(region))?;
        Ok(state.shards.get(&region).and_then(|shard| {
            shard
                .users
                .iter()
                .find(|u| u.username == username)
                .map(|u| UserLocation::new(u.user_id, region))
        }))
    }

    async fn insert_user(&self, user_id: UserId, user: &NewUser) -> Result<()> {
        let mut state = self.lock();
        state.reachable(Target::Shard(user.region))?;
        state.insert_user(user_id, user)
    }

    async fn insert_account(&self, region: Region, account: &NewAccount) -> Result<AccountId> {
        let mut state = self.lock();
        state.reachable(Target::Shard(region))?;
        state.insert_account(region, None, account)
    }

    async fn execute(&self, region: Region, op: &AtomicOp) -> Result<()> {
        let mut state = self.lock();
        state.reachable(Target::Shard(region))?;
        if !matches!(op, AtomicOp::Record { .. }) {
            if let Some(message) = state.failing.get(&region) {
                return Err(StoreError::Procedure(message.clone()));
            }
        }
        state.shard(region).apply(op)
    }
}

fn owner_region(state: &State, user_id: UserId) -> Result<Region> {
    state
        .users()
        .find(|u| u.user_id == user_id)
        .map(|u| u.region)
        .ok_or_else(|| StoreError::invalid(format!("user {user_id} not found")))
}

fn seeded(user_id: UserId, account_number: &str, balance: Decimal) -> Result<NewAccount> {
    Ok(NewAccount {
        user_id,
        account_number: account_number.parse().map_err(|e| StoreError::invalid(format!("{e}")))?,
        account_type: "CHECKING".into(),
        balance,
        currency: "USD".into(),
        region: None,
    })
}

fn duplicate(constraint: &str) -> StoreError {
    StoreError::Query(format!(
        "duplicate key value violates unique constraint \"{constraint}\""
    ))
}

fn count(n: usize) -> Cell {
    Cell::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn optional_id(id: Option<AccountId>) -> Cell {
    id.map_or(Cell::Null, |id| Cell::Int(id.get()))
}

fn optional_text(text: Option<&String>) -> Cell {
    text.map_or(Cell::Null, |t| Cell::Text(t.clone()))
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
