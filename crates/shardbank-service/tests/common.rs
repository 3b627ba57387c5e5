//! Common test utilities for shardbank integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use rust_decimal::Decimal;

use shardbank_core::{AccountId, Region, UserId};
use shardbank_service::{create_router, AppState, ServiceConfig};
use shardbank_store::{CrossShardPolicy, MemoryBackend};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// In-memory catalog and shards behind the server.
    pub backend: Arc<MemoryBackend>,
}

impl TestHarness {
    /// Create a new test harness with empty shards, rejecting cross-shard transfers.
    pub fn new() -> Self {
        Self::with_policy(CrossShardPolicy::Reject)
    }

    /// Create a new test harness with the given cross-shard policy.
    pub fn with_policy(cross_shard_policy: CrossShardPolicy) -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let config = ServiceConfig {
            port: 0,
            cross_shard_policy,
            ..ServiceConfig::default()
        };

        let state = AppState::new(config, backend.clone(), backend.clone());
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, backend }
    }

    /// Seed a user.
    pub fn user(&self, username: &str, region: Region) -> UserId {
        self.backend
            .seed_user(username, region)
            .expect("Failed to seed user")
    }

    /// Seed an account on the owner's shard.
    pub fn account(&self, user_id: UserId, number: &str, balance: i64) -> AccountId {
        self.backend
            .seed_account(user_id, number, Decimal::from(balance))
            .expect("Failed to seed account")
    }

    /// Current balance of an account.
    pub fn balance(&self, region: Region, account_id: AccountId) -> Option<Decimal> {
        self.backend.balance(region, account_id)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
