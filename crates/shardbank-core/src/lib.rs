//! Core types for the shardbank dashboard backend.
//!
//! This crate provides the domain vocabulary shared by the storage, routing and
//! HTTP layers:
//!
//! - **Regions**: `Region`, `ShardLocation`, `DeploymentContext`
//! - **Identifiers**: `UserId`, `AccountId` (shard-local), `AccountNumber` (global)
//! - **Users and accounts**: `NewUserRequest`, `NewAccountRequest`, `UserLocation`, `AccountInfo`
//! - **Money movement**: `MoneyRequest`, `MoneyMovement`, `MoneyOp`, `AccountRef`
//!
//! # Identifier scopes
//!
//! `UserId` and `AccountNumber` are unique across every shard and are safe keys
//! for catalog lookups. `AccountId` is only unique inside the shard that issued
//! it and must never be used to identify an account globally.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod error;
pub mod ids;
mod lenient;
pub mod region;
pub mod transaction;
pub mod user;

pub use account::{AccountInfo, NewAccount, NewAccountRequest, DEFAULT_CURRENCY};
pub use error::{CoreError, Result};
pub use ids::{AccountId, AccountNumber, IdError, UserId};
pub use region::{DeploymentContext, Region, ShardLocation};
pub use transaction::{
    AccountRef, MoneyMovement, MoneyOp, MoneyRequest, TransactionType, DEFAULT_STATUS,
};
pub use user::{NewUser, NewUserRequest, UserLocation};
