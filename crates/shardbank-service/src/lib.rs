//! Shardbank HTTP API Service.
//!
//! This crate exposes the dashboard's REST surface over the shard routing
//! layer in `shardbank-store`:
//!
//! - Reporting endpoints backed by catalog views
//! - User and account inserts routed to the owner's shard
//! - Money movements (deposit, withdrawal, transfer) through the dispatcher
//! - Diagnostics for shard resolution and username lookup
//!
//! Every failure is returned as `{"error": ...}` with a sanitized message;
//! internal detail only reaches the logs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Health handler is async for routing

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
