//! Shardbank Client SDK.
//!
//! This crate provides a client library for the shardbank dashboard API.
//!
//! # Example
//!
//! ```no_run
//! use rust_decimal::Decimal;
//! use shardbank_client::{ShardbankClient, TransactionRequest};
//!
//! # async fn example() -> Result<(), shardbank_client::ClientError> {
//! let client = ShardbankClient::new("http://localhost:5001")?;
//!
//! let result = client
//!     .insert_transaction(&TransactionRequest::deposit_to_number("ACC-1001", Decimal::from(25)))
//!     .await?;
//!
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, ShardbankClient};
pub use error::ClientError;
pub use types::*;
