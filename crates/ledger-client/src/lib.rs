//! Ledger Client SDK.
//!
//! This crate provides a client library for services to interact with the ledger API.
//!
//! # Example
//!
//! ```no_run
//! use ledger_client::{LedgerClient, Transfer};
//!
//! # async fn example() -> Result<(), ledger_client::ClientError> {
//! let client = LedgerClient::new("http://ledger.payments.svc:8080")?;
//!
//! client.open_account("c1", "savings", 1000).await?;
//! client.open_account("c2", "current", 0).await?;
//!
//! client
//!     .transfer(&Transfer {
//!         from_customer_id: "c1".into(),
//!         from_account_id: "savings".into(),
//!         to_customer_id: "c2".into(),
//!         to_account_id: "current".into(),
//!         amount: 200,
//!         fee: 10,
//!     })
//!     .await?;
//!
//! let history = client.list_transactions("c1", "savings").await?;
//! println!("{} transactions", history.transactions.len());
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

pub use client::{ClientOptions, LedgerClient};
pub use error::ClientError;
pub use types::*;
