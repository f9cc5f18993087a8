//! Ledger HTTP API Service.
//!
//! Exposes the ledger chaincode over HTTP:
//!
//! - `POST /v1/invoke/:function` runs one ledger function
//! - `POST /v1/reconcile` finishes interrupted transfers
//! - `GET /health` reports liveness

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Chaincode calls are synchronous

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ServiceConfig, StoreBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{open_store, AppState, Ledger};
