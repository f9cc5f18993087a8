//! Ledger chaincode.
//!
//! The ledger core invoked once per external call: it resolves a function
//! name to a handler and runs it to completion against a [`StateStore`].
//!
//! - [`AccountLedger`]: open, read, list, credit, debit and close accounts
//! - [`TransactionLedger`]: append-only per-account transaction history
//! - [`TransferEngine`]: two-account transfers with a reconciliation journal
//! - [`HandlerMap`]: function name to handler mapping
//!
//! # Example
//!
//! ```
//! use ledger_chaincode::{Chaincode, LedgerConfig};
//! use ledger_store::MemoryStore;
//!
//! let cc = Chaincode::new(MemoryStore::new(), LedgerConfig::default());
//! let account = cc
//!     .handle(
//!         "OpenAccount",
//!         &[r#"{"customerID":"c1","accountID":"a1","balance":1000}"#.to_string()],
//!     )
//!     .unwrap();
//! assert!(!account.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod accounts;
mod codec;
pub mod config;
pub mod handlers;
pub mod transactions;
pub mod transfer;

pub use accounts::AccountLedger;
pub use config::LedgerConfig;
pub use handlers::{Handler, HandlerMap};
pub use transactions::TransactionLedger;
pub use transfer::{ReconcileReport, TransferEngine};

use ledger_core::{LedgerError, Result};
use ledger_store::StateStore;

/// The ledger bound to one state store.
pub struct Chaincode<S> {
    store: S,
    config: LedgerConfig,
    handlers: HandlerMap<S>,
}

impl<S: StateStore> Chaincode<S> {
    /// Build the ledger with the standard handler mapping.
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self::with_handlers(store, config, HandlerMap::standard())
    }

    /// Build the ledger with a custom handler mapping.
    pub fn with_handlers(store: S, config: LedgerConfig, handlers: HandlerMap<S>) -> Self {
        tracing::debug!(
            functions = ?handlers.names(),
            funds_policy = %config.funds_policy,
            "Chaincode handlers registered"
        );
        Self {
            store,
            config,
            handlers,
        }
    }

    /// Invoke `function` with `args`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFunction` if nothing is registered under `function`,
    /// otherwise whatever the handler returns.
    pub fn handle(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        tracing::debug!(function, ?args, "Invoking chaincode handler");

        let handler = self
            .handlers
            .get(function)
            .ok_or_else(|| LedgerError::UnknownFunction(function.to_string()))?;

        let result = handler(self, args);
        if let Err(e) = &result {
            tracing::error!(function, error = %e, "Handler failed");
        }
        result
    }

    /// Account operations.
    pub fn accounts(&self) -> AccountLedger<'_, S> {
        AccountLedger::new(&self.store)
    }

    /// Transaction history operations.
    pub fn transactions(&self) -> TransactionLedger<'_, S> {
        TransactionLedger::new(&self.store)
    }

    /// Transfer operations under the configured funds policy.
    pub fn transfers(&self) -> TransferEngine<'_, S> {
        TransferEngine::new(&self.store, self.config.funds_policy)
    }

    /// The configuration in effect.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The underlying state store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
