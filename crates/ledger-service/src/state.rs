//! Application state.

use std::sync::Arc;

use ledger_chaincode::Chaincode;
use ledger_store::{MemoryStore, StateStore};

use crate::config::{ServiceConfig, StoreBackend};

/// The chaincode over a type-erased store.
pub type Ledger = Chaincode<Arc<dyn StateStore>>;

/// Application state shared across handlers.
pub struct AppState {
    /// The ledger.
    pub ledger: Ledger,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>, config: ServiceConfig) -> Self {
        tracing::info!(
            backend = %config.backend,
            funds_policy = %config.ledger.funds_policy,
            "Ledger initialised"
        );
        let ledger = Chaincode::new(store, config.ledger.clone());
        Self { ledger, config }
    }
}

/// Open the backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, or `RocksDb` is
/// selected in a build without the `rocksdb-backend` feature.
pub fn open_store(config: &ServiceConfig) -> ledger_store::Result<Arc<dyn StateStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store - state will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::RocksDb => open_rocks(&config.data_dir),
    }
}

#[cfg(feature = "rocksdb-backend")]
fn open_rocks(data_dir: &str) -> ledger_store::Result<Arc<dyn StateStore>> {
    tracing::info!(path = %data_dir, "Opening RocksDB store");
    Ok(Arc::new(ledger_store::RocksStore::open(data_dir)?))
}

#[cfg(not(feature = "rocksdb-backend"))]
fn open_rocks(_data_dir: &str) -> ledger_store::Result<Arc<dyn StateStore>> {
    Err(ledger_store::StoreError::Database(
        "rocksdb backend not compiled in (enable feature rocksdb-backend)".into(),
    ))
}
