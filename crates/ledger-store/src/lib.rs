//! State store gateway for the ledger.
//!
//! The ledger only needs three primitives from its host: point get, point
//! put, and an ordered range scan. This crate defines that contract as the
//! [`StateStore`] trait, the composite key codec used to address records,
//! and two backends:
//!
//! - [`MemoryStore`]: ordered in-memory map, used by tests and local runs
//! - `RocksStore`: `RocksDB` world state (feature `rocksdb-backend`)
//!
//! # Example
//!
//! ```
//! use ledger_store::{keys, MemoryStore, StateStore};
//!
//! let store = MemoryStore::new();
//! let key = keys::build_key("Account", &["c1", "a1"]).unwrap();
//! store.put(&key, b"{}".to_vec()).unwrap();
//!
//! let found: Vec<_> = store
//!     .scan_prefix("Account", &["c1"])
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(found.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

use std::sync::Arc;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

/// A key and its stored value.
pub type KvPair = (String, Vec<u8>);

/// Ordered iterator returned by range scans.
///
/// Each item is fallible so a caller can skip one bad entry and keep going.
pub type ScanIter<'a> = Box<dyn Iterator<Item = Result<KvPair>> + 'a>;

/// The storage contract the ledger depends on.
///
/// Every `put` is visible to later `get` and `range_scan` calls. Durability
/// and per-call atomicity are the backend's responsibility.
pub trait StateStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Scan `[start, end)` in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot be started.
    fn range_scan(&self, start: &str, end: &str) -> Result<ScanIter<'_>>;

    /// Scan every record under `object_type` whose attributes start with
    /// `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is not a valid key or the scan fails.
    fn scan_prefix(&self, object_type: &str, prefix: &[&str]) -> Result<ScanIter<'_>> {
        let range = keys::prefix_range(object_type, prefix)?;
        tracing::trace!(
            start = %keys::DisplayKey(&range.start),
            "Prefix scan"
        );
        self.range_scan(&range.start, &range.end)
    }
}

impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).put(key, value)
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<ScanIter<'_>> {
        (**self).range_scan(start, end)
    }
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).put(key, value)
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<ScanIter<'_>> {
        (**self).range_scan(start, end)
    }
}
