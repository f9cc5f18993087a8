//! `RocksDB` storage implementation.
//!
//! All records live in one column family keyed by their composite key.
//! `RocksDB` orders keys bytewise, and UTF-8 byte order matches code point
//! order, so range scans agree with [`MemoryStore`](crate::MemoryStore).

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options,
};

use crate::error::{Result, StoreError};
use crate::schema::{all_column_families, cf};
use crate::{ScanIter, StateStore};

/// RocksDB-backed world state.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }
}

impl StateStore for RocksStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(cf::WORLD_STATE)?;
        self.db
            .get_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let cf = self.cf(cf::WORLD_STATE)?;
        self.db
            .put_cf(&cf, key.as_bytes(), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<ScanIter<'_>> {
        let cf = self.cf(cf::WORLD_STATE)?;
        let end = end.as_bytes().to_vec();

        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(start.as_bytes(), Direction::Forward))
            .take_while(move |item| {
                item.as_ref()
                    .map_or(true, |(key, _)| &**key < end.as_slice())
            })
            .map(|item| {
                let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
                let key = String::from_utf8(key.into_vec())
                    .map_err(|e| StoreError::Database(format!("non UTF-8 key: {e}")))?;
                Ok((key, value.into_vec()))
            });

        Ok(Box::new(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::build_key;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn get_put() {
        let (store, _dir) = create_test_store();
        assert!(store.get("missing").unwrap().is_none());

        store.put("k", b"v".to_vec()).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), b"v");
    }

    #[test]
    fn prefix_scan_matches_memory_ordering() {
        let (store, _dir) = create_test_store();
        for (customer, account) in [("c1", "a2"), ("c1", "a1"), ("c10", "a1"), ("c2", "a1")] {
            let key = build_key("Account", &[customer, account]).unwrap();
            store.put(&key, customer.as_bytes().to_vec()).unwrap();
        }

        let found: Vec<_> = store
            .scan_prefix("Account", &["c1"])
            .unwrap()
            .map(|item| item.unwrap().0)
            .collect();

        assert_eq!(
            found,
            vec![
                build_key("Account", &["c1", "a1"]).unwrap(),
                build_key("Account", &["c1", "a2"]).unwrap(),
            ]
        );
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store.put("k", b"durable".to_vec()).unwrap();
        }
        let store = RocksStore::open(dir.path()).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), b"durable");
    }
}
