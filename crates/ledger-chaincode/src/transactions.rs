//! Transaction ledger.
//!
//! Append-only log of transfer outcomes per account. The only writer of
//! transaction records; an existing record is never overwritten.

use ledger_core::{
    FailureCode, LedgerError, Result, Transaction, TransactionId, TransactionList, Transfer,
    TransferId, TxStatus, CLOCK_OBJECT_TYPE, TRANSACTION_OBJECT_TYPE,
};
use ledger_store::{keys, StateStore, StoreError};

use crate::codec::{decode, encode};

/// Clock attribute under [`CLOCK_OBJECT_TYPE`] for transaction timestamps.
const TRANSACTION_CLOCK: &str = "transaction";

/// Transaction operations over a state store.
pub struct TransactionLedger<'a, S: ?Sized> {
    store: &'a S,
}

fn transaction_key(customer_id: &str, account_id: &str, id: &str) -> Result<String> {
    keys::build_key(TRANSACTION_OBJECT_TYPE, &[customer_id, account_id, id])
        .map_err(|e| StoreError::from(e).into())
}

impl<'a, S: StateStore + ?Sized> TransactionLedger<'a, S> {
    /// Wrap a state store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Record an outcome of `transfer` against one account under a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns a store error if any write fails.
    pub fn record(
        &self,
        customer_id: &str,
        account_id: &str,
        transfer: &Transfer,
        failure_code: Option<FailureCode>,
        status: TxStatus,
    ) -> Result<Transaction> {
        let created_at = self.tick()?;
        let tx = Transaction::new(
            TransactionId::generate(),
            customer_id,
            account_id,
            transfer,
            failure_code,
            status,
            created_at,
        );
        self.append(&tx)?;
        Ok(tx)
    }

    /// Record one leg of an accepted transfer under its journal-derived ID.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if that leg is already recorded, or a store error.
    pub fn record_leg(
        &self,
        id: TransactionId,
        transfer_id: TransferId,
        customer_id: &str,
        account_id: &str,
        transfer: &Transfer,
        status: TxStatus,
    ) -> Result<Transaction> {
        let created_at = self.tick()?;
        let tx = Transaction::new(id, customer_id, account_id, transfer, None, status, created_at)
            .with_transfer_id(transfer_id);
        self.append(&tx)?;
        Ok(tx)
    }

    fn append(&self, tx: &Transaction) -> Result<()> {
        let key = transaction_key(&tx.customer_id, &tx.account_id, tx.id.as_str())?;
        if self.store.get(&key)?.is_some() {
            return Err(LedgerError::validation(format!(
                "transaction {} already recorded",
                tx.id
            )));
        }
        self.store.put(&key, encode(tx)?)?;

        tracing::debug!(
            transaction_id = %tx.id,
            customer_id = %tx.customer_id,
            account_id = %tx.account_id,
            status = ?tx.status,
            failure_code = ?tx.failure_code,
            created_at = tx.created_at,
            "Transaction recorded"
        );
        Ok(())
    }

    /// Advance the logical clock and return the new value.
    fn tick(&self) -> Result<u64> {
        let key = keys::build_key(CLOCK_OBJECT_TYPE, &[TRANSACTION_CLOCK]).map_err(StoreError::from)?;
        let current: u64 = self
            .store
            .get(&key)?
            .map(|data| decode(&data))
            .transpose()?
            .unwrap_or(0);
        let next = current + 1;
        self.store.put(&key, encode(&next)?)?;
        Ok(next)
    }

    /// Whether a transaction exists.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn exists(&self, customer_id: &str, account_id: &str, id: &TransactionId) -> Result<bool> {
        let key = transaction_key(customer_id, account_id, id.as_str())?;
        Ok(self.store.get(&key)?.is_some())
    }

    /// Look up one transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if absent.
    pub fn get(&self, customer_id: &str, account_id: &str, id: &str) -> Result<Transaction> {
        let key = transaction_key(customer_id, account_id, id)?;
        self.store
            .get(&key)?
            .map(|data| decode(&data))
            .transpose()?
            .ok_or_else(|| LedgerError::TransactionNotFound {
                transaction_id: id.to_string(),
            })
    }

    /// History of one account, newest first.
    ///
    /// Entries that fail to read or decode are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot be started.
    pub fn list(&self, customer_id: &str, account_id: &str) -> Result<TransactionList> {
        let mut list = TransactionList::default();
        for item in self
            .store
            .scan_prefix(TRANSACTION_OBJECT_TYPE, &[customer_id, account_id])?
        {
            match item.map_err(LedgerError::from).and_then(|(_, data)| decode(&data)) {
                Ok(tx) => list.transactions.push(tx),
                Err(e) => {
                    tracing::warn!(
                        customer_id,
                        account_id,
                        error = %e,
                        "Skipping unreadable transaction record"
                    );
                }
            }
        }
        list.sort_newest_first();
        Ok(list)
    }
}
