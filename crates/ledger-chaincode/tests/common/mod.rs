//! Shared helpers for chaincode integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use ledger_chaincode::{AccountLedger, Chaincode, LedgerConfig};
use ledger_core::{Account, Transaction, TransactionList};
use ledger_store::{keys, MemoryStore, Result, ScanIter, StateStore};

/// Memory store that counts `put` calls per object type.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    puts: Mutex<HashMap<String, usize>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes to `object_type` since the last reset.
    pub fn puts(&self, object_type: &str) -> usize {
        self.puts.lock().unwrap().get(object_type).copied().unwrap_or(0)
    }

    pub fn reset(&self) {
        self.puts.lock().unwrap().clear();
    }
}

impl StateStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let (object_type, _) = keys::split_key(key)?;
        *self.puts.lock().unwrap().entry(object_type).or_default() += 1;
        self.inner.put(key, value)
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<ScanIter<'_>> {
        self.inner.range_scan(start, end)
    }
}

/// Write run by [`HookStore`] right after a matching `put` lands.
pub struct Hook {
    object_type: String,
    skip: usize,
    action: Box<dyn FnOnce(&MemoryStore) + Send>,
}

impl Hook {
    /// Run `action` after the `(skip + 1)`th write to `object_type`.
    pub fn after_put(
        object_type: &str,
        skip: usize,
        action: impl FnOnce(&MemoryStore) + Send + 'static,
    ) -> Self {
        Self {
            object_type: object_type.to_string(),
            skip,
            action: Box::new(action),
        }
    }

    /// Top up `customer_id/account_id` by `amount` after the `(skip + 1)`th
    /// write to `object_type`, as a concurrent client would.
    pub fn topup_after(
        object_type: &str,
        skip: usize,
        customer_id: &str,
        account_id: &str,
        amount: i64,
    ) -> Self {
        let (customer_id, account_id) = (customer_id.to_string(), account_id.to_string());
        Self::after_put(object_type, skip, move |store| {
            AccountLedger::new(store)
                .topup(&customer_id, &account_id, amount)
                .unwrap();
        })
    }
}

/// Memory store that interleaves one foreign write into a later `put`.
#[derive(Default)]
pub struct HookStore {
    inner: MemoryStore,
    hook: Mutex<Option<Hook>>,
}

impl HookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `hook`, replacing any hook that has not fired yet.
    pub fn arm(&self, hook: Hook) {
        *self.hook.lock().unwrap() = Some(hook);
    }

    /// Whether the armed hook is still waiting.
    pub fn armed(&self) -> bool {
        self.hook.lock().unwrap().is_some()
    }
}

impl StateStore for HookStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.inner.put(key, value)?;
        let (object_type, _) = keys::split_key(key)?;

        let mut slot = self.hook.lock().unwrap();
        let due = match slot.as_mut() {
            Some(hook) if hook.object_type == object_type => {
                if hook.skip == 0 {
                    true
                } else {
                    hook.skip -= 1;
                    false
                }
            }
            _ => false,
        };
        let fired = if due { slot.take() } else { None };
        drop(slot);

        if let Some(hook) = fired {
            (hook.action)(&self.inner);
        }
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<ScanIter<'_>> {
        self.inner.range_scan(start, end)
    }
}

pub fn chaincode() -> Chaincode<CountingStore> {
    Chaincode::new(CountingStore::new(), LedgerConfig::default())
}

pub fn account_json(customer_id: &str, account_id: &str, balance: i64) -> String {
    serde_json::json!({
        "customerID": customer_id,
        "accountID": account_id,
        "balance": balance,
    })
    .to_string()
}

pub fn transfer_json(from: (&str, &str), to: (&str, &str), amount: i64, fee: i64) -> String {
    serde_json::json!({
        "fromCustomerID": from.0,
        "fromAccountID": from.1,
        "toCustomerID": to.0,
        "toAccountID": to.1,
        "amount": amount,
        "fee": fee,
    })
    .to_string()
}

pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Open `customer_id/account_id` with `balance`, then clear write counts.
pub fn open(cc: &Chaincode<CountingStore>, customer_id: &str, account_id: &str, balance: i64) {
    cc.handle("OpenAccount", &[account_json(customer_id, account_id, balance)])
        .unwrap();
    cc.store().reset();
}

/// Open `customer_id/account_id` with `balance` on any store.
pub fn open_on<S: StateStore>(cc: &Chaincode<S>, customer_id: &str, account_id: &str, balance: i64) {
    cc.handle("OpenAccount", &[account_json(customer_id, account_id, balance)])
        .unwrap();
}

pub fn balance<S: StateStore>(cc: &Chaincode<S>, customer_id: &str, account_id: &str) -> i64 {
    let bytes = cc
        .handle("GetAccount", &args(&[customer_id, account_id]))
        .unwrap();
    serde_json::from_slice::<Account>(&bytes).unwrap().balance
}

pub fn history<S: StateStore>(cc: &Chaincode<S>, customer_id: &str, account_id: &str) -> Vec<Transaction> {
    let bytes = cc
        .handle("GetTransactionList", &args(&[customer_id, account_id]))
        .unwrap();
    serde_json::from_slice::<TransactionList>(&bytes)
        .unwrap()
        .transactions
}
