//! Account ledger.
//!
//! The only writer of account records. Every persisted write bumps the
//! account's `version`; a write whose caller read an older version is
//! refused with [`LedgerError::Conflict`].

use ledger_core::{Account, AccountList, LedgerError, Result, ACCOUNT_OBJECT_TYPE};
use ledger_store::keys::{self, DisplayKey};
use ledger_store::StateStore;

use crate::codec::{decode, encode};

/// Account operations over a state store.
pub struct AccountLedger<'a, S: ?Sized> {
    store: &'a S,
}

fn account_key(customer_id: &str, account_id: &str) -> Result<String> {
    Ok(keys::build_key(ACCOUNT_OBJECT_TYPE, &[customer_id, account_id])
        .map_err(ledger_store::StoreError::from)?)
}

fn not_found(customer_id: &str, account_id: &str) -> LedgerError {
    LedgerError::AccountNotFound {
        customer_id: customer_id.to_string(),
        account_id: account_id.to_string(),
    }
}

impl<'a, S: StateStore + ?Sized> AccountLedger<'a, S> {
    /// Wrap a state store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Persist a newly opened account.
    ///
    /// # Errors
    ///
    /// Returns `AccountExists` if the key is taken, or a store error.
    pub fn open(&self, mut account: Account) -> Result<Account> {
        let key = account_key(&account.customer_id, &account.account_id)?;
        if self.store.get(&key)?.is_some() {
            return Err(LedgerError::AccountExists {
                customer_id: account.customer_id,
                account_id: account.account_id,
            });
        }

        account.closed = false;
        account.version = 1;
        account.applied_legs.clear();
        self.store.put(&key, encode(&account)?)?;

        tracing::info!(
            customer_id = %account.customer_id,
            account_id = %account.account_id,
            balance = account.balance,
            "Account opened"
        );
        Ok(account)
    }

    /// Look up an account, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the record does not decode.
    pub fn find(&self, customer_id: &str, account_id: &str) -> Result<Option<Account>> {
        let key = account_key(customer_id, account_id)?;
        self.store.get(&key)?.map(|data| decode(&data)).transpose()
    }

    /// Look up an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if absent.
    pub fn get(&self, customer_id: &str, account_id: &str) -> Result<Account> {
        self.find(customer_id, account_id)?
            .ok_or_else(|| not_found(customer_id, account_id))
    }

    /// All accounts of a customer, in scan order.
    ///
    /// Entries that fail to read or decode are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot be started.
    pub fn list(&self, customer_id: &str) -> Result<AccountList> {
        let mut list = AccountList::default();
        for item in self.store.scan_prefix(ACCOUNT_OBJECT_TYPE, &[customer_id])? {
            match item.map_err(LedgerError::from).and_then(|(_, data)| decode(&data)) {
                Ok(account) => list.accounts.push(account),
                Err(e) => {
                    tracing::warn!(customer_id, error = %e, "Skipping unreadable account record");
                }
            }
        }
        Ok(list)
    }

    /// Write `account` back, provided the stored version still equals
    /// `account.version`. On success `account.version` is incremented.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the record vanished, `Conflict` if
    /// someone else wrote it first, or a store error.
    pub fn save(&self, account: &mut Account) -> Result<()> {
        let key = account_key(&account.customer_id, &account.account_id)?;
        let stored: Account = self
            .store
            .get(&key)?
            .map(|data| decode(&data))
            .transpose()?
            .ok_or_else(|| not_found(&account.customer_id, &account.account_id))?;

        if stored.version != account.version {
            return Err(LedgerError::Conflict {
                key: DisplayKey(&key).to_string(),
                expected: account.version,
                found: stored.version,
            });
        }

        let mut next = account.clone();
        next.version += 1;
        self.store.put(&key, encode(&next)?)?;
        *account = next;
        Ok(())
    }

    /// Credit an open account and persist it.
    ///
    /// # Errors
    ///
    /// Returns `AccountClosed` for a closed account, or any error from
    /// [`save`](Self::save).
    pub fn apply_credit(&self, account: &mut Account, amount: i64) -> Result<()> {
        ensure_open(account)?;
        let mut updated = account.clone();
        updated.credit(amount)?;
        self.save(&mut updated)?;
        *account = updated;
        Ok(())
    }

    /// Debit an open account and persist it. No floor is checked here.
    ///
    /// # Errors
    ///
    /// Returns `AccountClosed` for a closed account, or any error from
    /// [`save`](Self::save).
    pub fn apply_debit(&self, account: &mut Account, amount: i64) -> Result<()> {
        ensure_open(account)?;
        let mut updated = account.clone();
        updated.debit(amount)?;
        self.save(&mut updated)?;
        *account = updated;
        Ok(())
    }

    /// Mark an account closed. Closing a closed account rewrites the same
    /// state.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if absent, or a store error.
    pub fn close(&self, customer_id: &str, account_id: &str) -> Result<Account> {
        let mut account = self.get(customer_id, account_id)?;
        account.closed = true;
        self.save(&mut account)?;

        tracing::info!(customer_id, account_id, "Account closed");
        Ok(account)
    }

    /// Add funds to an account from outside the ledger.
    ///
    /// # Errors
    ///
    /// Returns `Validation` unless `amount` is positive, `AccountNotFound`,
    /// `AccountClosed`, or a store error.
    pub fn topup(&self, customer_id: &str, account_id: &str, amount: i64) -> Result<Account> {
        if amount <= 0 {
            return Err(LedgerError::validation(format!(
                "top-up amount must be positive, got {amount}"
            )));
        }
        let mut account = self.get(customer_id, account_id)?;
        self.apply_credit(&mut account, amount)?;

        tracing::info!(
            customer_id,
            account_id,
            amount,
            balance = account.balance,
            "Account topped up"
        );
        Ok(account)
    }
}

fn ensure_open(account: &Account) -> Result<()> {
    if account.closed {
        return Err(LedgerError::AccountClosed {
            customer_id: account.customer_id.clone(),
            account_id: account.account_id.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::ErrorKind;
    use ledger_store::MemoryStore;

    #[test]
    fn open_then_get() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);

        let opened = ledger.open(Account::new("c1", "a1", 1000)).unwrap();
        assert_eq!(opened.version, 1);

        let fetched = ledger.get("c1", "a1").unwrap();
        assert_eq!(fetched, opened);
    }

    #[test]
    fn open_refuses_existing_key() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);
        ledger.open(Account::new("c1", "a1", 1000)).unwrap();

        let err = ledger.open(Account::new("c1", "a1", 0)).unwrap_err();
        assert!(matches!(err, LedgerError::AccountExists { .. }));
        assert_eq!(ledger.get("c1", "a1").unwrap().balance, 1000);
    }

    #[test]
    fn missing_account_is_not_found() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);
        assert!(ledger.find("c1", "a1").unwrap().is_none());
        assert_eq!(ledger.get("c1", "a1").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn list_returns_only_the_customers_accounts() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);
        for (customer, account) in [("c1", "a1"), ("c1", "a2"), ("c10", "a1"), ("c2", "a3")] {
            ledger.open(Account::new(customer, account, 0)).unwrap();
        }

        let list = ledger.list("c1").unwrap();
        let ids: Vec<_> = list.accounts.iter().map(|a| a.account_id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"a1") && ids.contains(&"a2"));
        assert!(ledger.list("nobody").unwrap().accounts.is_empty());
    }

    #[test]
    fn list_skips_undecodable_records() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);
        ledger.open(Account::new("c1", "a1", 0)).unwrap();
        let key = account_key("c1", "broken").unwrap();
        store.put(&key, b"not json".to_vec()).unwrap();

        let list = ledger.list("c1").unwrap();
        assert_eq!(list.accounts.len(), 1);
    }

    #[test]
    fn save_detects_lost_update() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);
        ledger.open(Account::new("c1", "a1", 100)).unwrap();

        let mut first = ledger.get("c1", "a1").unwrap();
        let mut second = ledger.get("c1", "a1").unwrap();

        ledger.apply_credit(&mut first, 10).unwrap();
        assert_eq!(first.version, 2);

        let err = ledger.apply_credit(&mut second, 20).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Conflict {
                expected: 1,
                found: 2,
                ..
            }
        ));
        assert_eq!(second.balance, 100);
        assert_eq!(ledger.get("c1", "a1").unwrap().balance, 110);
    }

    #[test]
    fn close_is_idempotent_and_blocks_credit() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);
        ledger.open(Account::new("c1", "a1", 100)).unwrap();

        assert!(ledger.close("c1", "a1").unwrap().closed);
        let again = ledger.close("c1", "a1").unwrap();
        assert!(again.closed);
        assert_eq!(again.balance, 100);

        let err = ledger.topup("c1", "a1", 5).unwrap_err();
        assert!(matches!(err, LedgerError::AccountClosed { .. }));
        assert_eq!(ledger.get("c1", "a1").unwrap().balance, 100);
    }

    #[test]
    fn topup_credits_and_persists() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);
        ledger.open(Account::new("c1", "a1", 100)).unwrap();

        let account = ledger.topup("c1", "a1", 250).unwrap();
        assert_eq!(account.balance, 350);
        assert_eq!(ledger.get("c1", "a1").unwrap().balance, 350);
    }

    #[test]
    fn topup_requires_positive_amount() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);
        ledger.open(Account::new("c1", "a1", 100)).unwrap();

        assert_eq!(
            ledger.topup("c1", "a1", 0).unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ledger.topup("c1", "missing", 5).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn reserved_characters_in_ids_are_validation_errors() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new(&store);
        let bad = format!("c{}", ledger_store::keys::SENTINEL);
        let err = ledger.open(Account::new(bad, "a1", 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(store.is_empty().unwrap());
    }
}
