//! Account records.
//!
//! An account is owned by a customer and holds a signed balance in minor
//! currency units. Accounts are never deleted; closing one only sets a flag.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::ids::TransactionId;

/// Object type tag for account keys.
pub const ACCOUNT_OBJECT_TYPE: &str = "Account";

/// A customer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Owning customer, assigned by the caller.
    #[serde(rename = "customerID")]
    pub customer_id: String,

    /// Account ID, unique within the customer.
    #[serde(rename = "accountID")]
    pub account_id: String,

    /// Balance in minor currency units.
    pub balance: i64,

    /// Once set, no credit or debit may succeed.
    #[serde(default)]
    pub closed: bool,

    /// Incremented on every persisted write.
    #[serde(default)]
    pub version: u64,

    /// Transfer legs applied to `balance`, each added in the same write as
    /// its balance change. A leg is dropped once its transaction record
    /// exists, at the next leg applied to this account.
    #[serde(rename = "appliedLegs", default, skip_serializing_if = "Vec::is_empty")]
    pub applied_legs: Vec<TransactionId>,
}

/// Payload accepted by `OpenAccount`.
#[derive(Debug, Clone, Deserialize)]
struct OpenAccountPayload {
    #[serde(rename = "customerID", default)]
    customer_id: String,
    #[serde(rename = "accountID", default)]
    account_id: String,
    #[serde(default)]
    balance: i64,
}

impl Account {
    /// Create an open account with the given starting balance.
    #[must_use]
    pub fn new(customer_id: impl Into<String>, account_id: impl Into<String>, balance: i64) -> Self {
        Self {
            customer_id: customer_id.into(),
            account_id: account_id.into(),
            balance,
            closed: false,
            version: 0,
            applied_legs: Vec::new(),
        }
    }

    /// Decode and validate an `OpenAccount` JSON payload.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the JSON does not decode, and `Validation`
    /// if an identifier is empty or the balance is negative.
    pub fn from_payload(data: &[u8]) -> Result<Self> {
        let payload: OpenAccountPayload =
            serde_json::from_slice(data).map_err(|e| LedgerError::InvalidPayload(e.to_string()))?;

        if payload.customer_id.trim().is_empty() {
            return Err(LedgerError::validation("missing customer ID"));
        }
        if payload.account_id.trim().is_empty() {
            return Err(LedgerError::validation("missing account ID"));
        }
        if payload.balance < 0 {
            return Err(LedgerError::validation(format!(
                "initial balance must not be negative, got {}",
                payload.balance
            )));
        }

        Ok(Self::new(payload.customer_id, payload.account_id, payload.balance))
    }

    /// Add `amount` to the balance. In-memory only; the caller persists.
    ///
    /// # Errors
    ///
    /// Returns `Validation` on overflow.
    pub fn credit(&mut self, amount: i64) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::validation("balance overflow on credit"))?;
        Ok(())
    }

    /// Subtract `amount` from the balance. In-memory only; the caller persists.
    ///
    /// No floor is enforced here. Overdraft policy belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns `Validation` on overflow.
    pub fn debit(&mut self, amount: i64) -> Result<()> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::validation("balance overflow on debit"))?;
        Ok(())
    }

    /// Whether the transfer leg `leg` is marked as applied to this balance.
    #[must_use]
    pub fn has_applied_leg(&self, leg: &TransactionId) -> bool {
        self.applied_legs.contains(leg)
    }

    /// Key attributes under [`ACCOUNT_OBJECT_TYPE`].
    #[must_use]
    pub fn key_attributes(&self) -> [&str; 2] {
        [&self.customer_id, &self.account_id]
    }
}

/// Result of `GetAccountList`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountList {
    /// Accounts of one customer, in scan order.
    pub accounts: Vec<Account>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_opens_account() {
        let account =
            Account::from_payload(br#"{"customerID":"c1","accountID":"a1","balance":1000}"#)
                .unwrap();
        assert_eq!(account, Account::new("c1", "a1", 1000));
        assert!(!account.closed);
        assert_eq!(account.version, 0);
    }

    #[test]
    fn payload_balance_defaults_to_zero() {
        let account = Account::from_payload(br#"{"customerID":"c1","accountID":"a1"}"#).unwrap();
        assert_eq!(account.balance, 0);
    }

    #[test]
    fn payload_requires_identifiers() {
        let err = Account::from_payload(br#"{"accountID":"a1"}"#).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let err = Account::from_payload(br#"{"customerID":"c1","accountID":""}"#).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn payload_rejects_negative_balance() {
        let err =
            Account::from_payload(br#"{"customerID":"c1","accountID":"a1","balance":-1}"#)
                .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let err = Account::from_payload(b"{not json").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPayload(_)));
    }

    #[test]
    fn debit_has_no_floor() {
        let mut account = Account::new("c1", "a1", 100);
        account.debit(150).unwrap();
        assert_eq!(account.balance, -50);
        account.credit(70).unwrap();
        assert_eq!(account.balance, 20);
    }

    #[test]
    fn credit_overflow_is_an_error() {
        let mut account = Account::new("c1", "a1", i64::MAX);
        assert!(account.credit(1).is_err());
        assert_eq!(account.balance, i64::MAX);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let json = serde_json::to_value(Account::new("c1", "a1", 5)).unwrap();
        assert_eq!(json["customerID"], "c1");
        assert_eq!(json["accountID"], "a1");
        assert_eq!(json["balance"], 5);
        assert_eq!(json["closed"], false);
        assert!(json.get("appliedLegs").is_none());
    }

    #[test]
    fn applied_legs_survive_a_round_trip() {
        let mut account = Account::new("c1", "a1", 5);
        let leg: TransactionId = "t-D".parse().unwrap();
        account.applied_legs.push(leg.clone());

        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("appliedLegs"));
        let decoded: Account = serde_json::from_str(&json).unwrap();
        assert!(decoded.has_applied_leg(&leg));
        assert!(!decoded.has_applied_leg(&"t-C".parse().unwrap()));
    }
}
