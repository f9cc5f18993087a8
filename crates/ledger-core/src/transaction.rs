//! Transaction ledger entries.
//!
//! A transaction records one attempt or outcome of a transfer against one
//! account. Entries are append-only and never rewritten.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{TransactionId, TransferId};
use crate::transfer::Transfer;

/// Object type tag for transaction keys.
pub const TRANSACTION_OBJECT_TYPE: &str = "Transaction";

/// Object type tag for the logical clock that stamps `createdAt`.
pub const CLOCK_OBJECT_TYPE: &str = "Clock";

/// Outcome recorded on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// Funds left the account.
    Debited,
    /// Funds arrived in the account.
    Credited,
    /// The transfer was rejected.
    Failed,
}

/// Why a transfer was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCode {
    /// Source or destination account is closed.
    AccountClosed,
    /// Source balance does not cover the transfer.
    InsufficientFunds,
}

impl FailureCode {
    /// Wire name of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccountClosed => "AccountClosed",
            Self::InsufficientFunds => "InsufficientFunds",
        }
    }
}

/// An immutable ledger entry for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique per record.
    pub id: TransactionId,

    /// Owning customer of the affected account.
    #[serde(rename = "customerID")]
    pub customer_id: String,

    /// The affected account.
    #[serde(rename = "accountID")]
    pub account_id: String,

    /// Logical timestamp, strictly increasing per write.
    pub created_at: u64,

    /// Wall-clock time of the write. Informational only.
    pub recorded_at: DateTime<Utc>,

    /// Transfer amount.
    pub amount: i64,

    /// Transfer fee.
    pub fee: i64,

    /// Sender's customer.
    #[serde(rename = "fromCustomerID")]
    pub from_customer_id: String,

    /// Sender's account.
    #[serde(rename = "fromAccountID")]
    pub from_account_id: String,

    /// Recipient's customer.
    #[serde(rename = "toCustomerID")]
    pub to_customer_id: String,

    /// Recipient's account.
    #[serde(rename = "toAccountID")]
    pub to_account_id: String,

    /// Empty on success.
    #[serde(default, with = "failure_code_field")]
    pub failure_code: Option<FailureCode>,

    /// Outcome.
    pub status: TxStatus,

    /// Journal entry of the transfer, for the two legs of an accepted transfer.
    #[serde(rename = "transferID", default, skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<TransferId>,
}

impl Transaction {
    /// Build an entry for `customer_id`/`account_id` describing `transfer`.
    #[must_use]
    pub fn new(
        id: TransactionId,
        customer_id: &str,
        account_id: &str,
        transfer: &Transfer,
        failure_code: Option<FailureCode>,
        status: TxStatus,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            customer_id: customer_id.to_string(),
            account_id: account_id.to_string(),
            created_at,
            recorded_at: Utc::now(),
            amount: transfer.amount,
            fee: transfer.fee,
            from_customer_id: transfer.from_customer_id.clone(),
            from_account_id: transfer.from_account_id.clone(),
            to_customer_id: transfer.to_customer_id.clone(),
            to_account_id: transfer.to_account_id.clone(),
            failure_code,
            status,
            transfer_id: None,
        }
    }

    /// Attach the journal entry this transaction belongs to.
    #[must_use]
    pub fn with_transfer_id(mut self, transfer_id: TransferId) -> Self {
        self.transfer_id = Some(transfer_id);
        self
    }

    /// Key attributes under [`TRANSACTION_OBJECT_TYPE`].
    #[must_use]
    pub fn key_attributes(&self) -> [&str; 3] {
        [&self.customer_id, &self.account_id, self.id.as_str()]
    }
}

/// Result of `GetTransactionList`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionList {
    /// Transactions, newest first.
    pub transactions: Vec<Transaction>,
}

impl TransactionList {
    /// Order by `createdAt` descending. The sort is stable, so equal
    /// timestamps keep scan order.
    pub fn sort_newest_first(&mut self) {
        self.transactions.sort_by_key(|tx| Reverse(tx.created_at));
    }
}

/// Serializes `None` as an empty string, matching the wire format.
mod failure_code_field {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::FailureCode;

    pub fn serialize<S: Serializer>(
        code: &Option<FailureCode>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(code.map_or("", FailureCode::as_str))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<FailureCode>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "" => Ok(None),
            "AccountClosed" => Ok(Some(FailureCode::AccountClosed)),
            "InsufficientFunds" => Ok(Some(FailureCode::InsufficientFunds)),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["", "AccountClosed", "InsufficientFunds"],
            )),
        }
    }
}
