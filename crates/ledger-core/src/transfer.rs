//! Transfer requests and the transfer journal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::ids::{Leg, TransactionId, TransferId};

/// Object type tag for transfer journal keys.
pub const TRANSFER_OBJECT_TYPE: &str = "Transfer";

/// A request to move `amount` between two accounts, charging `fee` to the
/// sender only. Not persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Sender's customer.
    #[serde(rename = "fromCustomerID", default)]
    pub from_customer_id: String,

    /// Sender's account.
    #[serde(rename = "fromAccountID", default)]
    pub from_account_id: String,

    /// Recipient's customer.
    #[serde(rename = "toCustomerID", default)]
    pub to_customer_id: String,

    /// Recipient's account.
    #[serde(rename = "toAccountID", default)]
    pub to_account_id: String,

    /// Amount credited to the recipient.
    #[serde(default)]
    pub amount: i64,

    /// Fee retained by the system, debited from the sender.
    #[serde(default)]
    pub fee: i64,
}

impl Transfer {
    /// Decode a `TransferMoney` JSON payload. Does not validate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the JSON does not decode.
    pub fn from_payload(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| LedgerError::InvalidPayload(e.to_string()))
    }

    /// Check the request is well formed.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the amount is not positive, the fee is
    /// negative, an identifier is empty, or both sides name the same account.
    pub fn validate(&self) -> Result<()> {
        if self.amount <= 0 {
            return Err(LedgerError::validation(format!(
                "transfer amount must be positive, got {}",
                self.amount
            )));
        }
        if self.fee < 0 {
            return Err(LedgerError::validation(format!(
                "transfer fee must not be negative, got {}",
                self.fee
            )));
        }

        let fields = [
            ("fromCustomerID", &self.from_customer_id),
            ("fromAccountID", &self.from_account_id),
            ("toCustomerID", &self.to_customer_id),
            ("toAccountID", &self.to_account_id),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(LedgerError::validation(format!("missing {name}")));
        }

        if self.from_customer_id == self.to_customer_id && self.from_account_id == self.to_account_id
        {
            return Err(LedgerError::validation(
                "source and destination account must differ",
            ));
        }

        self.total_debit().map(|_| ())
    }

    /// Amount taken from the sender: `amount + fee`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` on overflow.
    pub fn total_debit(&self) -> Result<i64> {
        self.amount
            .checked_add(self.fee)
            .ok_or_else(|| LedgerError::validation("transfer amount plus fee overflows"))
    }
}

/// Progress of a transfer through its two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStage {
    /// Written before either leg.
    Pending,
    /// Source debited and its transaction recorded.
    Debited,
    /// Both legs recorded.
    Committed,
    /// The debit never landed; nothing was applied.
    Aborted,
}

impl TransferStage {
    /// Whether reconciliation has nothing left to do.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }
}

/// Journal entry tracking one accepted transfer across its two legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    /// Journal ID.
    #[serde(rename = "transferID")]
    pub id: TransferId,

    /// The request being carried out.
    pub transfer: Transfer,

    /// Current stage.
    pub stage: TransferStage,

    /// ID of the `Debited` transaction.
    #[serde(rename = "debitTransactionID")]
    pub debit_transaction_id: TransactionId,

    /// ID of the `Credited` transaction.
    #[serde(rename = "creditTransactionID")]
    pub credit_transaction_id: TransactionId,

    /// When the record was first written.
    pub created_at: DateTime<Utc>,

    /// When the stage last changed.
    pub updated_at: DateTime<Utc>,
}

impl TransferRecord {
    /// Start a pending journal entry for `transfer`.
    #[must_use]
    pub fn pending(transfer: Transfer) -> Self {
        let id = TransferId::generate();
        let now = Utc::now();
        Self {
            debit_transaction_id: TransactionId::for_leg(&id, Leg::Debit),
            credit_transaction_id: TransactionId::for_leg(&id, Leg::Credit),
            id,
            transfer,
            stage: TransferStage::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `stage`, touching `updated_at`.
    pub fn advance(&mut self, stage: TransferStage) {
        self.stage = stage;
        self.updated_at = Utc::now();
    }
}
