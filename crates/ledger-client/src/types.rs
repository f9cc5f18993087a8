//! Request and response types for the ledger client.

use serde::{Deserialize, Serialize};

pub use ledger_core::{
    Account, AccountList, FailureCode, Transaction, TransactionList, Transfer, TransferId,
    TransferRecord, TransferStage, TxStatus,
};

/// Invocation request body.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeRequest<'a> {
    /// Positional arguments.
    pub args: &'a [String],
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReconcileReport {
    /// Transfers rolled forward to committed.
    pub committed: Vec<TransferId>,
    /// Transfers found with no leg applied.
    pub aborted: Vec<TransferId>,
    /// Transfers that could not be finished.
    #[serde(default)]
    pub unresolved: Vec<TransferId>,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Additional details.
    pub details: Option<serde_json::Value>,
}

impl ApiErrorBody {
    pub(crate) fn detail_i64(&self, field: &str) -> i64 {
        self.details
            .as_ref()
            .and_then(|d| d.get(field))
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(0)
    }

    pub(crate) fn detail_str(&self, field: &str) -> String {
        self.details
            .as_ref()
            .and_then(|d| d.get(field))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}
