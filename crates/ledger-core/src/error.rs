//! Error types for the ledger.

use crate::ids::IdError;
use crate::transaction::FailureCode;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Coarse classification of a [`LedgerError`].
///
/// Validation and not-found errors never leave a partial write behind.
/// Policy errors leave exactly one `Failed` transaction and no balance change.
/// Store errors leave state as of the last successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing arguments.
    Validation,
    /// Lookup miss.
    NotFound,
    /// Business rule rejected the operation.
    Policy,
    /// Stored record changed since it was read.
    Conflict,
    /// Underlying state store failure.
    Store,
}

/// Errors that can occur in ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Malformed or missing input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Request payload could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// An account with the same key already exists.
    #[error("account already exists: {customer_id}/{account_id}")]
    AccountExists {
        /// Owning customer.
        customer_id: String,
        /// Account within the customer.
        account_id: String,
    },

    /// Account not found.
    #[error("account not found: {customer_id}/{account_id}")]
    AccountNotFound {
        /// Owning customer.
        customer_id: String,
        /// Account within the customer.
        account_id: String,
    },

    /// Transaction not found.
    #[error("transaction not found: {transaction_id}")]
    TransactionNotFound {
        /// The transaction ID that was not found.
        transaction_id: String,
    },

    /// Transfer journal record not found.
    #[error("transfer not found: {transfer_id}")]
    TransferNotFound {
        /// The transfer ID that was not found.
        transfer_id: String,
    },

    /// Source or destination account is closed.
    #[error("account closed: {customer_id}/{account_id}")]
    AccountClosed {
        /// Owning customer.
        customer_id: String,
        /// The closed account.
        account_id: String,
    },

    /// Source account cannot cover the transfer.
    #[error("insufficient funds in account {account_id}: balance={balance}, required={required}")]
    InsufficientFunds {
        /// The source account.
        account_id: String,
        /// Current balance.
        balance: i64,
        /// Amount the funds policy requires.
        required: i64,
    },

    /// Optimistic version check failed.
    #[error("version conflict on {key}: expected={expected}, found={found}")]
    Conflict {
        /// Display form of the record key.
        key: String,
        /// Version the caller read.
        expected: u64,
        /// Version currently stored.
        found: u64,
    },

    /// No handler is registered under the function name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// A stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// State store failure.
    #[error("storage error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::InvalidPayload(_)
            | Self::AccountExists { .. }
            | Self::UnknownFunction(_)
            | Self::InvalidId(_) => ErrorKind::Validation,
            Self::AccountNotFound { .. }
            | Self::TransactionNotFound { .. }
            | Self::TransferNotFound { .. } => ErrorKind::NotFound,
            Self::AccountClosed { .. } | Self::InsufficientFunds { .. } => ErrorKind::Policy,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Serialization(_) | Self::Store(_) => ErrorKind::Store,
        }
    }

    /// The failure code recorded for a policy rejection, if this is one.
    #[must_use]
    pub const fn failure_code(&self) -> Option<FailureCode> {
        match self {
            Self::AccountClosed { .. } => Some(FailureCode::AccountClosed),
            Self::InsufficientFunds { .. } => Some(FailureCode::InsufficientFunds),
            _ => None,
        }
    }

    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_errors_carry_failure_codes() {
        let closed = LedgerError::AccountClosed {
            customer_id: "c1".into(),
            account_id: "a1".into(),
        };
        assert_eq!(closed.kind(), ErrorKind::Policy);
        assert_eq!(closed.failure_code(), Some(FailureCode::AccountClosed));

        let funds = LedgerError::InsufficientFunds {
            account_id: "a1".into(),
            balance: 10,
            required: 20,
        };
        assert_eq!(funds.failure_code(), Some(FailureCode::InsufficientFunds));
    }

    #[test]
    fn non_policy_errors_have_no_failure_code() {
        let err = LedgerError::validation("missing customer ID");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.failure_code().is_none());

        let err = LedgerError::Store("disk full".into());
        assert_eq!(err.kind(), ErrorKind::Store);
    }
}
