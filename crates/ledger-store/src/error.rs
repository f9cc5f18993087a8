//! Error types for ledger storage.

use ledger_core::LedgerError;

use crate::keys::KeyError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// A composite key could not be built or parsed.
    #[error("key error: {0}")]
    Key(#[from] KeyError),
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            // Reserved characters come from caller-supplied identifiers.
            StoreError::Key(e) => Self::Validation(e.to_string()),
            StoreError::Database(msg) => Self::Store(msg),
        }
    }
}
