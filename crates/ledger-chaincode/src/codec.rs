//! JSON encoding of persisted records.

use serde::de::DeserializeOwned;
use serde::Serialize;

use ledger_core::{LedgerError, Result};

/// Encode a record for the state store.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| LedgerError::Serialization(e.to_string()))
}

/// Decode a record read from the state store.
pub(crate) fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    serde_json::from_slice(data).map_err(|e| {
        tracing::error!(
            record_type = std::any::type_name::<T>(),
            error = %e,
            "Failed to decode stored record"
        );
        LedgerError::Serialization(e.to_string())
    })
}
