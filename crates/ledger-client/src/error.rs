//! Client error types.

/// Errors that can occur when using the ledger client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Source account cannot cover the transfer.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Account is closed.
    #[error("account closed: {customer_id}/{account_id}")]
    AccountClosed {
        /// Owning customer.
        customer_id: String,
        /// The closed account.
        account_id: String,
    },

    /// Account, transaction, transfer or function not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server returned no content where a record was expected.
    #[error("empty response from {0}")]
    EmptyResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
