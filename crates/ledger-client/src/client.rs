//! Ledger HTTP client implementation.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    Account, AccountList, ApiErrorResponse, InvokeRequest, ReconcileReport, Transaction,
    TransactionList, Transfer, TransferId, TransferRecord,
};

/// Ledger API client.
///
/// Each method maps onto one ledger function invoked through
/// `POST /v1/invoke/:function`.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: Client,
    base_url: String,
}

impl LedgerClient {
    /// Create a new ledger client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the ledger service (e.g., `"http://ledger:8080"`)
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new ledger client with custom options.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Invoke a ledger function and return its raw JSON output.
    ///
    /// Returns `None` when the function produced no output.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn invoke(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<Option<Vec<u8>>, ClientError> {
        let url = format!("{}/v1/invoke/{function}", self.base_url);
        tracing::debug!(function, ?args, "Invoking ledger function");

        let response = self
            .client
            .post(&url)
            .json(&InvokeRequest { args })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status.is_success() {
            let body = response.bytes().await?;
            return Ok((!body.is_empty()).then(|| body.to_vec()));
        }

        Err(Self::error_from(response).await)
    }

    async fn invoke_json<T: DeserializeOwned>(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<Option<T>, ClientError> {
        self.invoke(function, args)
            .await?
            .map(|body| serde_json::from_slice(&body))
            .transpose()
            .map_err(ClientError::from)
    }

    async fn invoke_required<T: DeserializeOwned>(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<T, ClientError> {
        self.invoke_json(function, args)
            .await?
            .ok_or_else(|| ClientError::EmptyResponse(function.to_string()))
    }

    /// Open a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the account exists or the request fails.
    pub async fn open_account(
        &self,
        customer_id: &str,
        account_id: &str,
        balance: i64,
    ) -> Result<Account, ClientError> {
        let payload = serde_json::json!({
            "customerID": customer_id,
            "accountID": account_id,
            "balance": balance,
        });
        self.invoke_required("OpenAccount", &[payload.to_string()])
            .await
    }

    /// Get an account, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_account(
        &self,
        customer_id: &str,
        account_id: &str,
    ) -> Result<Option<Account>, ClientError> {
        self.invoke_json("GetAccount", &args([customer_id, account_id]))
            .await
    }

    /// List a customer's accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_accounts(&self, customer_id: &str) -> Result<AccountList, ClientError> {
        self.invoke_required("GetAccountList", &args([customer_id]))
            .await
    }

    /// Add `amount` to an open account.
    ///
    /// # Errors
    ///
    /// Returns `AccountClosed`, `NotFound`, or another error on failure.
    pub async fn topup_account(
        &self,
        customer_id: &str,
        account_id: &str,
        amount: i64,
    ) -> Result<Account, ClientError> {
        let amount = amount.to_string();
        self.invoke_required("TopupAccount", &args([customer_id, account_id, &amount]))
            .await
    }

    /// Close an account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or another error on failure.
    pub async fn close_account(
        &self,
        customer_id: &str,
        account_id: &str,
    ) -> Result<Account, ClientError> {
        self.invoke_required("CloseAccount", &args([customer_id, account_id]))
            .await
    }

    /// Move funds between two accounts.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds`, `AccountClosed`, `NotFound`, or another
    /// error on failure.
    pub async fn transfer(&self, transfer: &Transfer) -> Result<(), ClientError> {
        let payload = serde_json::to_string(transfer)?;
        self.invoke("TransferMoney", &[payload]).await?;
        Ok(())
    }

    /// Get one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or another error on failure.
    pub async fn get_transaction(
        &self,
        customer_id: &str,
        account_id: &str,
        transaction_id: &str,
    ) -> Result<Transaction, ClientError> {
        self.invoke_required(
            "GetTransaction",
            &args([customer_id, account_id, transaction_id]),
        )
        .await
    }

    /// List an account's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_transactions(
        &self,
        customer_id: &str,
        account_id: &str,
    ) -> Result<TransactionList, ClientError> {
        self.invoke_required("GetTransactionList", &args([customer_id, account_id]))
            .await
    }

    /// Get a transfer's journal record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or another error on failure.
    pub async fn get_transfer(&self, id: &TransferId) -> Result<TransferRecord, ClientError> {
        self.invoke_required("GetTransfer", &[id.to_string()]).await
    }

    /// Finish or abort interrupted transfers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn reconcile(&self) -> Result<ReconcileReport, ClientError> {
        let url = format!("{}/v1/reconcile", self.base_url);
        let response = self.client.post(&url).send().await?;

        if response.status().is_success() {
            return Ok(response.json().await?);
        }
        Err(Self::error_from(response).await)
    }

    /// Convert an error response into a typed error.
    async fn error_from(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let body = api_error.error;
                match body.code.as_str() {
                    "insufficient_funds" => ClientError::InsufficientFunds {
                        balance: body.detail_i64("balance"),
                        required: body.detail_i64("required"),
                    },
                    "account_closed" => ClientError::AccountClosed {
                        customer_id: body.detail_str("customer_id"),
                        account_id: body.detail_str("account_id"),
                    },
                    "not_found" => ClientError::NotFound(body.message),
                    _ => ClientError::Api {
                        code: body.code,
                        message: body.message,
                        status: status.as_u16(),
                    },
                }
            }
            Err(_) => ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            },
        }
    }
}

fn args<const N: usize>(values: [&str; N]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}
