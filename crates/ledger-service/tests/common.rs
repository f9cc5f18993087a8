//! Common test utilities for ledger service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use ledger_chaincode::LedgerConfig;
use ledger_service::{create_router, open_store, AppState, ServiceConfig, StoreBackend};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a fresh store.
    pub fn new() -> Self {
        Self::with_ledger(LedgerConfig::default())
    }

    /// Create a harness with custom ledger settings.
    pub fn with_ledger(ledger: LedgerConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let backend = if cfg!(feature = "rocksdb-backend") {
            StoreBackend::RocksDb
        } else {
            StoreBackend::Memory
        };

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            backend,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            reconcile_on_startup: false,
            ledger,
        };

        let store = open_store(&config).expect("Failed to open store");
        let state = AppState::new(store, config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
        }
    }

    /// Invoke a ledger function with string arguments.
    pub async fn invoke(&self, function: &str, args: &[&str]) -> axum_test::TestResponse {
        self.server
            .post(&format!("/v1/invoke/{function}"))
            .json(&json!({ "args": args }))
            .await
    }

    /// Open an account and assert success.
    pub async fn open_account(&self, customer_id: &str, account_id: &str, balance: i64) {
        let payload = json!({
            "customerID": customer_id,
            "accountID": account_id,
            "balance": balance,
        })
        .to_string();
        self.invoke("OpenAccount", &[&payload])
            .await
            .assert_status_ok();
    }

    /// Fetch an account's balance.
    pub async fn balance(&self, customer_id: &str, account_id: &str) -> i64 {
        let response = self.invoke("GetAccount", &[customer_id, account_id]).await;
        response.assert_status_ok();
        let body: Value = response.json();
        body["balance"].as_i64().expect("balance is a number")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON transfer payload.
pub fn transfer_payload(from: (&str, &str), to: (&str, &str), amount: i64, fee: i64) -> String {
    json!({
        "fromCustomerID": from.0,
        "fromAccountID": from.1,
        "toCustomerID": to.0,
        "toAccountID": to.1,
        "amount": amount,
        "fee": fee,
    })
    .to_string()
}
