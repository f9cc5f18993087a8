//! Liveness endpoint.

mod common;

use common::TestHarness;
use ledger_chaincode::LedgerConfig;
use ledger_core::FundsPolicy;

#[tokio::test]
async fn health_reports_service_and_version() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "ledger");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_reports_store_backend_and_policy() {
    let harness =
        TestHarness::with_ledger(LedgerConfig::default().with_funds_policy(FundsPolicy::AmountOnly));

    let body: serde_json::Value = harness.server.get("/health").await.json();
    let expected = if cfg!(feature = "rocksdb-backend") { "rocksdb" } else { "memory" };
    assert_eq!(body["storeBackend"], expected);
    assert_eq!(body["fundsPolicy"], "amount_only");
}

#[tokio::test]
async fn health_does_not_depend_on_ledger_state() {
    let harness = TestHarness::new();
    harness.open_account("c1", "a1", 100).await;

    let before: serde_json::Value = harness.server.get("/health").await.json();
    harness.open_account("c1", "a2", 5).await;
    let after: serde_json::Value = harness.server.get("/health").await.json();

    assert_eq!(before, after);
}
