//! Liveness of the ledger service.
//!
//! Answers without touching the state store, so a slow or wedged backend
//! does not fail the check. Reports which backend and funds policy this
//! instance was started with.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// `memory` or `rocksdb`.
    pub store_backend: String,
    /// Floor check applied to transfer sources.
    pub funds_policy: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "ledger",
        version: env!("CARGO_PKG_VERSION"),
        store_backend: state.config.backend.to_string(),
        funds_policy: state.config.ledger.funds_policy.to_string(),
    })
}
