//! Chaincode invocation handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use ledger_chaincode::ReconcileReport;

use crate::error::ApiError;
use crate::state::AppState;

/// Invocation request body.
#[derive(Debug, Default, Deserialize)]
pub struct InvokeRequest {
    /// Positional string arguments for the function.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Run one ledger function.
///
/// The handler's JSON output is returned verbatim; an empty output becomes
/// `204 No Content`.
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    Path(function): Path<String>,
    Json(req): Json<InvokeRequest>,
) -> Result<Response, ApiError> {
    let output = state.ledger.handle(&function, &req.args)?;

    if output.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(([(header::CONTENT_TYPE, "application/json")], output).into_response())
}

/// Finish or abort every interrupted transfer.
pub async fn reconcile(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReconcileReport>, ApiError> {
    let report = state.ledger.transfers().reconcile()?;

    tracing::info!(
        committed = report.committed.len(),
        aborted = report.aborted.len(),
        unresolved = report.unresolved.len(),
        "Reconciliation requested"
    );
    Ok(Json(report))
}
