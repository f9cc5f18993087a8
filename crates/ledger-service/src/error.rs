//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use ledger_core::{ErrorKind, LedgerError};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Resource or function not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Business rule rejected the operation.
    #[error("{message}")]
    Rejected {
        /// Machine-readable rejection code.
        code: &'static str,
        /// Human-readable message.
        message: String,
        /// Structured details, including the recorded failure code.
        details: serde_json::Value,
    },

    /// Conflict - the record changed since it was read.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            Self::Rejected {
                code,
                message,
                details,
            } => (StatusCode::UNPROCESSABLE_ENTITY, code, message, Some(details)),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::UnknownFunction(name) => Self::NotFound(format!("unknown function: {name}")),
            LedgerError::InsufficientFunds {
                account_id,
                balance,
                required,
            } => Self::Rejected {
                code: "insufficient_funds",
                message,
                details: serde_json::json!({
                    "failure_code": ledger_core::FailureCode::InsufficientFunds.as_str(),
                    "account_id": account_id,
                    "balance": balance,
                    "required": required,
                }),
            },
            LedgerError::AccountClosed {
                customer_id,
                account_id,
            } => Self::Rejected {
                code: "account_closed",
                message,
                details: serde_json::json!({
                    "failure_code": ledger_core::FailureCode::AccountClosed.as_str(),
                    "customer_id": customer_id,
                    "account_id": account_id,
                }),
            },
            other => match other.kind() {
                ErrorKind::Validation => Self::BadRequest(message),
                ErrorKind::NotFound => Self::NotFound(message),
                ErrorKind::Conflict => Self::Conflict(message),
                ErrorKind::Policy | ErrorKind::Store => Self::Internal(message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_map_to_api_errors() {
        let err: ApiError = LedgerError::validation("missing customer ID").into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = LedgerError::UnknownFunction("Mint".into()).into();
        assert!(matches!(err, ApiError::NotFound(ref m) if m.contains("Mint")));

        let err: ApiError = LedgerError::Conflict {
            key: "Account/c1/a1".into(),
            expected: 1,
            found: 2,
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = LedgerError::Store("disk".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn policy_rejections_carry_failure_code() {
        let err: ApiError = LedgerError::InsufficientFunds {
            account_id: "a1".into(),
            balance: 10,
            required: 20,
        }
        .into();
        match err {
            ApiError::Rejected { code, details, .. } => {
                assert_eq!(code, "insufficient_funds");
                assert_eq!(details["failure_code"], "InsufficientFunds");
                assert_eq!(details["required"], 20);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejection_status_is_unprocessable() {
        let err: ApiError = LedgerError::AccountClosed {
            customer_id: "c1".into(),
            account_id: "a1".into(),
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
