use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::error::{ErrorKind, LedgerError};

/// Message returned for failures whose details must not reach callers.
pub const GENERIC_FAILURE_MESSAGE: &str = "Ohh, something went wrong.";

/// Caller-facing outcome of an operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Self {
            status_code: 200,
            message: "OK".into(),
            data: Some(data),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Map an error to its response envelope.
///
/// | kind | status |
/// |---|---|
/// | invalid input | 400 |
/// | unauthorized | 401 |
/// | domain (not found, duplicate, no contract, bad rate, rule violation) | 422 |
/// | anything else | 500, generic message |
pub fn prepare_error_message(err: &LedgerError) -> Response {
    error!(error = %err, kind = ?err.kind(), "operation failed");
    let (status_code, message) = match err.kind() {
        ErrorKind::InvalidInput => (400, err.to_string()),
        ErrorKind::Unauthorized => (401, err.to_string()),
        kind if kind.is_domain() => (422, err.to_string()),
        _ => (500, GENERIC_FAILURE_MESSAGE.to_string()),
    };
    Response {
        status_code,
        message,
        data: None,
    }
}
