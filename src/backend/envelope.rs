//! Translation of raw backend responses into local outcomes.
//!
//! The backend wraps every payload in `{code, message, data}`. An operation
//! succeeds only when the HTTP status equals the status the operation expects
//! and the envelope carries `code == 0`.

use axum::{body::Bytes, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProxyError;

/// Artifact operations and their expectations towards the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn expected_status(self) -> StatusCode {
        match self {
            Operation::Create => StatusCode::CREATED,
            Operation::Read | Operation::Update | Operation::Delete => StatusCode::OK,
        }
    }

    pub fn default_error(self) -> &'static str {
        match self {
            Operation::Read => "Failed to get artifact",
            Operation::Create => "Failed to upload artifact",
            Operation::Update => "Failed to update artifact meta",
            Operation::Delete => "Failed to delete artifact",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend response as received off the wire.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

#[derive(Debug, Deserialize)]
pub struct BackendEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Map a backend response onto the payload handed back to the caller.
pub fn normalize(op: Operation, raw: RawResponse) -> Result<Value, ProxyError> {
    if raw.status != op.expected_status() {
        let body: ErrorBody = serde_json::from_slice(&raw.body).map_err(|e| {
            ProxyError::Internal(format!(
                "{} failed with status {} and unparsable body: {}",
                op, raw.status, e
            ))
        })?;

        return Err(ProxyError::BackendStatus {
            status: raw.status,
            message: message_or_default(body.message, op),
        });
    }

    let envelope: BackendEnvelope = serde_json::from_slice(&raw.body).map_err(|e| {
        ProxyError::Internal(format!("{} returned a malformed envelope: {}", op, e))
    })?;

    if envelope.code != 0 {
        return Err(ProxyError::BackendLogic {
            code: envelope.code,
            message: message_or_default(envelope.message, op),
        });
    }

    if op == Operation::Delete {
        return Ok(empty_object());
    }

    Ok(match envelope.data {
        None | Some(Value::Null) => empty_object(),
        Some(data) => data,
    })
}

fn message_or_default(message: Option<String>, op: Operation) -> String {
    message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| op.default_error().to_string())
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}
