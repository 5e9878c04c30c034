use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::ApiResponse;

/// Message returned to callers for every failure whose details stay server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Missing, empty or malformed local input. Raised before any backend call.
    #[error("{0}")]
    Validation(String),

    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}: {message}")]
    BackendStatus { status: StatusCode, message: String },

    #[error("backend returned code {code}: {message}")]
    BackendLogic { code: i64, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::BackendStatus { .. } | ProxyError::BackendLogic { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ProxyError::Transport(_) | ProxyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message a caller is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            ProxyError::Validation(message)
            | ProxyError::BackendStatus { message, .. }
            | ProxyError::BackendLogic { message, .. } => message.clone(),
            ProxyError::Transport(_) | ProxyError::Internal(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::Validation(message) => {
                tracing::debug!(%message, "rejected invalid request");
            }
            ProxyError::BackendStatus { status, message } => {
                tracing::warn!(status = status.as_u16(), %message, "backend rejected request");
            }
            ProxyError::BackendLogic { code, message } => {
                tracing::warn!(code, %message, "backend reported failure");
            }
            ProxyError::Transport(e) => {
                tracing::error!(error = %e, "backend transport failure");
            }
            ProxyError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
            }
        }

        let status = self.status_code();
        (status, ApiResponse::<()>::failure(self.public_message())).into_response()
    }
}
