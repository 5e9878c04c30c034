//! HTTP proxy for the disk artifact API.
//!
//! Every route validates its input, forwards exactly one request to the
//! backend with a bearer token, and turns the backend's `{code, message, data}`
//! envelope into `{success, data}` or `{success, error}`.

use std::any::Any;
use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

pub mod artifacts;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;

#[cfg(test)]
mod testing;

use backend::BackendClient;
use config::{BackendConfig, ProxyConfig};
use error::ProxyError;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
}

impl AppState {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            backend: Arc::new(BackendClient::new(config)),
        }
    }
}

/// Build the full application router.
pub fn app(config: &ProxyConfig) -> Router {
    let state = AppState::new(&config.backend);

    Router::new()
        .route("/health", get(health))
        .nest("/api/disk", artifacts::routes(config.max_upload_bytes))
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ProxyError::Internal(format!("handler panicked: {}", detail)).into_response()
}
