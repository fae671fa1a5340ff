//! API route handlers
//!
//! - `health`: liveness, readiness and Prometheus metrics
//! - `search`: the cross-lingual search endpoint

pub mod health;
pub mod search;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /)
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "CLIR Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "POST /api/search",
            "GET /health",
            "GET /ready",
            "GET /metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
