use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clir::SearchOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of soft failures (provider outages, dropped auxiliary records)
/// absorbed while answering.
pub const WARNINGS_HEADER: &str = "x-clir-warnings";

/// Body of `POST /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lang: Option<String>,
}

/// Rank the corpus against the query and return up to `k` results, best first.
pub async fn search(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ServerResult<Response> {
    let Json(request) = payload.map_err(ServerError::from)?;

    let options = SearchOptions {
        top_k: request.top_k,
        target_lang: request.target_lang,
    };
    let outcome = state.pipeline.search(&request.query, options).await?;

    if !outcome.warnings.is_empty() {
        tracing::debug!(warnings = ?outcome.warnings, "search answered with degraded providers");
    }

    let warnings = outcome.warnings.len();
    let mut response = Json(outcome.results).into_response();
    response
        .headers_mut()
        .insert(WARNINGS_HEADER, HeaderValue::from(warnings));
    Ok(response)
}
