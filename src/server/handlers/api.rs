//! API endpoint handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::super::AppState;
use crate::error::HarvestError;
use crate::models::SearchRequest;

/// Operational status string.
pub async fn health() -> impl IntoResponse {
    "jobharvest is running. Query /jobs?keyword=...&location=... for listings."
}

/// Search job listings. Absent parameters come from the configured defaults.
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchRequest>,
) -> Response {
    let spec = params.or(&state.defaults).to_spec();

    match state.harvester.search(&spec).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            tracing::error!("Search failed for {:?}: {}", spec.keyword(), e);
            error_response(&e)
        }
    }
}

/// 500 with a JSON `{"error": message}` body.
fn error_response(error: &HarvestError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}
