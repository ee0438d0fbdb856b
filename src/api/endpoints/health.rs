//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub extractor: &'static str,
    pub model: String,
    pub uptime_secs: i64,
}

/// `GET /api/health`: liveness plus the active pipeline configuration.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        extractor: ctx.orchestrator.extractor_name(),
        model: ctx.orchestrator.model().to_string(),
        uptime_secs: (chrono::Utc::now() - ctx.started_at).num_seconds(),
    })
}
