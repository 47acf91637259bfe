//! Health check endpoint

use axum::extract::State;
use axum::{response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::ApiState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    /// Version of the scoring configuration in force
    pub scoring_version: u64,
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".into(),
        version: state.version.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        scoring_version: state.services.settings().version(),
    })
}
