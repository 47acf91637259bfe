//! Stateless scoring endpoints
//!
//! Expose the engine under the configuration currently in force without
//! touching the register.

use axum::extract::State;
use axum::routing::post;
use axum::Router;
use erm_scoring::{classify as classify_score, map_to_grid_with_tolerance, ControlAssessment};
use std::sync::Arc;

use super::{ok, ApiResult};
use crate::error::ApiJson;
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/classify", post(classify))
        .route("/grid", post(grid))
        .route("/effectiveness", post(effectiveness))
}

/// Classify a score into a risk band
#[utoipa::path(
    post,
    path = "/api/v1/scoring/classify",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Band and label", body = ClassifyResponse),
        (status = 422, description = "Malformed request", body = ErrorResponse)
    ),
    tag = "scoring"
)]
pub async fn classify(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<ClassifyRequest>,
) -> ApiResult<ClassifyResponse> {
    let config = state.services.settings().current();
    let score = if input.raw { input.scale.from_raw(input.score) } else { input.score };
    let band = classify_score(score, input.scale, &config.bands);
    ok(ClassifyResponse {
        score,
        band,
        label: config.bands.table(input.scale).label(band).to_string(),
    })
}

/// Map a score to its heat-map cell
#[utoipa::path(
    post,
    path = "/api/v1/scoring/grid",
    request_body = GridRequest,
    responses(
        (status = 200, description = "Grid cell", body = GridResponse),
        (status = 400, description = "Tolerance out of range", body = ErrorResponse)
    ),
    tag = "scoring"
)]
pub async fn grid(State(state): State<Arc<ApiState>>, ApiJson(input): ApiJson<GridRequest>) -> ApiResult<GridResponse> {
    let tolerance = match input.tolerance {
        Some(t) if !(t > 0.0 && t < 0.5) => {
            return Err(erm_core::ServiceError::validation("tolerance must be in (0, 0.5)").into());
        }
        Some(t) => t,
        None => state.services.settings().current().grid_tolerance,
    };
    let cell = map_to_grid_with_tolerance(input.score, tolerance);
    ok(GridResponse { probability: cell.probability, impact: cell.impact, value: cell.value() })
}

/// Score a control assessment
///
/// Body: `{"mode": "three_factor" | "six_factor", "factors": {...}}`
#[utoipa::path(
    post,
    path = "/api/v1/scoring/effectiveness",
    responses(
        (status = 200, description = "Score and effectiveness", body = EffectivenessResponse),
        (status = 400, description = "Factor out of range", body = ErrorResponse)
    ),
    tag = "scoring"
)]
pub async fn effectiveness(
    State(state): State<Arc<ApiState>>,
    ApiJson(assessment): ApiJson<ControlAssessment>,
) -> ApiResult<EffectivenessResponse> {
    let profile = state.services.settings().profile();
    let score = assessment.score(profile.scorer())?;
    ok(EffectivenessResponse { score: score.score, effectiveness: score.effectiveness })
}
