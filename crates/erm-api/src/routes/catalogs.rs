//! Reference catalogs and scoring configuration

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::Router;
use erm_core::application::dto::*;
use erm_core::domain::aggregates::*;
use erm_core::EntityId;
use erm_scoring::ScoringConfig;
use std::sync::Arc;

use super::{created, deleted, ok, ApiResult, Created};
use crate::error::ApiJson;
use crate::models::{Affected, ErrorResponse};
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/impacts", get(list_impact_types).post(create_impact_type))
        .route(
            "/impacts/:id",
            get(get_impact_type).put(update_impact_type).delete(delete_impact_type),
        )
        .route("/impacts/:id/levels", put(replace_impact_levels))
        .route("/frequencies", get(list_frequencies).put(replace_frequencies))
        .route("/sources", get(list_sources).put(replace_sources))
        .route("/origins", get(list_origins).put(replace_origins))
        .route("/consequences", get(list_consequences).put(replace_consequences))
        .route("/risk-types", get(list_risk_types).post(create_risk_type))
        .route("/risk-types/:id", put(update_risk_type).delete(delete_risk_type))
        .route("/risk-types/:id/subtypes", post(add_subtype))
        .route("/risk-types/:id/subtypes/:subtype_id", delete(delete_subtype))
        .route("/objectives", get(list_objectives).post(create_objective))
        .route("/objectives/:id", put(update_objective).delete(delete_objective))
        .route("/map-config", get(get_map_config).put(set_map_config))
        .route("/map-axes", get(get_map_axes))
        .route("/process-kinds", get(list_process_kinds))
        .route("/risk-levels", get(list_risk_levels))
        .route("/scoring", get(get_scoring_config).put(replace_scoring_config))
}

// ============ Impact types ============

async fn list_impact_types(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<ImpactType>> {
    ok(state.services.catalogs.impact_types())
}

async fn get_impact_type(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<ImpactType> {
    ok(state.services.catalogs.impact_type(&id)?)
}

async fn create_impact_type(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<ImpactTypeInput>,
) -> Created<ImpactType> {
    created(state.services.catalogs.create_impact_type(input)?)
}

async fn update_impact_type(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<ImpactTypeInput>,
) -> ApiResult<ImpactType> {
    ok(state.services.catalogs.update_impact_type(&id, input)?)
}

async fn replace_impact_levels(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(levels): ApiJson<Vec<ImpactLevel>>,
) -> ApiResult<ImpactType> {
    ok(state.services.catalogs.replace_impact_levels(&id, levels)?)
}

async fn delete_impact_type(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.catalogs.delete_impact_type(&id)?;
    deleted()
}

// ============ Flat catalogs ============

async fn list_frequencies(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<Frequency>> {
    ok(state.services.catalogs.frequencies())
}

async fn replace_frequencies(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<Vec<Frequency>>,
) -> ApiResult<Vec<Frequency>> {
    ok(state.services.catalogs.replace_frequencies(input)?)
}

async fn list_sources(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<CatalogEntry>> {
    ok(state.services.catalogs.sources())
}

async fn replace_sources(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<Vec<NamedInput>>,
) -> ApiResult<Vec<CatalogEntry>> {
    ok(state.services.catalogs.replace_sources(input)?)
}

async fn list_origins(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<CatalogEntry>> {
    ok(state.services.catalogs.origins())
}

async fn replace_origins(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<Vec<NamedInput>>,
) -> ApiResult<Vec<CatalogEntry>> {
    ok(state.services.catalogs.replace_origins(input)?)
}

async fn list_consequences(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<CatalogEntry>> {
    ok(state.services.catalogs.consequences())
}

async fn replace_consequences(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<Vec<NamedInput>>,
) -> ApiResult<Vec<CatalogEntry>> {
    ok(state.services.catalogs.replace_consequences(input)?)
}

// ============ Risk types ============

async fn list_risk_types(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<RiskType>> {
    ok(state.services.catalogs.risk_types())
}

async fn create_risk_type(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<NamedInput>,
) -> Created<RiskType> {
    created(state.services.catalogs.create_risk_type(input)?)
}

async fn update_risk_type(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<NamedInput>,
) -> ApiResult<RiskType> {
    ok(state.services.catalogs.update_risk_type(&id, input)?)
}

async fn delete_risk_type(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.catalogs.delete_risk_type(&id)?;
    deleted()
}

async fn add_subtype(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<NamedInput>,
) -> Created<RiskSubtype> {
    created(state.services.catalogs.add_subtype(&id, input)?)
}

async fn delete_subtype(
    State(state): State<Arc<ApiState>>,
    Path((id, subtype_id)): Path<(EntityId, EntityId)>,
) -> ApiResult<Affected> {
    state.services.catalogs.delete_subtype(&id, &subtype_id)?;
    deleted()
}

// ============ Objectives ============

async fn list_objectives(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<Objective>> {
    ok(state.services.catalogs.objectives())
}

async fn create_objective(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<ObjectiveInput>,
) -> Created<Objective> {
    created(state.services.catalogs.create_objective(input)?)
}

async fn update_objective(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<ObjectiveInput>,
) -> ApiResult<Objective> {
    ok(state.services.catalogs.update_objective(&id, input)?)
}

async fn delete_objective(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.catalogs.delete_objective(&id)?;
    deleted()
}

// ============ Map ============

async fn get_map_config(State(state): State<Arc<ApiState>>) -> ApiResult<MapConfig> {
    ok(state.services.catalogs.map_config())
}

async fn set_map_config(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<MapConfigUpdate>,
) -> ApiResult<MapConfig> {
    ok(state.services.catalogs.set_map_config(input)?)
}

async fn get_map_axes(State(state): State<Arc<ApiState>>) -> ApiResult<MapAxes> {
    ok(state.services.catalogs.map_axes())
}

async fn list_process_kinds(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<ProcessKindInfo>> {
    ok(state.services.catalogs.process_kinds())
}

async fn list_risk_levels(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<RiskLevelInfo>> {
    ok(state.services.catalogs.risk_levels())
}

// ============ Scoring configuration ============

/// Scoring configuration in force
#[utoipa::path(
    get,
    path = "/api/v1/catalogs/scoring",
    responses((status = 200, description = "Versioned scoring configuration")),
    tag = "catalogs"
)]
pub async fn get_scoring_config(State(state): State<Arc<ApiState>>) -> ApiResult<ScoringConfigView> {
    ok(state.services.catalogs.scoring_config())
}

/// Replace the scoring configuration
///
/// Every stored evaluation is rescored under the new tables before the
/// swap. The previous configuration stays in force on failure.
#[utoipa::path(
    put,
    path = "/api/v1/catalogs/scoring",
    responses(
        (status = 200, description = "New configuration and its version"),
        (status = 400, description = "Invalid configuration", body = ErrorResponse)
    ),
    tag = "catalogs"
)]
pub async fn replace_scoring_config(
    State(state): State<Arc<ApiState>>,
    ApiJson(config): ApiJson<ScoringConfig>,
) -> ApiResult<ScoringConfigView> {
    ok(state.services.catalogs.replace_scoring_config(config)?)
}
