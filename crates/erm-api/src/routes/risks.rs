//! Risk register endpoints
//!
//! Evaluation and control writes go through the lifecycle services so the
//! derived outcomes are rescored in the same transaction.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use erm_core::application::dto::*;
use erm_core::domain::aggregates::{ActionPlan, Control, ControlTarget, Evaluation, Incident, Priority};
use erm_core::EntityId;
use std::sync::Arc;

use super::{created, deleted, ok, ApiResult, Created};
use crate::error::{ApiJson, ApiQuery};
use crate::models::*;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_risks).post(create_risk))
        .route("/stats", get(risk_statistics))
        .route("/recent", get(recent_risks))
        .route("/map", get(risk_map))
        .route("/:id", get(get_risk).put(update_risk).delete(delete_risk))
        .route(
            "/:id/evaluation",
            get(get_evaluation).put(evaluate_risk).delete(delete_evaluation),
        )
        .route("/:id/causes", get(list_causes).post(create_cause))
        .route("/:id/controls", get(list_controls).post(create_risk_control))
        .route("/:id/controls/effectiveness", get(control_effectiveness))
        .route("/:id/plans", get(list_plans))
        .route("/:id/incidents", get(list_incidents))
        .route("/:id/priority", get(get_priority).put(upsert_priority))
}

/// List risks
#[utoipa::path(
    get,
    path = "/api/v1/risks",
    params(
        ("process_id" = Option<String>, Query, description = "Filter by process"),
        ("classification" = Option<String>, Query, description = "negative or positive"),
        ("level" = Option<String>, Query, description = "Inherent band"),
        ("zone" = Option<String>, Query, description = "Filter by zone"),
        ("search" = Option<String>, Query, description = "Case-insensitive match on description or code"),
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("page_size" = Option<u32>, Query, description = "Items per page, at most 100")
    ),
    responses((status = 200, description = "Paginated risk list")),
    tag = "risks"
)]
pub async fn list_risks(
    State(state): State<Arc<ApiState>>,
    ApiQuery(filter): ApiQuery<RiskFilter>,
) -> ApiResult<PaginatedResponse<RiskListItem>> {
    ok(state.services.risks.list(&filter).into())
}

/// Get a risk with its evaluation, causes, controls, priority and plans
#[utoipa::path(
    get,
    path = "/api/v1/risks/{id}",
    params(("id" = String, Path, description = "Risk ID")),
    responses(
        (status = 200, description = "Risk detail"),
        (status = 404, description = "Risk not found", body = ErrorResponse)
    ),
    tag = "risks"
)]
pub async fn get_risk(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<RiskView> {
    ok(state.services.risks.get(&id)?)
}

/// Create a risk, optionally with its evaluation, causes and controls
///
/// The nested graph is written atomically: any invalid part rejects the
/// whole request.
#[utoipa::path(
    post,
    path = "/api/v1/risks",
    responses(
        (status = 201, description = "Risk created"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Referenced entity not found", body = ErrorResponse)
    ),
    tag = "risks"
)]
pub async fn create_risk(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<CreateRisk>,
) -> Created<RiskView> {
    created(state.services.risks.create(input)?)
}

pub async fn update_risk(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<UpdateRisk>,
) -> ApiResult<RiskView> {
    ok(state.services.risks.update(&id, input)?)
}

pub async fn delete_risk(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.risks.delete(&id)?;
    deleted()
}

/// Band counts over the register
#[utoipa::path(
    get,
    path = "/api/v1/risks/stats",
    params(("process_id" = Option<String>, Query, description = "Restrict to one process")),
    responses((status = 200, description = "Risk statistics")),
    tag = "risks"
)]
pub async fn risk_statistics(
    State(state): State<Arc<ApiState>>,
    ApiQuery(scope): ApiQuery<ProcessScope>,
) -> ApiResult<RiskStatistics> {
    ok(state.services.risks.statistics(scope.process_id.as_ref()))
}

pub async fn recent_risks(
    State(state): State<Arc<ApiState>>,
    ApiQuery(params): ApiQuery<RecentParams>,
) -> ApiResult<Vec<RiskListItem>> {
    ok(state.services.risks.recent(params.limit))
}

/// Heat-map points for evaluated risks
#[utoipa::path(
    get,
    path = "/api/v1/risks/map",
    params(("process_id" = Option<String>, Query, description = "Restrict to one process")),
    responses((status = 200, description = "Inherent and residual cells per risk")),
    tag = "risks"
)]
pub async fn risk_map(
    State(state): State<Arc<ApiState>>,
    ApiQuery(scope): ApiQuery<ProcessScope>,
) -> ApiResult<Vec<MapPoint>> {
    ok(state.services.risks.map_points(scope.process_id.as_ref()))
}

// ============ Evaluation ============

pub async fn get_evaluation(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Evaluation> {
    ok(state.services.evaluations.get_by_risk(&id)?)
}

/// Evaluate or re-evaluate a risk
#[utoipa::path(
    put,
    path = "/api/v1/risks/{id}/evaluation",
    params(("id" = String, Path, description = "Risk ID")),
    responses(
        (status = 200, description = "Evaluation with inherent risk and band"),
        (status = 400, description = "Probability or impact out of range", body = ErrorResponse),
        (status = 404, description = "Risk not found", body = ErrorResponse)
    ),
    tag = "risks"
)]
pub async fn evaluate_risk(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<EvaluateRisk>,
) -> ApiResult<Evaluation> {
    ok(state.services.evaluations.evaluate(&id, input)?)
}

pub async fn delete_evaluation(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.evaluations.delete(&id)?;
    deleted()
}

// ============ Causes and controls ============

pub async fn list_causes(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Vec<CauseView>> {
    ok(state.services.causes.list_by_risk(&id)?)
}

pub async fn create_cause(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<NewCause>,
) -> Created<CauseView> {
    created(state.services.causes.create(&id, input)?)
}

pub async fn list_controls(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Vec<Control>> {
    ok(state.services.controls.list_by_risk(&id)?)
}

/// Attach a control directly to a risk
///
/// Requires the risk to be evaluated. Residual risk is recomputed on write.
#[utoipa::path(
    post,
    path = "/api/v1/risks/{id}/controls",
    params(("id" = String, Path, description = "Risk ID")),
    responses(
        (status = 201, description = "Control with effectiveness and residual risk"),
        (status = 400, description = "Factor out of range", body = ErrorResponse),
        (status = 404, description = "Risk not found or not evaluated", body = ErrorResponse)
    ),
    tag = "risks"
)]
pub async fn create_risk_control(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<NewControl>,
) -> Created<Control> {
    created(state.services.controls.create(ControlTarget::Risk(id), input)?)
}

pub async fn control_effectiveness(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
) -> ApiResult<EffectivenessSummary> {
    ok(state.services.controls.effectiveness_summary(&id)?)
}

// ============ Related ============

pub async fn list_plans(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Vec<ActionPlan>> {
    ok(state.services.plans.by_risk(&id)?)
}

pub async fn list_incidents(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Vec<Incident>> {
    ok(state.services.incidents.by_risk(&id)?)
}

pub async fn get_priority(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Priority> {
    ok(state.services.priorities.get(&id)?)
}

pub async fn upsert_priority(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<UpsertPriority>,
) -> ApiResult<Priority> {
    ok(state.services.priorities.upsert(&id, input)?)
}
