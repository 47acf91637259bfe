//! Incident endpoints

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use erm_core::application::dto::{CreateIncident, IncidentStatistics, UpdateIncident};
use erm_core::domain::aggregates::{ActionPlan, Incident, IncidentStatus};
use erm_core::EntityId;
use serde::Deserialize;
use std::sync::Arc;

use super::{created, deleted, ok, ApiResult, Created};
use crate::error::{ApiJson, ApiQuery};
use crate::models::{Affected, ErrorResponse};
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_incidents).post(create_incident))
        .route("/period", get(incidents_by_period))
        .route("/stats", get(incident_statistics))
        .route("/:id", get(get_incident).put(update_incident).delete(delete_incident))
        .route("/:id/plans", get(list_plans))
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    status: Option<IncidentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct Period {
    from: NaiveDate,
    to: NaiveDate,
}

async fn list_incidents(
    State(state): State<Arc<ApiState>>,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> ApiResult<Vec<Incident>> {
    ok(state.services.incidents.list(filter.status))
}

async fn get_incident(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Incident> {
    ok(state.services.incidents.get(&id)?)
}

async fn create_incident(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<CreateIncident>,
) -> Created<Incident> {
    created(state.services.incidents.create(input)?)
}

async fn update_incident(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<UpdateIncident>,
) -> ApiResult<Incident> {
    ok(state.services.incidents.update(&id, input)?)
}

async fn delete_incident(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.incidents.delete(&id)?;
    deleted()
}

/// Incidents that occurred within a date range
#[utoipa::path(
    get,
    path = "/api/v1/incidents/period",
    params(
        ("from" = String, Query, description = "First day, inclusive (YYYY-MM-DD)"),
        ("to" = String, Query, description = "Last day, inclusive (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Incidents in range"),
        (status = 400, description = "Range is inverted", body = ErrorResponse)
    ),
    tag = "incidents"
)]
pub async fn incidents_by_period(
    State(state): State<Arc<ApiState>>,
    ApiQuery(period): ApiQuery<Period>,
) -> ApiResult<Vec<Incident>> {
    ok(state.services.incidents.by_period(period.from, period.to)?)
}

async fn incident_statistics(State(state): State<Arc<ApiState>>) -> ApiResult<IncidentStatistics> {
    ok(state.services.incidents.statistics())
}

async fn list_plans(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Vec<ActionPlan>> {
    ok(state.services.plans.by_incident(&id)?)
}
