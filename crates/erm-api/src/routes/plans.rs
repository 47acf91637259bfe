//! Action plan endpoints

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use chrono::{NaiveDate, Utc};
use erm_core::application::dto::{CreatePlan, PlanStatistics, UpdatePlan};
use erm_core::domain::aggregates::{ActionPlan, PlanStatus};
use erm_core::EntityId;
use serde::Deserialize;
use std::sync::Arc;

use super::{created, deleted, ok, ApiResult, Created};
use crate::error::{ApiJson, ApiQuery};
use crate::models::Affected;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/overdue", get(overdue_plans))
        .route("/stats", get(plan_statistics))
        .route("/:id", get(get_plan).put(update_plan).delete(delete_plan))
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    status: Option<PlanStatus>,
}

/// Reference date for overdue checks, today when absent
#[derive(Debug, Deserialize)]
pub struct AsOf {
    today: Option<NaiveDate>,
}

impl AsOf {
    fn date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

async fn list_plans(
    State(state): State<Arc<ApiState>>,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> ApiResult<Vec<ActionPlan>> {
    ok(state.services.plans.list(filter.status))
}

async fn get_plan(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<ActionPlan> {
    ok(state.services.plans.get(&id)?)
}

async fn create_plan(State(state): State<Arc<ApiState>>, ApiJson(input): ApiJson<CreatePlan>) -> Created<ActionPlan> {
    created(state.services.plans.create(input)?)
}

async fn update_plan(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<UpdatePlan>,
) -> ApiResult<ActionPlan> {
    ok(state.services.plans.update(&id, input)?)
}

async fn delete_plan(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.plans.delete(&id)?;
    deleted()
}

/// Plans past their scheduled date and not completed
#[utoipa::path(
    get,
    path = "/api/v1/plans/overdue",
    params(("today" = Option<String>, Query, description = "Reference date (YYYY-MM-DD), defaults to today")),
    responses((status = 200, description = "Overdue plans, earliest scheduled first")),
    tag = "plans"
)]
pub async fn overdue_plans(
    State(state): State<Arc<ApiState>>,
    ApiQuery(as_of): ApiQuery<AsOf>,
) -> ApiResult<Vec<ActionPlan>> {
    ok(state.services.plans.overdue(as_of.date()))
}

async fn plan_statistics(
    State(state): State<Arc<ApiState>>,
    ApiQuery(as_of): ApiQuery<AsOf>,
) -> ApiResult<PlanStatistics> {
    ok(state.services.plans.statistics(as_of.date()))
}
