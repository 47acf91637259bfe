//! Process endpoints

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::Router;
use erm_core::application::dto::*;
use erm_core::domain::aggregates::*;
use erm_core::EntityId;
use serde::Deserialize;
use std::sync::Arc;

use super::{created, deleted, ok, ApiResult, Created};
use crate::error::{ApiJson, ApiQuery};
use crate::models::Affected;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_processes).post(create_process))
        .route("/bulk", post(bulk_update))
        .route("/:id", get(get_process).put(update_process).delete(delete_process))
        .route("/:id/duplicate", post(duplicate_process))
        .route("/:id/dofa", get(get_dofa).post(add_dofa))
        .route("/:id/dofa/:item_id", delete(delete_dofa))
        .route("/:id/regulations", get(list_regulations).post(add_regulation))
        .route("/:id/regulations/:item_id", delete(delete_regulation))
        .route("/:id/context", get(get_context).post(add_context))
        .route("/:id/context/:item_id", delete(delete_context))
        .route("/:id/benchmarking", get(list_benchmarking).put(replace_benchmarking))
        .route("/:id/benchmarking/:item_id", delete(delete_benchmark))
        .route("/:id/owners", get(list_owners).post(add_owner))
        .route("/:id/owners/:user_id", delete(remove_owner))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    kind: Option<ProcessKind>,
    active: Option<bool>,
}

/// List processes
#[utoipa::path(
    get,
    path = "/api/v1/processes",
    params(
        ("kind" = Option<String>, Query, description = "Filter by process kind"),
        ("active" = Option<bool>, Query, description = "Filter by active flag")
    ),
    responses((status = 200, description = "Processes sorted by name")),
    tag = "processes"
)]
pub async fn list_processes(
    State(state): State<Arc<ApiState>>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Vec<Process>> {
    ok(state.services.processes.list(params.kind, params.active))
}

/// Get a process with its analysis
#[utoipa::path(
    get,
    path = "/api/v1/processes/{id}",
    params(("id" = String, Path, description = "Process ID")),
    responses(
        (status = 200, description = "Process with DOFA, regulations, context, benchmarking and owners"),
        (status = 404, description = "Process not found", body = crate::models::ErrorResponse)
    ),
    tag = "processes"
)]
pub async fn get_process(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<ProcessView> {
    ok(state.services.processes.get(&id)?)
}

pub async fn create_process(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<CreateProcess>,
) -> Created<Process> {
    created(state.services.processes.create(input)?)
}

pub async fn update_process(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<UpdateProcess>,
) -> ApiResult<Process> {
    ok(state.services.processes.update(&id, input)?)
}

pub async fn delete_process(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.processes.delete(&id)?;
    deleted()
}

pub async fn bulk_update(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<BulkUpdateProcesses>,
) -> ApiResult<Affected> {
    let affected = state.services.processes.bulk_update(input)?;
    ok(Affected { affected })
}

pub async fn duplicate_process(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
) -> Created<ProcessView> {
    created(state.services.processes.duplicate(&id)?)
}

// ============ DOFA ============

pub async fn get_dofa(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<DofaMatrix> {
    ok(state.services.processes.dofa(&id)?)
}

pub async fn add_dofa(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<NewDofaItem>,
) -> Created<DofaItem> {
    created(state.services.processes.add_dofa(&id, input)?)
}

pub async fn delete_dofa(
    State(state): State<Arc<ApiState>>,
    Path((_, item_id)): Path<(EntityId, EntityId)>,
) -> ApiResult<Affected> {
    state.services.processes.delete_dofa(&item_id)?;
    deleted()
}

// ============ Regulations ============

pub async fn list_regulations(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
) -> ApiResult<Vec<Regulation>> {
    ok(state.services.processes.regulations(&id)?)
}

pub async fn add_regulation(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<NewRegulation>,
) -> Created<Regulation> {
    created(state.services.processes.add_regulation(&id, input)?)
}

pub async fn delete_regulation(
    State(state): State<Arc<ApiState>>,
    Path((_, item_id)): Path<(EntityId, EntityId)>,
) -> ApiResult<Affected> {
    state.services.processes.delete_regulation(&item_id)?;
    deleted()
}

// ============ Context ============

pub async fn get_context(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<ContextGroups> {
    ok(state.services.processes.context(&id)?)
}

pub async fn add_context(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<NewContextItem>,
) -> Created<ContextItem> {
    created(state.services.processes.add_context(&id, input)?)
}

pub async fn delete_context(
    State(state): State<Arc<ApiState>>,
    Path((_, item_id)): Path<(EntityId, EntityId)>,
) -> ApiResult<Affected> {
    state.services.processes.delete_context(&item_id)?;
    deleted()
}

// ============ Benchmarking ============

pub async fn list_benchmarking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
) -> ApiResult<Vec<BenchmarkEntry>> {
    ok(state.services.processes.benchmarking(&id)?)
}

pub async fn replace_benchmarking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<Vec<NewBenchmark>>,
) -> ApiResult<Vec<BenchmarkEntry>> {
    ok(state.services.processes.replace_benchmarking(&id, input)?)
}

pub async fn delete_benchmark(
    State(state): State<Arc<ApiState>>,
    Path((_, item_id)): Path<(EntityId, EntityId)>,
) -> ApiResult<Affected> {
    state.services.processes.delete_benchmark(&item_id)?;
    deleted()
}

// ============ Owners ============

pub async fn list_owners(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Vec<User>> {
    ok(state.services.processes.owners(&id)?)
}

pub async fn add_owner(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<AssignOwner>,
) -> Created<ProcessOwner> {
    created(state.services.processes.add_owner(&id, input)?)
}

pub async fn remove_owner(
    State(state): State<Arc<ApiState>>,
    Path((id, user_id)): Path<(EntityId, EntityId)>,
) -> ApiResult<Affected> {
    state.services.processes.remove_owner(&id, &user_id)?;
    deleted()
}
