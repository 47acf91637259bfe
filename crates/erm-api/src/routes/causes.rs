//! Cause endpoints

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use erm_core::application::dto::{CauseView, NewControl, UpdateCause};
use erm_core::domain::aggregates::{Control, ControlTarget};
use erm_core::EntityId;
use std::sync::Arc;

use super::{created, deleted, ok, ApiResult, Created};
use crate::error::ApiJson;
use crate::models::Affected;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/:id", get(get_cause).put(update_cause).delete(delete_cause))
        .route("/:id/controls", get(list_controls).post(create_control))
}

async fn get_cause(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<CauseView> {
    ok(state.services.causes.get(&id)?)
}

async fn update_cause(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<UpdateCause>,
) -> ApiResult<CauseView> {
    ok(state.services.causes.update(&id, input)?)
}

async fn delete_cause(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.causes.delete(&id)?;
    deleted()
}

async fn list_controls(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Vec<Control>> {
    ok(state.services.controls.list_by_cause(&id)?)
}

async fn create_control(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<NewControl>,
) -> Created<Control> {
    created(state.services.controls.create(ControlTarget::Cause(id), input)?)
}
