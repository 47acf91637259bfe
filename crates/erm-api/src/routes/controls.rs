//! Control endpoints

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use erm_core::application::dto::UpdateControl;
use erm_core::domain::aggregates::Control;
use erm_core::EntityId;
use std::sync::Arc;

use super::{deleted, ok, ApiResult};
use crate::error::ApiJson;
use crate::models::Affected;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/:id", get(get_control).put(update_control).delete(delete_control))
}

async fn get_control(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Control> {
    ok(state.services.controls.get(&id)?)
}

async fn update_control(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<UpdateControl>,
) -> ApiResult<Control> {
    ok(state.services.controls.update(&id, input)?)
}

async fn delete_control(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.controls.delete(&id)?;
    deleted()
}
