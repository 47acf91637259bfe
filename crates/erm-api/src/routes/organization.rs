//! Organization endpoints: areas, managements, positions and users

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Router;
use erm_core::application::dto::*;
use erm_core::domain::aggregates::{Area, Management, Position, User};
use erm_core::EntityId;
use std::sync::Arc;

use super::{created, deleted, ok, ApiResult, Created};
use crate::error::ApiJson;
use crate::models::Affected;
use crate::ApiState;

pub fn areas() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_areas).post(create_area))
        .route("/:id", get(get_area).put(update_area).delete(delete_area))
}

pub fn managements() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_managements).post(create_management))
        .route(
            "/:id",
            get(get_management).put(update_management).delete(delete_management),
        )
}

pub fn positions() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_positions).post(create_position))
        .route("/:id", put(update_position).delete(delete_position))
}

pub fn users() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

// ============ Areas ============

async fn list_areas(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<Area>> {
    ok(state.services.organization.list_areas())
}

async fn get_area(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Area> {
    ok(state.services.organization.get_area(&id)?)
}

async fn create_area(State(state): State<Arc<ApiState>>, ApiJson(input): ApiJson<AreaInput>) -> Created<Area> {
    created(state.services.organization.create_area(input)?)
}

async fn update_area(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<AreaInput>,
) -> ApiResult<Area> {
    ok(state.services.organization.update_area(&id, input)?)
}

async fn delete_area(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.organization.delete_area(&id)?;
    deleted()
}

// ============ Managements ============

async fn list_managements(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<Management>> {
    ok(state.services.organization.list_managements())
}

async fn get_management(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Management> {
    ok(state.services.organization.get_management(&id)?)
}

async fn create_management(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<ManagementInput>,
) -> Created<Management> {
    created(state.services.organization.create_management(input)?)
}

async fn update_management(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<ManagementInput>,
) -> ApiResult<Management> {
    ok(state.services.organization.update_management(&id, input)?)
}

async fn delete_management(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.organization.delete_management(&id)?;
    deleted()
}

// ============ Positions ============

async fn list_positions(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<Position>> {
    ok(state.services.organization.list_positions())
}

async fn create_position(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<PositionInput>,
) -> Created<Position> {
    created(state.services.organization.create_position(input)?)
}

async fn update_position(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<PositionInput>,
) -> ApiResult<Position> {
    ok(state.services.organization.update_position(&id, input)?)
}

async fn delete_position(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.organization.delete_position(&id)?;
    deleted()
}

// ============ Users ============

async fn list_users(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<User>> {
    ok(state.services.organization.list_users())
}

async fn get_user(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<User> {
    ok(state.services.organization.get_user(&id)?)
}

async fn create_user(State(state): State<Arc<ApiState>>, ApiJson(input): ApiJson<CreateUser>) -> Created<User> {
    created(state.services.organization.create_user(input)?)
}

async fn update_user(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<UpdateUser>,
) -> ApiResult<User> {
    ok(state.services.organization.update_user(&id, input)?)
}

async fn delete_user(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Affected> {
    state.services.organization.delete_user(&id)?;
    deleted()
}
