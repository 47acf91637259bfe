//! Utilities: observations, process history, tasks and notifications

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Router;
use erm_core::application::dto::{NewObservation, NewTask, ObservationView, UpdateTaskStatus};
use erm_core::domain::aggregates::{Notification, ProcessChange, Task};
use erm_core::EntityId;
use serde::Deserialize;
use std::sync::Arc;

use super::{created, ok, ApiResult, Created};
use crate::error::{ApiJson, ApiQuery};
use crate::models::ProcessScope;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/observations", get(list_observations).post(create_observation))
        .route("/history", get(process_history))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id/status", put(set_task_status))
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id/read", put(mark_notification_read))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserScope {
    user_id: Option<EntityId>,
    #[serde(default)]
    unread: bool,
}

async fn list_observations(
    State(state): State<Arc<ApiState>>,
    ApiQuery(scope): ApiQuery<ProcessScope>,
) -> ApiResult<Vec<ObservationView>> {
    ok(state.services.utilities.observations(scope.process_id.as_ref()))
}

async fn create_observation(
    State(state): State<Arc<ApiState>>,
    ApiJson(input): ApiJson<NewObservation>,
) -> Created<ObservationView> {
    created(state.services.utilities.add_observation(input)?)
}

/// Newest first; includes rows of deleted processes
#[utoipa::path(
    get,
    path = "/api/v1/utilities/history",
    params(("process_id" = Option<String>, Query, description = "Only this process")),
    responses((status = 200, description = "Process change history")),
    tag = "utilities"
)]
pub async fn process_history(
    State(state): State<Arc<ApiState>>,
    ApiQuery(scope): ApiQuery<ProcessScope>,
) -> ApiResult<Vec<ProcessChange>> {
    ok(state.services.utilities.history(scope.process_id.as_ref()))
}

async fn list_tasks(State(state): State<Arc<ApiState>>, ApiQuery(scope): ApiQuery<UserScope>) -> ApiResult<Vec<Task>> {
    ok(state.services.utilities.tasks(scope.user_id.as_ref()))
}

async fn create_task(State(state): State<Arc<ApiState>>, ApiJson(input): ApiJson<NewTask>) -> Created<Task> {
    created(state.services.utilities.create_task(input)?)
}

async fn set_task_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
    ApiJson(input): ApiJson<UpdateTaskStatus>,
) -> ApiResult<Task> {
    ok(state.services.utilities.set_task_status(&id, input.status)?)
}

async fn list_notifications(
    State(state): State<Arc<ApiState>>,
    ApiQuery(scope): ApiQuery<UserScope>,
) -> ApiResult<Vec<Notification>> {
    ok(state.services.utilities.notifications(scope.user_id.as_ref(), scope.unread))
}

async fn mark_notification_read(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<EntityId>,
) -> ApiResult<Notification> {
    ok(state.services.utilities.mark_read(&id)?)
}
