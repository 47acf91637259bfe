//! Priority endpoints

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use erm_core::domain::aggregates::Priority;
use std::sync::Arc;

use super::{ok, ApiResult};
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/", get(list_priorities))
}

/// Priorities, highest final rating first
async fn list_priorities(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<Priority>> {
    ok(state.services.priorities.list())
}
