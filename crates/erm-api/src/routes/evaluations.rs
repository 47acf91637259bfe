//! Evaluation endpoints

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use erm_core::domain::aggregates::Evaluation;
use erm_core::EntityId;
use std::sync::Arc;

use super::{ok, ApiResult};
use crate::models::Affected;
use crate::ApiState;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/", get(list_evaluations))
        .route("/recalculate", post(recalculate))
        .route("/:id", get(get_evaluation))
}

async fn list_evaluations(State(state): State<Arc<ApiState>>) -> ApiResult<Vec<Evaluation>> {
    ok(state.services.evaluations.list())
}

async fn get_evaluation(State(state): State<Arc<ApiState>>, Path(id): Path<EntityId>) -> ApiResult<Evaluation> {
    ok(state.services.evaluations.get(&id)?)
}

/// Rescore every evaluated risk under the configuration in force
async fn recalculate(State(state): State<Arc<ApiState>>) -> ApiResult<Affected> {
    let affected = state.services.evaluations.recalculate_all()?;
    ok(Affected { affected })
}
