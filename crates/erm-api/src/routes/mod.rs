//! API Routes

pub mod catalogs;
pub mod causes;
pub mod controls;
pub mod evaluations;
pub mod health;
pub mod incidents;
pub mod organization;
pub mod plans;
pub mod priorities;
pub mod processes;
pub mod risks;
pub mod scoring;
pub mod utilities;

use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiError;
use crate::models::{Affected, ApiResponse};

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
pub type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub(crate) fn created<T>(data: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

pub(crate) fn deleted() -> ApiResult<Affected> {
    ok(Affected { affected: 1 })
}
