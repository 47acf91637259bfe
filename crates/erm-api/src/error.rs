//! HTTP error mapping

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use erm_core::ServiceError;
use erm_scoring::ScoringError;
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("validation error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(ServiceError::Validation(_)) | Self::Scoring(_) => StatusCode::BAD_REQUEST,
            Self::Service(ServiceError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::PreconditionNotMet(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Conflict(_)) => StatusCode::CONFLICT,
            // Unknown or mistyped fields surface as 422 from the extractor
            Self::Body(rejection) => rejection.status(),
            Self::Query(rejection) => rejection.status(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Service(ServiceError::Validation(_)) | Self::Scoring(_) => "VALIDATION_ERROR",
            Self::Service(ServiceError::NotFound { .. }) => "NOT_FOUND",
            Self::Service(ServiceError::PreconditionNotMet(_)) => "PRECONDITION_NOT_MET",
            Self::Service(ServiceError::Conflict(_)) => "CONFLICT",
            Self::Body(_) => "INVALID_BODY",
            Self::Query(_) => "INVALID_QUERY",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(status = status.as_u16(), code = self.code(), error = %self, "Request rejected");
        (status, Json(ApiResponse::<()>::error(self.code(), &self.to_string()))).into_response()
    }
}

/// JSON body extractor whose rejections use the API envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor, same envelope on rejection
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
