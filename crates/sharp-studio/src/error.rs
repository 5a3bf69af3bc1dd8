//! JSON error responses for the studio API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sharp_core::WorkflowError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

/// Errors the studio API reports to the page.
#[derive(Debug)]
pub enum ApiError {
    /// 422 - input rejected before any network call
    Invalid(String),
    /// 409 - a call is in flight, or there is nothing to deploy
    Conflict(String),
    /// 404
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Invalid(m) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid", m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m),
        };
        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Validation(v) => ApiError::Invalid(v.to_string()),
            WorkflowError::Busy | WorkflowError::NoDocument => ApiError::Conflict(e.to_string()),
        }
    }
}

impl From<sharp_core::ValidationError> for ApiError {
    fn from(e: sharp_core::ValidationError) -> Self {
        ApiError::Invalid(e.to_string())
    }
}
