//! HTTP request handlers.

pub mod health;
pub mod sensors;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::validation::ValidationError;

/// Error body returned for rejected requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Rejection that renders as a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub ValidationError);

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
        let body = ErrorResponse {
            success: false,
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
