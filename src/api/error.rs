//! Error → HTTP response mapping.

use super::ENDPOINTS;
use crate::features::ValidationError;
use crate::service::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(ValidationError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Endpoint not found")]
    NotFound,
    #[error("Model metadata not available")]
    MetadataUnavailable,
    #[error("Prediction failed: {0}")]
    Processing(ServiceError),
    #[error("Model not loaded: {0}")]
    ModelUnavailable(String),
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::MetadataUnavailable => StatusCode::NOT_FOUND,
            ApiError::Processing(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::InvalidInput(e),
            other => ApiError::Processing(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::NotFound => json!({
                "error": self.to_string(),
                "available_endpoints": ENDPOINTS,
            }),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
