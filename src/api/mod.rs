//! HTTP surface: routing, shared state, error mapping.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{BatchResponse, PredictResponse};

use crate::service::ServiceContext;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const ENDPOINTS: [&str; 4] = ["/health", "/model-info", "/predict", "/batch-predict"];

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    model: ModelState,
}

#[derive(Clone)]
enum ModelState {
    Ready(Arc<ServiceContext>),
    /// Startup load failed; every scoring request answers 503.
    Unavailable(Arc<str>),
}

impl AppState {
    pub fn ready(ctx: ServiceContext) -> Self {
        Self {
            model: ModelState::Ready(Arc::new(ctx)),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            model: ModelState::Unavailable(Arc::from(reason.into())),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.model, ModelState::Ready(_))
    }

    fn context(&self) -> Result<Arc<ServiceContext>, ApiError> {
        match &self.model {
            ModelState::Ready(ctx) => Ok(Arc::clone(ctx)),
            ModelState::Unavailable(reason) => Err(ApiError::ModelUnavailable(reason.to_string())),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/model-info", get(handlers::model_info))
        .route("/predict", post(handlers::predict))
        .route("/batch-predict", post(handlers::batch_predict))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
