//! Route handlers. Pipeline work runs on the blocking pool; every scoring
//! request gets a uuid for log correlation.

use super::{ApiError, AppState, ModelState};
use crate::service::{round_to, BatchOutcome, Prediction, ServiceError};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub timestamp: String,
    pub latency_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchOutcome>,
    pub total_samples: usize,
    pub timestamp: String,
}

pub async fn health(State(state): State<AppState>) -> Response {
    match &state.model {
        ModelState::Ready(ctx) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "model_version": ctx.model_version().unwrap_or("unknown"),
                "schema_size": ctx.schema().len(),
                "timestamp": Utc::now().to_rfc3339(),
            })),
        )
            .into_response(),
        ModelState::Unavailable(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "message": format!("Model not loaded: {reason}"),
            })),
        )
            .into_response(),
    }
}

pub async fn model_info(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let ctx = state.context()?;
    ctx.metadata()
        .cloned()
        .map(Json)
        .ok_or(ApiError::MetadataUnavailable)
}

pub async fn predict(State(state): State<AppState>, body: Bytes) -> Result<Json<PredictResponse>, ApiError> {
    let started = Instant::now();
    let ctx = state.context()?;
    let sample = parse_json(&body).ok_or_else(|| ApiError::BadRequest("No JSON data provided".to_string()))?;
    let request_id = Uuid::new_v4();

    let outcome = tokio::task::spawn_blocking(move || ctx.predict(&sample))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let prediction = match outcome {
        Ok(p) => p,
        Err(ServiceError::Validation(e)) => {
            warn!(%request_id, error = %e, "sample rejected");
            return Err(ApiError::InvalidInput(e));
        }
        Err(e) => {
            error!(%request_id, error = %e, "prediction failed");
            return Err(e.into());
        }
    };

    let latency_ms = round_to(started.elapsed().as_secs_f64() * 1000.0, 2);
    info!(
        %request_id,
        machine_id = %prediction.machine_id,
        probability = prediction.failure_probability,
        risk_level = %prediction.risk_level,
        latency_ms,
        "prediction served"
    );

    Ok(Json(PredictResponse {
        prediction,
        timestamp: Utc::now().to_rfc3339(),
        latency_ms,
    }))
}

pub async fn batch_predict(State(state): State<AppState>, body: Bytes) -> Result<Json<BatchResponse>, ApiError> {
    let ctx = state.context()?;
    let samples = match parse_json(&body) {
        Some(Value::Object(mut fields)) => match fields.remove("samples") {
            Some(Value::Array(samples)) if !samples.is_empty() => samples,
            _ => return Err(ApiError::BadRequest("No samples provided".to_string())),
        },
        _ => return Err(ApiError::BadRequest("No JSON data provided".to_string())),
    };
    let request_id = Uuid::new_v4();
    let total_samples = samples.len();

    let results = tokio::task::spawn_blocking(move || ctx.predict_batch(&samples))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| {
            error!(%request_id, error = %e, "batch prediction failed");
            ApiError::from(e)
        })?;

    let rejected = results.iter().filter(|r| r.is_rejected()).count();
    info!(%request_id, total_samples, rejected, "batch served");

    Ok(Json(BatchResponse {
        results,
        total_samples,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// `None` for an empty body, invalid JSON, or JSON `null`.
fn parse_json(body: &[u8]) -> Option<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) | Err(_) => None,
        Ok(value) => Some(value),
    }
}
