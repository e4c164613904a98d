//! Model collaborators: failure scoring and per-feature attribution.
//!
//! The core only sees the [`Scorer`] and [`Attributor`] traits; concrete
//! backends are chosen from configuration at startup.

mod linear;
mod occlusion;
mod onnx;

pub use linear::{LinearArtifact, LinearRiskModel};
pub use occlusion::OcclusionAttributor;
pub use onnx::OnnxScorer;

use crate::features::{FeatureVector, SchemaError};
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("onnx runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Probability of the failure (positive) class for one feature vector.
pub trait Scorer: Send + Sync {
    fn score(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

/// One signed attribution per schema feature for the failure class.
/// Positive pushes toward failure, negative toward normal.
pub trait Attributor: Send + Sync {
    fn attribute(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let data = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ModelError::Parse {
        path: path.display().to_string(),
        source,
    })
}
