//! ONNX Runtime scoring. Input: [1, feature_dim] f32. Output: failure probability.
//!
//! Classifier exports usually emit `label` and `probabilities`; the latter is
//! read when present, otherwise the last output. With two class columns the
//! second (failure) is taken.

use super::{ModelError, Scorer};
use crate::features::FeatureVector;
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;

pub struct OnnxScorer {
    session: Mutex<Session>,
    output_name: String,
    feature_dim: usize,
}

fn runtime(e: impl std::fmt::Display) -> ModelError {
    ModelError::Runtime(e.to_string())
}

impl OnnxScorer {
    pub fn load(path: &Path, feature_dim: usize) -> Result<Self, ModelError> {
        if !path.exists() {
            return Err(ModelError::InvalidArtifact(format!(
                "ONNX model not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(runtime)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(runtime)?
            .commit_from_file(path)
            .map_err(runtime)?;

        let output_name = session
            .outputs()
            .iter()
            .find(|o| o.name() == "probabilities")
            .or_else(|| session.outputs().last())
            .map(|o| o.name().to_string())
            .ok_or_else(|| ModelError::InvalidArtifact("model defines no outputs".to_string()))?;

        tracing::info!(path = %path.display(), output = %output_name, feature_dim, "ONNX model loaded");

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            feature_dim,
        })
    }
}

impl Scorer for OnnxScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        if features.len() != self.feature_dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.feature_dim,
                actual: features.len(),
            });
        }

        let arr = Array2::from_shape_vec((1, self.feature_dim), features.to_f32()).map_err(runtime)?;
        let input = Value::from_array(arr).map_err(runtime)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::Runtime("session lock poisoned".to_string()))?;
        let outputs = session.run(ort::inputs![input]).map_err(runtime)?;
        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ModelError::Runtime(format!("missing output {}", self.output_name)))?;
        let (_, data) = output.try_extract_tensor::<f32>().map_err(runtime)?;

        let probability = match data {
            [_, positive, ..] => *positive,
            [only] => *only,
            [] => return Err(ModelError::Runtime("empty output tensor".to_string())),
        };
        Ok(f64::from(probability))
    }
}
