//! Standardized logistic regression exported as JSON.
//!
//! Attributions are the exact log-odds contributions `w_i * (x_i - mean_i) / scale_i`;
//! together with the intercept they sum to the model's logit.

use super::{read_json, Attributor, ModelError, Scorer};
use crate::features::{FeatureSchema, FeatureVector};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Scaler means; zero when absent
    #[serde(default)]
    pub means: Option<Vec<f64>>,
    /// Scaler standard deviations; one when absent
    #[serde(default)]
    pub scales: Option<Vec<f64>>,
    #[serde(default)]
    pub version: Option<String>,
}

pub struct LinearRiskModel {
    schema: FeatureSchema,
    coefficients: Vec<f64>,
    intercept: f64,
    means: Vec<f64>,
    scales: Vec<f64>,
    version: Option<String>,
}

impl LinearRiskModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let artifact: LinearArtifact = read_json(path)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, ModelError> {
        let schema = FeatureSchema::new(artifact.feature_names)?;
        let n = schema.len();
        check_len("coefficients", artifact.coefficients.len(), n)?;

        let means = artifact.means.unwrap_or_else(|| vec![0.0; n]);
        check_len("means", means.len(), n)?;

        // A constant training column has scale 0; treat it as unscaled.
        let scales: Vec<f64> = artifact
            .scales
            .unwrap_or_else(|| vec![1.0; n])
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        check_len("scales", scales.len(), n)?;

        Ok(Self {
            schema,
            coefficients: artifact.coefficients,
            intercept: artifact.intercept,
            means,
            scales,
            version: artifact.version,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn contributions(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }
        Ok(features
            .as_slice()
            .iter()
            .zip(&self.coefficients)
            .zip(self.means.iter().zip(&self.scales))
            .map(|((x, w), (mean, scale))| w * (x - mean) / scale)
            .collect())
    }
}

impl Scorer for LinearRiskModel {
    fn score(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let logit = self.intercept + self.contributions(features)?.iter().sum::<f64>();
        Ok(sigmoid(logit))
    }
}

impl Attributor for LinearRiskModel {
    fn attribute(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        self.contributions(features)
    }
}

fn check_len(field: &str, actual: usize, expected: usize) -> Result<(), ModelError> {
    if actual != expected {
        return Err(ModelError::InvalidArtifact(format!(
            "{field} has {actual} entries, expected {expected}"
        )));
    }
    Ok(())
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
