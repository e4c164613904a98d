//! Model-agnostic attribution by occlusion: each feature's attribution is the
//! drop in score when that feature alone is replaced by its baseline value.

use super::{read_json, Attributor, ModelError, Scorer};
use crate::features::{FeatureSchema, FeatureVector, DEFAULT_FILL};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub struct OcclusionAttributor {
    scorer: Arc<dyn Scorer>,
    baseline: Vec<f64>,
}

impl OcclusionAttributor {
    pub fn new(scorer: Arc<dyn Scorer>, baseline: Vec<f64>) -> Self {
        Self { scorer, baseline }
    }

    /// Baseline by feature name; features missing from `lookup` use [`DEFAULT_FILL`].
    pub fn from_lookup(
        scorer: Arc<dyn Scorer>,
        schema: &FeatureSchema,
        lookup: &HashMap<String, f64>,
    ) -> Self {
        let baseline = schema
            .names()
            .iter()
            .map(|name| lookup.get(name).copied().unwrap_or(DEFAULT_FILL))
            .collect();
        Self::new(scorer, baseline)
    }

    /// Read a JSON object of `feature name -> baseline value`.
    pub fn load_baseline(path: &Path) -> Result<HashMap<String, f64>, ModelError> {
        read_json(path)
    }

    pub fn baseline(&self) -> &[f64] {
        &self.baseline
    }
}

impl Attributor for OcclusionAttributor {
    fn attribute(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.baseline.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.baseline.len(),
                actual: features.len(),
            });
        }

        let full = self.scorer.score(features)?;
        let mut probe = features.clone();
        let mut out = Vec::with_capacity(features.len());
        for (i, &base) in self.baseline.iter().enumerate() {
            let original = probe.values[i];
            if original == base {
                out.push(0.0);
                continue;
            }
            probe.values[i] = base;
            let occluded = self.scorer.score(&probe)?;
            probe.values[i] = original;
            out.push(full - occluded);
        }
        Ok(out)
    }
}
