//! `ServiceContext`: schema, collaborators and explanation settings loaded once
//! at startup, plus the single-sample and batch scoring paths.

use super::ServiceError;
use crate::config::{ExplainConfig, ModelKind, RiskConfig, ServiceConfig};
use crate::explain::{rank, ExplanationComposer, RankedAttribution};
use crate::features::{
    validate, FeatureMaterializer, FeatureSchema, FeatureVector, SensorReading, ValidationError,
};
use crate::model::{
    read_json, Attributor, LinearRiskModel, ModelError, OcclusionAttributor, OnnxScorer, Scorer,
};
use crate::risk::RiskLevel;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Scored and explained result for one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub machine_id: String,
    /// Rounded to 4 decimals
    pub failure_probability: f64,
    pub prediction: u8,
    pub risk_level: RiskLevel,
    pub top_features: Vec<RankedAttribution>,
    pub explanation: String,
}

/// One entry of a batch response, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Scored {
        machine_id: String,
        failure_probability: f64,
        prediction: u8,
        risk_level: RiskLevel,
    },
    Rejected {
        machine_id: String,
        error: String,
    },
}

impl BatchOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, BatchOutcome::Rejected { .. })
    }
}

pub struct ServiceContext {
    schema: FeatureSchema,
    materializer: FeatureMaterializer,
    scorer: Arc<dyn Scorer>,
    attributor: Arc<dyn Attributor>,
    composer: ExplanationComposer,
    top_n: usize,
    model_version: Option<String>,
    metadata: Option<Value>,
}

impl ServiceContext {
    pub fn new(
        schema: FeatureSchema,
        scorer: Arc<dyn Scorer>,
        attributor: Arc<dyn Attributor>,
        explain: &ExplainConfig,
        risk: RiskConfig,
    ) -> Self {
        Self {
            schema,
            materializer: FeatureMaterializer::new(),
            scorer,
            attributor,
            composer: ExplanationComposer::new(risk),
            top_n: explain.top_n,
            model_version: None,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    /// Load schema and model backends named by the configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ModelError> {
        let model_cfg = &config.model;
        let (schema, scorer, attributor, version): (
            FeatureSchema,
            Arc<dyn Scorer>,
            Arc<dyn Attributor>,
            Option<String>,
        ) = match model_cfg.kind {
            ModelKind::Linear => {
                let model = Arc::new(LinearRiskModel::load(&model_cfg.path)?);
                let schema = match &model_cfg.schema_path {
                    Some(path) => {
                        let schema = FeatureSchema::load(path)?;
                        if schema != *model.schema() {
                            return Err(ModelError::InvalidArtifact(
                                "schema does not match the linear artifact's feature names".to_string(),
                            ));
                        }
                        schema
                    }
                    None => model.schema().clone(),
                };
                let version = model.version().map(str::to_string);
                (
                    schema,
                    model.clone() as Arc<dyn Scorer>,
                    model as Arc<dyn Attributor>,
                    version,
                )
            }
            ModelKind::Onnx => {
                let schema_path = model_cfg.schema_path.as_ref().ok_or_else(|| {
                    ModelError::InvalidArtifact("onnx model requires model.schema_path".to_string())
                })?;
                let schema = FeatureSchema::load(schema_path)?;
                let scorer: Arc<dyn Scorer> = Arc::new(OnnxScorer::load(&model_cfg.path, schema.len())?);
                let baseline = match &model_cfg.baseline_path {
                    Some(path) => OcclusionAttributor::load_baseline(path)?,
                    None => HashMap::new(),
                };
                let attributor = Arc::new(OcclusionAttributor::from_lookup(
                    scorer.clone(),
                    &schema,
                    &baseline,
                ));
                (schema, scorer, attributor as Arc<dyn Attributor>, None)
            }
        };

        let mut ctx = Self::new(
            schema,
            scorer,
            attributor,
            &config.explain,
            config.risk.clone(),
        );
        if let Some(version) = version {
            ctx = ctx.with_model_version(version);
        }
        if let Some(path) = &model_cfg.metadata_path {
            ctx = ctx.with_metadata(read_json(path)?);
        }
        Ok(ctx)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Version from metadata, falling back to the artifact's own.
    pub fn model_version(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("version"))
            .and_then(Value::as_str)
            .or(self.model_version.as_deref())
    }

    /// Validate and materialize without scoring.
    pub fn prepare(&self, sample: &Value) -> Result<(SensorReading, FeatureVector), ValidationError> {
        let reading = validate(sample)?;
        let features = self.materializer.materialize(&reading, &self.schema);
        Ok((reading, features))
    }

    pub fn predict(&self, sample: &Value) -> Result<Prediction, ServiceError> {
        let (reading, features) = self.prepare(sample)?;
        let probability = self.score(&features)?;

        let attributions = self
            .attributor
            .attribute(&features)
            .map_err(ServiceError::attribution)?;
        let top_features = rank(&attributions, features.as_slice(), self.schema.names(), self.top_n)?;
        let explanation = self.composer.compose(probability, &top_features);

        Ok(Prediction {
            machine_id: reading.machine_id,
            failure_probability: round_to(probability, 4),
            prediction: self.composer.risk().predict(probability),
            risk_level: explanation.risk_level,
            top_features,
            explanation: explanation.text,
        })
    }

    /// Score every sample in order. Validation failures become per-sample
    /// entries; a collaborator failure aborts the batch.
    pub fn predict_batch(&self, samples: &[Value]) -> Result<Vec<BatchOutcome>, ServiceError> {
        let mut results = Vec::with_capacity(samples.len());
        for sample in samples {
            let (reading, features) = match self.prepare(sample) {
                Ok(prepared) => prepared,
                Err(err) => {
                    results.push(BatchOutcome::Rejected {
                        machine_id: machine_id_of(sample),
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            let probability = self.score(&features)?;
            let risk = self.composer.risk();
            results.push(BatchOutcome::Scored {
                machine_id: reading.machine_id,
                failure_probability: round_to(probability, 4),
                prediction: risk.predict(probability),
                risk_level: risk.level(probability),
            });
        }
        Ok(results)
    }

    fn score(&self, features: &FeatureVector) -> Result<f64, ServiceError> {
        let probability = self.scorer.score(features).map_err(ServiceError::scoring)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ServiceError::ScoringFailure(format!(
                "probability outside [0, 1]: {probability}"
            )));
        }
        Ok(probability)
    }
}

/// Best-effort machine id for samples that failed validation.
pub fn machine_id_of(sample: &Value) -> String {
    match sample.get("machine_id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
