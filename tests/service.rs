//! Scoring pipeline: validate → materialize → score → attribute → rank → compose.

mod common;

use factoryguard::config::{ExplainConfig, RiskConfig};
use factoryguard::explain::Contribution;
use factoryguard::features::{FeatureSchema, FeatureVector};
use factoryguard::model::{
    Attributor, LinearArtifact, LinearRiskModel, ModelError, OcclusionAttributor, Scorer,
};
use factoryguard::service::{BatchOutcome, ServiceContext, ServiceError};
use factoryguard::RiskLevel;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

struct FixedScorer(f64);

impl Scorer for FixedScorer {
    fn score(&self, _: &FeatureVector) -> Result<f64, ModelError> {
        Ok(self.0)
    }
}

struct ShortAttributor;

impl Attributor for ShortAttributor {
    fn attribute(&self, _: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        Ok(vec![0.1])
    }
}

struct FailingAttributor;

impl Attributor for FailingAttributor {
    fn attribute(&self, _: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        Err(ModelError::Runtime("explainer crashed".to_string()))
    }
}

struct FailingScorer;

impl Scorer for FailingScorer {
    fn score(&self, _: &FeatureVector) -> Result<f64, ModelError> {
        Err(ModelError::Runtime("session crashed".to_string()))
    }
}

/// score = 0.1 * x0 + 0.2 * x1
struct WeightedSum;

impl Scorer for WeightedSum {
    fn score(&self, f: &FeatureVector) -> Result<f64, ModelError> {
        Ok(0.1 * f.values[0] + 0.2 * f.values[1])
    }
}

fn context_with(scorer: Arc<dyn Scorer>, attributor: Arc<dyn Attributor>) -> ServiceContext {
    ServiceContext::new(
        common::schema(),
        scorer,
        attributor,
        &ExplainConfig::default(),
        RiskConfig::default(),
    )
}

#[test]
fn predict_end_to_end_with_linear_model() {
    let ctx = common::linear_context();
    let p = ctx.predict(&common::sample()).unwrap();

    assert_eq!(p.machine_id, "M001");
    assert_eq!(p.failure_probability, 0.6846);
    assert_eq!(p.prediction, 1);
    assert_eq!(p.risk_level, RiskLevel::Moderate);
    assert_eq!(p.top_features.len(), 5);
    assert_eq!(p.top_features[0].feature, "temperature");
    assert_eq!(p.top_features[0].feature_value, 75.5);
    assert!((p.top_features[0].shap_value - 0.775).abs() < 1e-12);
    assert_eq!(p.top_features[0].contribution, Contribution::Increases);
    assert_eq!(
        p.explanation,
        "Moderate failure risk (68%) primarily due to elevated temperature (75.5°C)."
    );
}

#[test]
fn predict_surfaces_validation_errors() {
    let ctx = common::linear_context();
    let mut sample = common::sample();
    sample["temperature"] = json!(250.0);
    let err = ctx.predict(&sample).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(err.to_string().contains("Temperature out of range"));
}

#[test]
fn batch_isolates_invalid_samples_in_order() {
    let ctx = common::linear_context();
    let mut invalid = common::sample();
    invalid["machine_id"] = json!("M404");
    invalid.as_object_mut().unwrap().remove("pressure");

    let results = ctx.predict_batch(&[invalid, common::sample()]).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0],
        BatchOutcome::Rejected {
            machine_id: "M404".to_string(),
            error: "Missing required field: pressure".to_string(),
        }
    );
    assert_eq!(
        results[1],
        BatchOutcome::Scored {
            machine_id: "M001".to_string(),
            failure_probability: 0.6846,
            prediction: 1,
            risk_level: RiskLevel::Moderate,
        }
    );
}

#[test]
fn batch_rejection_without_machine_id_is_unknown() {
    let ctx = common::linear_context();
    let results = ctx.predict_batch(&[json!({"temperature": 1.0}), json!("junk")]).unwrap();
    for r in &results {
        match r {
            BatchOutcome::Rejected { machine_id, .. } => assert_eq!(machine_id, "unknown"),
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn batch_outcomes_serialize_flat() {
    let ctx = common::linear_context();
    let results = ctx.predict_batch(&[json!({"machine_id": "M9"}), common::sample()]).unwrap();
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[0], json!({"machine_id": "M9", "error": "Missing required field: timestamp"}));
    assert_eq!(json[1]["risk_level"], "moderate");
    assert_eq!(json[1]["prediction"], 1);
}

#[test]
fn scorer_failure_is_not_masked() {
    let ctx = context_with(Arc::new(FailingScorer), Arc::new(ShortAttributor));
    assert!(matches!(
        ctx.predict(&common::sample()).unwrap_err(),
        ServiceError::ScoringFailure(_)
    ));
    assert!(matches!(
        ctx.predict_batch(&[common::sample()]).unwrap_err(),
        ServiceError::ScoringFailure(_)
    ));
}

#[test]
fn out_of_range_probability_is_a_scoring_failure() {
    let ctx = context_with(Arc::new(FixedScorer(1.5)), Arc::new(ShortAttributor));
    assert!(matches!(
        ctx.predict(&common::sample()).unwrap_err(),
        ServiceError::ScoringFailure(_)
    ));
    let ctx = context_with(Arc::new(FixedScorer(f64::NAN)), Arc::new(ShortAttributor));
    assert!(ctx.predict(&common::sample()).is_err());
}

#[test]
fn wrong_attribution_length_is_an_attribution_failure() {
    let ctx = context_with(Arc::new(FixedScorer(0.3)), Arc::new(ShortAttributor));
    assert!(matches!(
        ctx.predict(&common::sample()).unwrap_err(),
        ServiceError::AttributionFailure(_)
    ));
}

#[test]
fn attributor_error_is_an_attribution_failure() {
    let ctx = context_with(Arc::new(FixedScorer(0.3)), Arc::new(FailingAttributor));
    let err = ctx.predict(&common::sample()).unwrap_err();
    assert!(matches!(err, ServiceError::AttributionFailure(_)));
    assert_eq!(err.to_string(), "attribution failed: onnx runtime: explainer crashed");
}

#[test]
fn linear_attributions_sum_to_logit() {
    let artifact = LinearArtifact {
        feature_names: vec!["a".into(), "b".into(), "c".into()],
        coefficients: vec![0.5, -1.0, 2.0],
        intercept: -0.25,
        means: Some(vec![1.0, 0.0, 3.0]),
        scales: Some(vec![2.0, 1.0, 0.0]),
        version: None,
    };
    let model = LinearRiskModel::from_artifact(artifact).unwrap();
    let fv = FeatureVector { values: vec![5.0, 0.5, 4.0] };

    let attr = model.attribute(&fv).unwrap();
    // zero scale is treated as one
    assert_eq!(attr, vec![1.0, -0.5, 2.0]);

    let logit: f64 = -0.25 + attr.iter().sum::<f64>();
    let expected = 1.0 / (1.0 + (-logit).exp());
    assert!((model.score(&fv).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn linear_artifact_lengths_validated() {
    let mut artifact = common::temperature_artifact();
    artifact.coefficients.pop();
    assert!(matches!(
        LinearRiskModel::from_artifact(artifact),
        Err(ModelError::InvalidArtifact(_))
    ));

    let model = LinearRiskModel::from_artifact(common::temperature_artifact()).unwrap();
    assert!(matches!(
        model.score(&FeatureVector { values: vec![1.0] }),
        Err(ModelError::DimensionMismatch { expected: 25, actual: 1 })
    ));
}

#[test]
fn occlusion_attributes_against_baseline() {
    let schema = FeatureSchema::new(vec!["x0".into(), "x1".into(), "x2".into()]).unwrap();
    let baseline = HashMap::from([("x1".to_string(), 2.0)]);
    let attributor = OcclusionAttributor::from_lookup(Arc::new(WeightedSum), &schema, &baseline);
    assert_eq!(attributor.baseline(), &[0.0, 2.0, 0.0]);

    let attr = attributor
        .attribute(&FeatureVector { values: vec![1.0, 2.0, 7.0] })
        .unwrap();
    assert!((attr[0] - 0.1).abs() < 1e-12);
    // equal to its baseline: no contribution
    assert_eq!(attr[1], 0.0);
    // unused by the scorer
    assert!(attr[2].abs() < 1e-12);
}

#[test]
fn occlusion_checks_dimension() {
    let attributor = OcclusionAttributor::new(Arc::new(WeightedSum), vec![0.0, 0.0]);
    assert!(matches!(
        attributor.attribute(&FeatureVector { values: vec![1.0] }),
        Err(ModelError::DimensionMismatch { expected: 2, actual: 1 })
    ));
}
