#![allow(dead_code)]

use factoryguard::config::{ExplainConfig, RiskConfig};
use factoryguard::model::{LinearArtifact, LinearRiskModel};
use factoryguard::{FeatureSchema, ServiceContext};
use serde_json::{json, Value};
use std::sync::Arc;

pub const SCHEMA: [&str; 25] = [
    "temperature", "vibration", "pressure",
    "hour", "day", "month", "day_of_week",
    "temperature_lag_1", "temperature_lag_2", "temperature_lag_3",
    "vibration_lag_1", "vibration_lag_2", "vibration_lag_3",
    "pressure_lag_1", "pressure_lag_2", "pressure_lag_3",
    "temperature_roll_mean_3", "temperature_roll_mean_6", "temperature_roll_mean_12",
    "vibration_roll_mean_3", "vibration_roll_mean_6", "vibration_roll_mean_12",
    "pressure_roll_mean_3", "pressure_roll_mean_6", "pressure_roll_mean_12",
];

pub fn schema_names() -> Vec<String> {
    SCHEMA.iter().map(|s| s.to_string()).collect()
}

pub fn schema() -> FeatureSchema {
    FeatureSchema::new(schema_names()).unwrap()
}

pub fn sample() -> Value {
    json!({
        "timestamp": "2024-01-15 10:30:00",
        "machine_id": "M001",
        "temperature": 75.5,
        "vibration": 0.45,
        "pressure": 100.2
    })
}

/// Logistic model where only the raw temperature carries weight:
/// logit = 0.05 * (temperature - 60).
pub fn temperature_artifact() -> LinearArtifact {
    let names = schema_names();
    let mut coefficients = vec![0.0; names.len()];
    let mut means = vec![0.0; names.len()];
    coefficients[0] = 0.05;
    means[0] = 60.0;
    LinearArtifact {
        feature_names: names,
        coefficients,
        intercept: 0.0,
        means: Some(means),
        scales: None,
        version: Some("test-1.0".to_string()),
    }
}

pub fn linear_context() -> ServiceContext {
    let model = Arc::new(LinearRiskModel::from_artifact(temperature_artifact()).unwrap());
    ServiceContext::new(
        model.schema().clone(),
        model.clone(),
        model,
        &ExplainConfig::default(),
        RiskConfig::default(),
    )
}
