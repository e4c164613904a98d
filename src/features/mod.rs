//! Online feature materialization: raw sensor sample → validated reading → model-ready vector.

mod materialize;
mod validate;

pub use materialize::{FeatureMaterializer, DEFAULT_FILL};
pub use validate::{
    parse_timestamp, validate, SensorChannel, SensorReading, ValidationError, REQUIRED_FIELDS,
};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("feature schema is empty")]
    Empty,
    #[error("duplicate feature in schema: {0}")]
    Duplicate(String),
    #[error("failed to read schema {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse schema {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered feature names the model was trained on. Fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::Duplicate(name.clone()));
            }
        }
        Ok(Self { names })
    }

    /// Load a JSON array of feature names.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let data = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let names: Vec<String> = serde_json::from_str(&data).map_err(|source| SchemaError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Self::new(names)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl<'de> Deserialize<'de> for FeatureSchema {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Self::new(names).map_err(serde::de::Error::custom)
    }
}

/// Model input; `values[i]` belongs to the schema's `i`-th feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named feature, if the schema has it.
    pub fn get(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.position(name).and_then(|i| self.values.get(i).copied())
    }

    /// Single-row f32 copy for runtimes that take single precision input.
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}
