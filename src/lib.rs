//! FactoryGuard: predictive-maintenance failure risk service.
//!
//! Modular structure:
//! - [`features`]: Input validation and online feature materialization
//! - [`model`]: Scoring and attribution collaborators (linear JSON, ONNX)
//! - [`explain`]: Attribution ranking and templated explanations
//! - [`risk`]: Risk tiers and the failure decision threshold
//! - [`service`]: Immutable service context and the scoring pipeline
//! - [`api`]: HTTP routes
//! - [`logging`]: Structured JSON logging

pub mod api;
pub mod config;
pub mod explain;
pub mod features;
pub mod logging;
pub mod model;
pub mod risk;
pub mod service;

pub use config::ServiceConfig;
pub use explain::{Explanation, ExplanationComposer, RankedAttribution};
pub use features::{FeatureMaterializer, FeatureSchema, FeatureVector, SensorReading};
pub use logging::StructuredLogger;
pub use model::{Attributor, Scorer};
pub use risk::{RiskEngine, RiskLevel};
pub use service::{Prediction, ServiceContext, ServiceError};
