//! Risk tiering of failure probabilities.

mod engine;

pub use engine::{RiskEngine, RiskLevel};
