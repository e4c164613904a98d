//! Maps a failure probability to a risk tier and a binary prediction.

use crate::config::RiskConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Thresholds are strict: a probability exactly on a boundary takes the lower tier.
    pub fn from_probability(probability: f64, config: &RiskConfig) -> Self {
        if probability > config.high_threshold {
            RiskLevel::High
        } else if probability > config.moderate_threshold {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }

    /// Capitalized form used at the start of an explanation sentence.
    pub fn title(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct RiskEngine {
    config: RiskConfig,
}

impl RiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn level(&self, probability: f64) -> RiskLevel {
        RiskLevel::from_probability(probability, &self.config)
    }

    /// 1 when the probability reaches the decision threshold, else 0.
    pub fn predict(&self, probability: f64) -> u8 {
        u8::from(probability >= self.config.decision_threshold)
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }
}
