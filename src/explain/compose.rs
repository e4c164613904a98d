//! Templated explanation sentences. Deterministic: identical inputs give identical text.

use super::{Contribution, RankedAttribution};
use crate::config::RiskConfig;
use crate::risk::{RiskEngine, RiskLevel};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub risk_level: RiskLevel,
    pub probability: f64,
    pub text: String,
}

pub struct ExplanationComposer {
    risk: RiskEngine,
}

impl ExplanationComposer {
    pub fn new(config: RiskConfig) -> Self {
        Self {
            risk: RiskEngine::new(config),
        }
    }

    pub fn risk(&self) -> &RiskEngine {
        &self.risk
    }

    pub fn compose(&self, probability: f64, ranked: &[RankedAttribution]) -> Explanation {
        let risk_level = self.risk.level(probability);
        let headline = format!(
            "{} failure risk ({})",
            risk_level.title(),
            percent(probability)
        );

        let mut increasing = ranked
            .iter()
            .filter(|r| r.contribution == Contribution::Increases);

        let text = match increasing.next() {
            None => format!("{headline}. All monitored parameters within normal ranges."),
            Some(dominant) => {
                let tail = if increasing.next().is_some() {
                    " and sustained sensor patterns"
                } else {
                    ""
                };
                format!("{headline} primarily due to {}{tail}.", factor_phrase(dominant))
            }
        };

        Explanation {
            risk_level,
            probability,
            text,
        }
    }
}

fn percent(probability: f64) -> String {
    format!("{:.0}%", probability * 100.0)
}

/// Feature-group phrase for the dominant contributor.
fn factor_phrase(entry: &RankedAttribution) -> String {
    let readable = entry.feature.replace('_', " ");
    let value = entry.feature_value;
    if readable.contains("temperature") {
        format!("elevated temperature ({value:.1}°C)")
    } else if readable.contains("vibration") {
        format!("high vibration levels ({value:.2})")
    } else if readable.contains("pressure") {
        format!("abnormal pressure ({value:.1})")
    } else {
        format!("{readable} ({value:.2})")
    }
}
