//! Orders per-feature attributions by magnitude and tags their direction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("attribution length mismatch: {attributions} attributions, {values} values, {names} names")]
    LengthMismatch {
        attributions: usize,
        values: usize,
        names: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contribution {
    /// Pushes toward failure
    Increases,
    /// Pushes toward normal operation (zero included)
    Decreases,
}

impl Contribution {
    pub fn from_attribution(value: f64) -> Self {
        if value > 0.0 {
            Contribution::Increases
        } else {
            Contribution::Decreases
        }
    }
}

/// One entry of the `top_features` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAttribution {
    pub feature: String,
    pub shap_value: f64,
    pub feature_value: f64,
    pub contribution: Contribution,
}

/// Top `top_n` attributions by absolute value, largest first. Ties keep schema order.
pub fn rank(
    attributions: &[f64],
    feature_values: &[f64],
    names: &[String],
    top_n: usize,
) -> Result<Vec<RankedAttribution>, RankError> {
    if attributions.len() != names.len() || feature_values.len() != names.len() {
        return Err(RankError::LengthMismatch {
            attributions: attributions.len(),
            values: feature_values.len(),
            names: names.len(),
        });
    }

    let mut order: Vec<usize> = (0..attributions.len()).collect();
    // sort_by is stable, so equal magnitudes stay in schema order
    order.sort_by(|&a, &b| attributions[b].abs().total_cmp(&attributions[a].abs()));

    Ok(order
        .into_iter()
        .take(top_n)
        .map(|i| RankedAttribution {
            feature: names[i].clone(),
            shap_value: attributions[i],
            feature_value: feature_values[i],
            contribution: Contribution::from_attribution(attributions[i]),
        })
        .collect())
}
