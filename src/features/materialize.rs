//! Online feature materialization: validated reading → vector in schema order.
//!
//! Training features come from grouped, multi-row history (lags, rolling means),
//! but an online request carries a single reading. Lag and rolling-mean features
//! are therefore approximated by the channel's current value. This is a lossy
//! stand-in, not temporal lookback. Offsets and windows are read from the schema
//! names themselves, so every `<channel>_lag_<n>`, `<channel>_roll_mean_<w>` and
//! `<channel>_rolling_mean_<w>h` the model was trained with is covered. Schema
//! features nothing here produces (EMA, rolling std/min/max, interactions)
//! resolve to [`DEFAULT_FILL`].

use super::{FeatureSchema, FeatureVector, SensorChannel, SensorReading};
use chrono::{Datelike, Timelike};

/// Value for any schema feature the online path cannot produce.
pub const DEFAULT_FILL: f64 = 0.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureMaterializer;

impl FeatureMaterializer {
    pub fn new() -> Self {
        Self
    }

    /// Expand a reading into a vector with exactly `schema.len()` values in schema order.
    pub fn materialize(&self, reading: &SensorReading, schema: &FeatureSchema) -> FeatureVector {
        let values = schema
            .names()
            .iter()
            .map(|name| self.resolve(reading, name).unwrap_or(DEFAULT_FILL))
            .collect();
        FeatureVector { values }
    }

    /// Online value of one named feature, or `None` when it needs data a
    /// single reading does not carry.
    pub fn resolve(&self, reading: &SensorReading, name: &str) -> Option<f64> {
        if let Some(channel) = SensorChannel::ALL.into_iter().find(|c| c.name() == name) {
            return Some(reading.value(channel));
        }

        let ts = reading.timestamp;
        let calendar = match name {
            "hour" => ts.hour(),
            "day" => ts.day(),
            "month" => ts.month(),
            "day_of_week" => ts.weekday().num_days_from_monday(),
            _ => return history_channel(name).map(|channel| reading.value(channel)),
        };
        Some(f64::from(calendar))
    }
}

/// Channel of a lag or rolling-mean feature name.
fn history_channel(name: &str) -> Option<SensorChannel> {
    SensorChannel::ALL.into_iter().find(|channel| {
        name.strip_prefix(channel.name())
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(is_history_suffix)
    })
}

fn is_history_suffix(suffix: &str) -> bool {
    if let Some(lag) = suffix.strip_prefix("lag_") {
        return is_offset(lag);
    }
    if let Some(window) = suffix.strip_prefix("roll_mean_") {
        return is_offset(window);
    }
    suffix
        .strip_prefix("rolling_mean_")
        .and_then(|w| w.strip_suffix('h'))
        .is_some_and(is_offset)
}

fn is_offset(digits: &str) -> bool {
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

