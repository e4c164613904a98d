//! Input validation for one raw sensor sample.
//!
//! Checks run in a fixed order and the first failure is returned: required
//! fields, numeric convertibility, inclusive range, timestamp format.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub const REQUIRED_FIELDS: [&str; 5] = ["timestamp", "machine_id", "temperature", "vibration", "pressure"];

const NAIVE_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    // US month-first
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    // ISO 8601 basic
    "%Y%m%dT%H%M%S",
    "%Y%m%d %H%M%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorChannel {
    Temperature,
    Vibration,
    Pressure,
}

impl SensorChannel {
    pub const ALL: [SensorChannel; 3] = [
        SensorChannel::Temperature,
        SensorChannel::Vibration,
        SensorChannel::Pressure,
    ];

    /// Base feature name, also the request field name.
    pub fn name(self) -> &'static str {
        match self {
            SensorChannel::Temperature => "temperature",
            SensorChannel::Vibration => "vibration",
            SensorChannel::Pressure => "pressure",
        }
    }

    /// Inclusive physical range accepted for industrial sensors.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            SensorChannel::Temperature => (0.0, 200.0),
            SensorChannel::Vibration => (0.0, 10.0),
            SensorChannel::Pressure => (0.0, 200.0),
        }
    }
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SensorChannel::Temperature => "Temperature",
            SensorChannel::Vibration => "Vibration",
            SensorChannel::Pressure => "Pressure",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("sample must be a JSON object")]
    NotAnObject,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid numeric value for {field}: {raw}")]
    InvalidNumeric { field: &'static str, raw: String },
    #[error("{channel} out of range ({min}-{max}): {value:?}")]
    OutOfRange {
        channel: SensorChannel,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("Invalid timestamp format: {raw}")]
    InvalidTimestamp { raw: String },
}

/// A sample that passed validation. Lives for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub timestamp: NaiveDateTime,
    pub machine_id: String,
    pub temperature: f64,
    pub vibration: f64,
    pub pressure: f64,
}

impl SensorReading {
    pub fn value(&self, channel: SensorChannel) -> f64 {
        match channel {
            SensorChannel::Temperature => self.temperature,
            SensorChannel::Vibration => self.vibration,
            SensorChannel::Pressure => self.pressure,
        }
    }
}

/// Validate a raw sample. Pure; the returned reading is what materialization consumes.
pub fn validate(sample: &Value) -> Result<SensorReading, ValidationError> {
    let fields = sample.as_object().ok_or(ValidationError::NotAnObject)?;

    for field in REQUIRED_FIELDS {
        if !fields.contains_key(field) {
            return Err(ValidationError::MissingField(field));
        }
    }

    let mut values = [0.0f64; 3];
    for (slot, channel) in values.iter_mut().zip(SensorChannel::ALL) {
        let raw = &fields[channel.name()];
        *slot = to_number(raw).ok_or_else(|| ValidationError::InvalidNumeric {
            field: channel.name(),
            raw: raw.to_string(),
        })?;
    }

    for (&value, channel) in values.iter().zip(SensorChannel::ALL) {
        let (min, max) = channel.bounds();
        // NaN fails the containment check as well
        if !(min..=max).contains(&value) {
            return Err(ValidationError::OutOfRange {
                channel,
                min,
                max,
                value,
            });
        }
    }

    let raw_ts = &fields["timestamp"];
    let timestamp = raw_ts
        .as_str()
        .and_then(parse_timestamp)
        .ok_or_else(|| ValidationError::InvalidTimestamp {
            raw: match raw_ts {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })?;

    let machine_id = match &fields["machine_id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Ok(SensorReading {
        timestamp,
        machine_id,
        temperature: values[0],
        vibration: values[1],
        pressure: values[2],
    })
}

/// Numbers and numeric strings convert; anything else does not.
fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parse a date-time. Offset-carrying inputs keep their local wall-clock time;
/// a bare trailing `Z` is read as UTC wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_local());
        }
    }
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(naive, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
