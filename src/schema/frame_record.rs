//! frame.sample.v1 schema definition
//!
//! A flat record per frame:
//! - `timestamp`: monotonic seconds since recording start
//! - `ear_value` / `nose_depth`: both present when a face was detected, both
//!   absent otherwise
//! - `breathing_rate`: latest breathing rate, absent when the provider had none

use crate::types::{FaceMetrics, FrameSample};
use serde::{Deserialize, Serialize};

/// Current schema version
pub const SCHEMA_VERSION: &str = "frame.sample.v1";

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

/// The frame.sample.v1 record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Schema version identifier, assumed current when omitted
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Monotonic seconds since recording start
    pub timestamp: f64,
    /// Eye aspect ratio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ear_value: Option<f64>,
    /// Nose-tip depth relative to the face plane
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nose_depth: Option<f64>,
    /// Breaths per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breathing_rate: Option<f64>,
}

impl FrameRecord {
    /// Validate a single record
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        if !self.timestamp.is_finite() || self.timestamp < 0.0 {
            return Err(ValidationError::InvalidTimestamp(self.timestamp));
        }

        match (self.ear_value, self.nose_depth) {
            (Some(_), None) => return Err(ValidationError::IncompleteFace("nose_depth")),
            (None, Some(_)) => return Err(ValidationError::IncompleteFace("ear_value")),
            _ => {}
        }

        if let Some(rate) = self.breathing_rate {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ValidationError::InvalidBreathingRate(rate));
            }
        }

        Ok(())
    }

    /// Convert to the engine's per-frame input
    pub fn to_sample(&self) -> FrameSample {
        let face = match (self.ear_value, self.nose_depth) {
            (Some(ear_value), Some(nose_depth)) => Some(FaceMetrics {
                ear_value,
                nose_depth,
            }),
            _ => None,
        };
        FrameSample {
            timestamp: self.timestamp,
            face,
            breathing_rate: self.breathing_rate,
        }
    }
}

impl From<&FrameSample> for FrameRecord {
    fn from(sample: &FrameSample) -> Self {
        Self {
            schema_version: default_schema_version(),
            timestamp: sample.timestamp,
            ear_value: sample.face.map(|f| f.ear_value),
            nose_depth: sample.face.map(|f| f.nose_depth),
            breathing_rate: sample.breathing_rate,
        }
    }
}

/// Validation errors for frame records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Invalid timestamp: {0} (must be finite and non-negative)")]
    InvalidTimestamp(f64),

    #[error("Incomplete face metrics: {0} is missing")]
    IncompleteFace(&'static str),

    #[error("Invalid breathing rate: {0}")]
    InvalidBreathingRate(f64),

    #[error("Timestamp {timestamp} does not advance past {previous}")]
    OutOfOrder { timestamp: f64, previous: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(timestamp: f64) -> FrameRecord {
        FrameRecord {
            schema_version: SCHEMA_VERSION.to_string(),
            timestamp,
            ear_value: Some(0.3),
            nose_depth: Some(-0.02),
            breathing_rate: Some(15.0),
        }
    }

    #[test]
    fn test_minimal_record_defaults() {
        let parsed: FrameRecord = serde_json::from_str(r#"{"timestamp": 1.5}"#).unwrap();
        assert_eq!(parsed.schema_version, SCHEMA_VERSION);
        assert!(parsed.validate().is_ok());

        let sample = parsed.to_sample();
        assert!(sample.face.is_none());
        assert!(sample.breathing_rate.is_none());
    }

    #[test]
    fn test_to_sample_with_face() {
        let sample = record(2.0).to_sample();
        assert_eq!(
            sample,
            FrameSample::new(2.0, 0.3, -0.02, 15.0)
        );
        assert_eq!(FrameRecord::from(&sample), record(2.0));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut bad = record(0.0);
        bad.schema_version = "frame.sample.v0".to_string();
        assert!(matches!(
            bad.validate(),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));
    }

    #[test]
    fn test_rejects_half_a_face() {
        let mut bad = record(0.0);
        bad.nose_depth = None;
        assert_eq!(bad.validate(), Err(ValidationError::IncompleteFace("nose_depth")));
    }

    #[test]
    fn test_rejects_negative_values() {
        assert_eq!(
            record(-1.0).validate(),
            Err(ValidationError::InvalidTimestamp(-1.0))
        );

        let mut bad = record(0.0);
        bad.breathing_rate = Some(-3.0);
        assert_eq!(bad.validate(), Err(ValidationError::InvalidBreathingRate(-3.0)));
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let json = serde_json::to_string(&FrameRecord::from(&FrameSample::no_face(3.0, None))).unwrap();
        assert!(!json.contains("ear_value"));
        assert!(json.contains("frame.sample.v1"));
    }
}
