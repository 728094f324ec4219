//! Adapter for reading frame.sample.v1 input
//!
//! Parses JSON arrays or NDJSON streams of frame records, validates them as a
//! batch and converts them into engine samples.

use crate::error::EngineError;
use crate::schema::frame_record::*;
use crate::types::FrameSample;

/// Adapter for converting frame records to engine samples
pub struct FrameRecordAdapter;

impl FrameRecordAdapter {
    /// Parse a JSON string containing an array of FrameRecords
    pub fn parse_array(json: &str) -> Result<Vec<FrameRecord>, EngineError> {
        let records: Vec<FrameRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing FrameRecords
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<FrameRecord>, EngineError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            match Self::parse_line(line) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    return Err(EngineError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Parse one NDJSON line; blank lines yield `None`
    pub fn parse_line(line: &str) -> Result<Option<FrameRecord>, serde_json::Error> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(trimmed).map(Some)
    }

    /// Validate a batch of records, including timestamp ordering.
    ///
    /// Returns only the failures.
    pub fn validate_records(records: &[FrameRecord]) -> Vec<ValidationResult> {
        let mut failures = Vec::new();
        let mut previous: Option<f64> = None;

        for (index, record) in records.iter().enumerate() {
            let result = record.validate().and_then(|()| match previous {
                Some(previous) if record.timestamp <= previous => Err(ValidationError::OutOfOrder {
                    timestamp: record.timestamp,
                    previous,
                }),
                _ => Ok(()),
            });

            match result {
                Ok(()) => previous = Some(record.timestamp),
                Err(error) => failures.push(ValidationResult {
                    index,
                    timestamp: record.timestamp,
                    error,
                }),
            }
        }
        failures
    }

    /// Convert records to samples, rejecting the batch on the first invalid record
    pub fn to_samples(records: &[FrameRecord]) -> Result<Vec<FrameSample>, EngineError> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .validate()
                    .map(|()| record.to_sample())
                    .map_err(|e| EngineError::ParseError(format!("Invalid record {}: {}", index, e)))
            })
            .collect()
    }
}

/// One failed record
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub index: usize,
    pub timestamp: f64,
    pub error: ValidationError,
}

#[cfg(test)]
mod tests {
    use super::*;

    const NDJSON: &str = r#"{"timestamp": 0.00, "ear_value": 0.30, "nose_depth": 0.01, "breathing_rate": 15.0}
{"timestamp": 0.08, "ear_value": 0.18, "nose_depth": 0.01}

{"timestamp": 0.16}
"#;

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let records = FrameRecordAdapter::parse_ndjson(NDJSON).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].ear_value, Some(0.18));
        assert!(records[2].to_sample().face.is_none());
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let input = "{\"timestamp\": 0.0}\nnot json\n";
        match FrameRecordAdapter::parse_ndjson(input) {
            Err(EngineError::ParseError(msg)) => assert!(msg.contains("line 2")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_array() {
        let records =
            FrameRecordAdapter::parse_array(r#"[{"timestamp": 0.0}, {"timestamp": 0.1}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert!(FrameRecordAdapter::parse_array("{}").is_err());
    }

    #[test]
    fn test_validate_records_flags_out_of_order() {
        let records = FrameRecordAdapter::parse_ndjson(
            "{\"timestamp\": 1.0}\n{\"timestamp\": 0.5}\n{\"timestamp\": 1.2}\n{\"timestamp\": -2.0}\n",
        )
        .unwrap();

        let failures = FrameRecordAdapter::validate_records(&records);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].index, 1);
        assert_eq!(
            failures[0].error,
            ValidationError::OutOfOrder {
                timestamp: 0.5,
                previous: 1.0
            }
        );
        assert_eq!(failures[1].error, ValidationError::InvalidTimestamp(-2.0));
    }

    #[test]
    fn test_to_samples_rejects_invalid_batch() {
        let records = FrameRecordAdapter::parse_ndjson(
            "{\"timestamp\": 0.0}\n{\"timestamp\": 0.1, \"ear_value\": 0.3}\n",
        )
        .unwrap();
        assert!(matches!(
            FrameRecordAdapter::to_samples(&records),
            Err(EngineError::ParseError(_))
        ));
        assert_eq!(FrameRecordAdapter::to_samples(&records[..1]).unwrap().len(), 1);
    }
}
