//! Record decode layer - transforms raw JSON bytes into Records
//!
//! Accepts single JSON objects or newline-delimited JSON (NDJSON), one
//! record per line. Top-level attributes use their wire names (`Timestamp`,
//! `Type`, `Hostname`, ...); everything under `Fields` is stringified into
//! the record's dynamic field map, preserving key order.
//!
//! # Usage
//!
//! ```ignore
//! use logs2records::decode::{decode_record, decode_records};
//!
//! let record = decode_record(br#"{"Timestamp": 145767775123456, "Type": "request.summary"}"#)?;
//! let records = decode_records(ndjson_bytes)?;
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::record::{Fields, Record};

/// Wire form of a record, as found in the JSON input.
///
/// Unknown top-level keys are ignored so that envelopes carrying extra
/// metadata still decode.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRecord {
    timestamp: Option<i64>,
    #[serde(rename = "Type")]
    record_type: Option<String>,
    hostname: Option<String>,
    logger: Option<String>,
    env_version: Option<String>,
    severity: Option<i64>,
    pid: Option<i64>,
    #[serde(default)]
    fields: IndexMap<String, Value>,
}

impl RawRecord {
    fn into_record(self) -> Result<Record> {
        let mut fields = Fields::new();
        for (key, value) in self.fields {
            let rendered = scalar_to_string(&key, &value)?;
            fields.insert(key, rendered);
        }
        Ok(Record {
            timestamp: self.timestamp,
            record_type: self.record_type,
            hostname: self.hostname,
            logger: self.logger,
            env_version: self.env_version,
            severity: self.severity,
            pid: self.pid,
            fields,
        })
    }
}

/// Render a scalar field value in its string form.
///
/// Strings pass through; numbers and booleans use their canonical JSON
/// rendering. Nested objects, arrays, and nulls are rejected.
fn scalar_to_string(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::Decode(format!(
            "field '{key}' holds a non-scalar value: {other}"
        ))),
    }
}

/// Decode a single JSON record.
///
/// # Arguments
///
/// * `bytes` - One JSON object in wire form
///
/// # Returns
///
/// The decoded [`Record`], or [`Error::Decode`] when the JSON is malformed,
/// an attribute has the wrong type, or a field value is not a scalar.
pub fn decode_record(bytes: &[u8]) -> Result<Record> {
    let raw: RawRecord = serde_json::from_slice(bytes).map_err(|e| Error::Decode(e.to_string()))?;
    raw.into_record()
}

/// Decode newline-delimited JSON records.
///
/// Processes each non-empty line as one record and returns them in input
/// order. A payload with no records at all is an error, as is any line that
/// fails to decode; line numbers in errors are one-based.
///
/// # Arguments
///
/// * `bytes` - NDJSON payload, one JSON object per line
///
/// # Returns
///
/// All decoded records, or the first [`Error::Decode`] encountered.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<Record>> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::Decode(e.to_string()))?;

    let mut records = Vec::new();
    let mut saw_line = false;

    for (line_num, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        saw_line = true;

        let record = decode_record(trimmed.as_bytes()).map_err(|e| match e {
            Error::Decode(msg) => Error::Decode(format!("line {}: {}", line_num + 1, msg)),
            other => other,
        })?;
        records.push(record);
    }

    if !saw_line {
        return Err(Error::Decode(
            "ndjson payload contained no records".to_string(),
        ));
    }

    Ok(records)
}
