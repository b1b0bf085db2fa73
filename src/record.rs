//! Input record model.
//!
//! A [`Record`] carries seven fixed attributes plus [`Fields`], an ordered
//! map of dynamic string keys to string values. Records are transient: one is
//! created per incoming event and discarded once encoded.

use indexmap::IndexMap;
use std::fmt;

use crate::schema::{ScalarKind, ScalarValue};

// ============================================================================
// Fixed attributes
// ============================================================================

/// The fixed top-level attributes every record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Event time, epoch nanoseconds. Required for a valid output record.
    Timestamp,
    /// Record type label.
    Type,
    /// Originating host.
    Hostname,
    /// Emitting logger name.
    Logger,
    /// Envelope version string.
    EnvVersion,
    /// Syslog-style severity number.
    Severity,
    /// Emitting process id.
    Pid,
}

impl Attribute {
    /// Scalar kind this attribute resolves to.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Attribute::Timestamp | Attribute::Severity | Attribute::Pid => ScalarKind::Int64,
            Attribute::Type | Attribute::Hostname | Attribute::Logger | Attribute::EnvVersion => {
                ScalarKind::Utf8
            }
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Timestamp => "Timestamp",
            Attribute::Type => "Type",
            Attribute::Hostname => "Hostname",
            Attribute::Logger => "Logger",
            Attribute::EnvVersion => "EnvVersion",
            Attribute::Severity => "Severity",
            Attribute::Pid => "Pid",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Dynamic field map
// ============================================================================

/// Ordered dynamic key/value map.
///
/// Keys are unique and insertion order is preserved; re-inserting an existing
/// key replaces its value without moving it. Both keys and values are always
/// present, non-null strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(IndexMap<String, String>);

impl Fields {
    /// Create an empty field map.
    pub fn new() -> Self {
        Fields(IndexMap::new())
    }

    /// Insert a key/value pair, returning the previous value if the key was
    /// already present. An existing key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// True when the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

// ============================================================================
// Record
// ============================================================================

/// One incoming event: fixed attributes plus the dynamic field map.
///
/// `timestamp` is optional in the in-memory form so that its absence can be
/// detected and reported at validation instead of at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Event time, epoch nanoseconds.
    pub timestamp: Option<i64>,
    /// Record type label (the `Type` attribute).
    pub record_type: Option<String>,
    /// Originating host.
    pub hostname: Option<String>,
    /// Emitting logger name.
    pub logger: Option<String>,
    /// Envelope version string.
    pub env_version: Option<String>,
    /// Syslog-style severity number.
    pub severity: Option<i64>,
    /// Emitting process id.
    pub pid: Option<i64>,
    /// Dynamic key/value map.
    pub fields: Fields,
}

impl Record {
    /// Create a record with the given timestamp and no other attributes.
    pub fn new(timestamp: i64) -> Self {
        Record {
            timestamp: Some(timestamp),
            ..Record::default()
        }
    }

    /// Set the `Type` attribute.
    pub fn with_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Set the `Hostname` attribute.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Set the `Logger` attribute.
    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    /// Set the `EnvVersion` attribute.
    pub fn with_env_version(mut self, env_version: impl Into<String>) -> Self {
        self.env_version = Some(env_version.into());
        self
    }

    /// Set the `Severity` attribute.
    pub fn with_severity(mut self, severity: i64) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set the `Pid` attribute.
    pub fn with_pid(mut self, pid: i64) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Append a dynamic field, preserving insertion order.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key, value);
        self
    }

    /// Resolve a fixed attribute to a typed value, or `None` when unset.
    pub fn attribute(&self, attribute: Attribute) -> Option<ScalarValue> {
        match attribute {
            Attribute::Timestamp => self.timestamp.map(ScalarValue::Int64),
            Attribute::Type => self.record_type.clone().map(ScalarValue::Utf8),
            Attribute::Hostname => self.hostname.clone().map(ScalarValue::Utf8),
            Attribute::Logger => self.logger.clone().map(ScalarValue::Utf8),
            Attribute::EnvVersion => self.env_version.clone().map(ScalarValue::Utf8),
            Attribute::Severity => self.severity.map(ScalarValue::Int64),
            Attribute::Pid => self.pid.map(ScalarValue::Int64),
        }
    }
}
