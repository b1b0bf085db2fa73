//! Partition path resolution.
//!
//! A [`PartitionKeyBuilder`] resolves an ordered list of configured
//! dimensions against a record, producing the [`PartitionPath`] that routes
//! the encoded record to its output location:
//!
//! ```ignore
//! use logs2records::{Attribute, DimensionSource, PartitionDimension, PartitionKeyBuilder};
//!
//! let builder = PartitionKeyBuilder::new(vec![
//!     PartitionDimension::attribute("log", Attribute::Type),
//!     PartitionDimension::field("date", "Date"),
//! ]);
//! let path = builder.build_path(&record)?;
//! assert_eq!(path.join("/"), "request.summary/2024-01-01");
//! ```
//!
//! Resolution is a pure function of the record's attributes and field map.
//! A missing source value fails the record; a placeholder segment would
//! silently misfile data.

use std::fmt;

use crate::error::{Error, Result};
use crate::record::{Attribute, Record};

/// Where a partition dimension reads its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionSource {
    /// A fixed record attribute.
    Attribute(Attribute),
    /// A dynamic field, by key.
    Field(String),
}

/// One named segment of the partition hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDimension {
    name: String,
    source: DimensionSource,
}

impl PartitionDimension {
    /// Dimension sourced from a fixed attribute.
    pub fn attribute(name: impl Into<String>, source: Attribute) -> Self {
        PartitionDimension {
            name: name.into(),
            source: DimensionSource::Attribute(source),
        }
    }

    /// Dimension sourced from a dynamic field key.
    pub fn field(name: impl Into<String>, source: impl Into<String>) -> Self {
        PartitionDimension {
            name: name.into(),
            source: DimensionSource::Field(source.into()),
        }
    }

    /// Dimension name, used in error reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured value source.
    pub fn source(&self) -> &DimensionSource {
        &self.source
    }
}

/// Ordered partition path segments resolved from one record.
///
/// Hashable and comparable so it can key grouping maps; displays
/// slash-joined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionPath {
    segments: Vec<String>,
}

impl PartitionPath {
    /// Wrap already-resolved segments.
    pub fn new(segments: Vec<String>) -> Self {
        PartitionPath { segments }
    }

    /// Resolved segment values in dimension order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Concatenate the segments with a caller-chosen separator.
    pub fn join(&self, separator: &str) -> String {
        self.segments.join(separator)
    }
}

impl fmt::Display for PartitionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.join("/"))
    }
}

/// Resolves configured dimensions against records.
#[derive(Debug, Clone)]
pub struct PartitionKeyBuilder {
    dimensions: Vec<PartitionDimension>,
}

impl PartitionKeyBuilder {
    /// Build from an ordered dimension list.
    pub fn new(dimensions: Vec<PartitionDimension>) -> Self {
        PartitionKeyBuilder { dimensions }
    }

    /// Configured dimensions in resolution order.
    pub fn dimensions(&self) -> &[PartitionDimension] {
        &self.dimensions
    }

    /// Resolve the partition path for a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PartitionDimensionMissing`] naming the first
    /// dimension whose source value is absent.
    pub fn build_path(&self, record: &Record) -> Result<PartitionPath> {
        let mut segments = Vec::with_capacity(self.dimensions.len());
        for dimension in &self.dimensions {
            let value = match &dimension.source {
                DimensionSource::Attribute(attribute) => {
                    record.attribute(*attribute).map(|v| v.to_string())
                }
                DimensionSource::Field(key) => record.fields.get(key).map(str::to_string),
            };
            match value {
                Some(segment) => segments.push(segment),
                None => {
                    return Err(Error::PartitionDimensionMissing {
                        dimension: dimension.name.clone(),
                    })
                }
            }
        }
        Ok(PartitionPath::new(segments))
    }
}
