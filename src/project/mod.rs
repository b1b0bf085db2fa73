//! Field projection.
//!
//! A [`FieldProjector`] turns a raw [`Record`] into a [`MappedRecord`]: one
//! optional typed value per schema column plus the residual dynamic fields
//! that no rule consumed. Rules are declared as data, validated against the
//! schema once at startup, and applied per record with no further lookups by
//! name.
//!
//! ```ignore
//! use logs2records::{FieldProjector, MappingRule};
//!
//! let projector = FieldProjector::new(&schema, rules)?;
//! let mapped = projector.project(&record);
//! ```
//!
//! Projection never fails: a dynamic value that does not parse as its
//! column's integer type null-fills the column and the record proceeds.

pub mod user_agent;

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::record::{Attribute, Fields, Record};
use crate::schema::{ScalarKind, ScalarValue, TableSchema};

pub use user_agent::UserAgent;

// ============================================================================
// Mapping rules
// ============================================================================

/// Declarative binding from record content to one or more schema columns.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingRule {
    /// Fill a column from a fixed attribute.
    Attribute {
        /// Target column name.
        column: String,
        /// Source attribute.
        source: Attribute,
    },
    /// Fill a column from a dynamic field, coercing to the column's kind.
    Field {
        /// Target column name.
        column: String,
        /// Source dynamic-field key.
        source: String,
    },
    /// Decompose a raw user-agent field into three columns, writing the raw
    /// value to a fallback column when decomposition fails.
    UserAgent {
        /// Source dynamic-field key holding the raw user-agent string.
        source: String,
        /// Browser family column (utf8).
        browser: String,
        /// OS family column (utf8).
        os: String,
        /// Major version column (int64).
        version: String,
        /// Raw fallback column (utf8).
        fallback: String,
    },
}

impl MappingRule {
    /// Bind a column to a fixed attribute.
    pub fn attribute(column: impl Into<String>, source: Attribute) -> Self {
        MappingRule::Attribute {
            column: column.into(),
            source,
        }
    }

    /// Bind a column to a dynamic field key.
    pub fn field(column: impl Into<String>, source: impl Into<String>) -> Self {
        MappingRule::Field {
            column: column.into(),
            source: source.into(),
        }
    }

    /// Bind the user-agent column family to a dynamic field key, in the
    /// order `(source, browser, os, version, fallback)`.
    pub fn user_agent(
        source: impl Into<String>,
        browser: impl Into<String>,
        os: impl Into<String>,
        version: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        MappingRule::UserAgent {
            source: source.into(),
            browser: browser.into(),
            os: os.into(),
            version: version.into(),
            fallback: fallback.into(),
        }
    }
}

// ============================================================================
// Mapped record
// ============================================================================

/// Projection output: one optional value per schema column, in schema order,
/// plus the residual dynamic fields.
///
/// The residual map never contains a key bound by any rule, whether or not
/// that rule produced a value.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRecord {
    values: Vec<Option<ScalarValue>>,
    residual: Fields,
}

impl MappedRecord {
    /// Assemble a mapped record from schema-ordered values and residual
    /// fields.
    pub fn new(values: Vec<Option<ScalarValue>>, residual: Fields) -> Self {
        MappedRecord { values, residual }
    }

    /// All column values in schema order.
    pub fn values(&self) -> &[Option<ScalarValue>] {
        &self.values
    }

    /// Value at a column position, `None` when null or out of range.
    pub fn value(&self, index: usize) -> Option<&ScalarValue> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Residual dynamic fields, insertion order preserved.
    pub fn residual(&self) -> &Fields {
        &self.residual
    }
}

// ============================================================================
// Projector
// ============================================================================

/// Pre-resolved rule: column names replaced by schema positions.
#[derive(Debug, Clone)]
enum CompiledRule {
    Attribute {
        column: usize,
        source: Attribute,
    },
    Scalar {
        column: usize,
        kind: ScalarKind,
        source: String,
    },
    UserAgent {
        source: String,
        browser: usize,
        os: usize,
        version: usize,
        fallback: usize,
    },
}

/// Applies mapping rules to records.
///
/// Construction validates every rule against the schema; projection itself
/// is infallible and allocation-light.
#[derive(Debug, Clone)]
pub struct FieldProjector {
    rules: Vec<CompiledRule>,
    bound_keys: HashSet<String>,
    column_count: usize,
}

impl FieldProjector {
    /// Compile mapping rules against a schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a rule targets an unknown column, the
    /// column's declared kind does not fit the rule, or two rules bind the
    /// same column.
    pub fn new(schema: &TableSchema, rules: Vec<MappingRule>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut bound_keys = HashSet::new();
        let mut bound_columns = HashSet::new();

        for rule in rules {
            match rule {
                MappingRule::Attribute { column, source } => {
                    let index = resolve_column(schema, &column, source.kind(), &mut bound_columns)?;
                    compiled.push(CompiledRule::Attribute {
                        column: index,
                        source,
                    });
                }
                MappingRule::Field { column, source } => {
                    let kind = column_kind(schema, &column)?;
                    let index = resolve_column(schema, &column, kind, &mut bound_columns)?;
                    bound_keys.insert(source.clone());
                    compiled.push(CompiledRule::Scalar {
                        column: index,
                        kind,
                        source,
                    });
                }
                MappingRule::UserAgent {
                    source,
                    browser,
                    os,
                    version,
                    fallback,
                } => {
                    let browser =
                        resolve_column(schema, &browser, ScalarKind::Utf8, &mut bound_columns)?;
                    let os = resolve_column(schema, &os, ScalarKind::Utf8, &mut bound_columns)?;
                    let version =
                        resolve_column(schema, &version, ScalarKind::Int64, &mut bound_columns)?;
                    let fallback =
                        resolve_column(schema, &fallback, ScalarKind::Utf8, &mut bound_columns)?;
                    bound_keys.insert(source.clone());
                    compiled.push(CompiledRule::UserAgent {
                        source,
                        browser,
                        os,
                        version,
                        fallback,
                    });
                }
            }
        }

        Ok(FieldProjector {
            rules: compiled,
            bound_keys,
            column_count: schema.columns().len(),
        })
    }

    /// Dynamic-field keys consumed by the compiled rules.
    pub fn bound_keys(&self) -> impl Iterator<Item = &str> {
        self.bound_keys.iter().map(String::as_str)
    }

    /// Project a record into schema-ordered column values and residual
    /// fields.
    pub fn project(&self, record: &Record) -> MappedRecord {
        let mut values: Vec<Option<ScalarValue>> = vec![None; self.column_count];

        for rule in &self.rules {
            match rule {
                CompiledRule::Attribute { column, source } => {
                    values[*column] = record.attribute(*source);
                }
                CompiledRule::Scalar {
                    column,
                    kind,
                    source,
                } => {
                    if let Some(raw) = record.fields.get(source) {
                        values[*column] = coerce_scalar(raw, *kind, source);
                    }
                }
                CompiledRule::UserAgent {
                    source,
                    browser,
                    os,
                    version,
                    fallback,
                } => {
                    if let Some(raw) = record.fields.get(source) {
                        match user_agent::parse(raw) {
                            Some(parsed) => {
                                values[*browser] = Some(ScalarValue::Utf8(parsed.browser));
                                values[*os] = Some(ScalarValue::Utf8(parsed.os));
                                values[*version] = Some(ScalarValue::Int64(parsed.version));
                            }
                            None => {
                                values[*fallback] = Some(ScalarValue::Utf8(raw.to_string()));
                            }
                        }
                    }
                }
            }
        }

        let residual: Fields = record
            .fields
            .iter()
            .filter(|(key, _)| !self.bound_keys.contains(*key))
            .collect();

        MappedRecord::new(values, residual)
    }
}

fn column_kind(schema: &TableSchema, column: &str) -> Result<ScalarKind> {
    let index = schema
        .column_index(column)
        .ok_or_else(|| Error::Config(format!("mapping rule targets unknown column '{column}'")))?;
    Ok(schema.columns()[index].kind())
}

fn resolve_column(
    schema: &TableSchema,
    column: &str,
    expected: ScalarKind,
    bound_columns: &mut HashSet<usize>,
) -> Result<usize> {
    let index = schema
        .column_index(column)
        .ok_or_else(|| Error::Config(format!("mapping rule targets unknown column '{column}'")))?;
    let declared = schema.columns()[index].kind();
    if declared != expected {
        return Err(Error::Config(format!(
            "column '{column}' is {declared} but the rule produces {expected}"
        )));
    }
    if !bound_columns.insert(index) {
        return Err(Error::Config(format!(
            "column '{column}' is bound by more than one rule"
        )));
    }
    Ok(index)
}

fn coerce_scalar(raw: &str, kind: ScalarKind, source: &str) -> Option<ScalarValue> {
    match kind {
        ScalarKind::Utf8 => Some(ScalarValue::Utf8(raw.to_string())),
        ScalarKind::Int64 => match raw.parse::<i64>() {
            Ok(value) => Some(ScalarValue::Int64(value)),
            Err(_) => {
                tracing::debug!(field = %source, value = %raw, "integer coercion failed, null-filling column");
                None
            }
        },
    }
}
