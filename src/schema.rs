//! Output table schema definitions.
//!
//! A [`TableSchema`] is an ordered list of typed, nullable scalar columns plus
//! exactly one trailing map column that captures dynamic keys not bound to any
//! named column. Schemas are built once at startup and shared read-only across
//! record processing.

use std::fmt;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema};

use crate::error::{Error, Result};

/// Entry struct name used by the residual map column.
pub(crate) const MAP_ENTRY_NAME: &str = "key_value";
/// Key field name inside a residual map entry.
pub(crate) const MAP_KEY_NAME: &str = "key";
/// Value field name inside a residual map entry.
pub(crate) const MAP_VALUE_NAME: &str = "value";

// ============================================================================
// Scalar types
// ============================================================================

/// Scalar type a named column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// 64-bit signed integer.
    Int64,
    /// UTF-8 string.
    Utf8,
}

impl ScalarKind {
    /// The Arrow data type this scalar kind maps to.
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarKind::Int64 => DataType::Int64,
            ScalarKind::Utf8 => DataType::Utf8,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Int64 => write!(f, "int64"),
            ScalarKind::Utf8 => write!(f, "utf8"),
        }
    }
}

/// A single typed column value.
///
/// Optional columns are carried as `Option<ScalarValue>`; `None` encodes as an
/// Arrow null. There are no sentinel values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    /// 64-bit signed integer value.
    Int64(i64),
    /// UTF-8 string value.
    Utf8(String),
}

impl ScalarValue {
    /// The scalar kind of this value.
    pub fn kind(&self) -> ScalarKind {
        match self {
            ScalarValue::Int64(_) => ScalarKind::Int64,
            ScalarValue::Utf8(_) => ScalarKind::Utf8,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::Utf8(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int64(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Utf8(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Utf8(v)
    }
}

// ============================================================================
// Columns
// ============================================================================

/// Whether a column tolerates null values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    /// A null value is a validation error.
    Required,
    /// Null is a legal encoded value.
    Optional,
}

/// One named, typed, ordered output column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    kind: ScalarKind,
    nullability: Nullability,
}

impl Column {
    /// Create a column that must be non-null in every encoded record.
    pub fn required(name: impl Into<String>, kind: ScalarKind) -> Self {
        Column {
            name: name.into(),
            kind,
            nullability: Nullability::Required,
        }
    }

    /// Create a column that encodes null when no value is available.
    pub fn optional(name: impl Into<String>, kind: ScalarKind) -> Self {
        Column {
            name: name.into(),
            kind,
            nullability: Nullability::Optional,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared scalar kind.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Declared nullability.
    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    /// True when a null value in this column is a validation error.
    pub fn is_required(&self) -> bool {
        self.nullability == Nullability::Required
    }
}

// ============================================================================
// Table schema
// ============================================================================

/// Ordered column list plus the trailing residual map column.
///
/// Column order is the declared encode order; the map column always
/// serializes last. Names are unique across the named columns and the map
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    columns: Vec<Column>,
    map_column: String,
}

impl TableSchema {
    /// Build a schema from ordered named columns and the residual map column
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a column name is empty or duplicated,
    /// or when the map column name collides with a named column.
    pub fn new(columns: Vec<Column>, map_column: impl Into<String>) -> Result<Self> {
        let map_column = map_column.into();
        if map_column.is_empty() {
            return Err(Error::Config("map column name is empty".to_string()));
        }
        for (i, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(Error::Config(format!("column {i} has an empty name")));
            }
            if column.name == map_column {
                return Err(Error::Config(format!(
                    "column '{}' collides with the map column",
                    column.name
                )));
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::Config(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        Ok(TableSchema {
            columns,
            map_column,
        })
    }

    /// Ordered named columns, excluding the map column.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Name of the trailing residual map column.
    pub fn map_column(&self) -> &str {
        &self.map_column
    }

    /// Position of a named column, if declared.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Derive the Arrow schema: one field per named column in declared order,
    /// then the residual map column with non-null string keys and values.
    pub fn to_arrow(&self) -> Schema {
        let mut fields: Vec<Field> = Vec::with_capacity(self.columns.len() + 1);
        for column in &self.columns {
            fields.push(Field::new(
                &column.name,
                column.kind.data_type(),
                !column.is_required(),
            ));
        }
        fields.push(Field::new_map(
            &self.map_column,
            MAP_ENTRY_NAME,
            Arc::new(Field::new(MAP_KEY_NAME, DataType::Utf8, false)),
            Arc::new(Field::new(MAP_VALUE_NAME, DataType::Utf8, false)),
            false,
            false,
        ));
        Schema::new(fields)
    }
}
