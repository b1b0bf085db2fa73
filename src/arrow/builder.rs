//! Arrow RecordBatch building and validation.
//!
//! Converts mapped records to Arrow RecordBatches using schema-driven
//! building: one typed column per declared schema column, in declared order,
//! plus the trailing residual map column.

use arrow::array::{ArrayRef, Int64Builder, MapBuilder, MapFieldNames, StringBuilder};
use arrow::datatypes::{DataType, Field};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::project::MappedRecord;
use crate::schema::{
    ScalarKind, ScalarValue, TableSchema, MAP_ENTRY_NAME, MAP_KEY_NAME, MAP_VALUE_NAME,
};

/// Check a mapped record against the schema without encoding it.
///
/// Batch callers run this per record before grouping so one bad record
/// cannot poison a whole partition's batch.
///
/// # Errors
///
/// * [`Error::Config`] when the value count does not match the schema.
/// * [`Error::MissingRequiredColumn`] when a required column is null.
/// * [`Error::ColumnType`] when a value's kind contradicts its column.
pub fn validate(mapped: &MappedRecord, schema: &TableSchema) -> Result<()> {
    let columns = schema.columns();
    if mapped.values().len() != columns.len() {
        return Err(Error::Config(format!(
            "mapped record has {} values but the schema declares {} columns",
            mapped.values().len(),
            columns.len()
        )));
    }
    for (column, value) in columns.iter().zip(mapped.values()) {
        match value {
            Some(value) if value.kind() != column.kind() => {
                return Err(Error::ColumnType {
                    column: column.name().to_string(),
                    expected: column.kind(),
                });
            }
            None if column.is_required() => {
                return Err(Error::MissingRequiredColumn {
                    column: column.name().to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Convert a slice of mapped records to an Arrow RecordBatch.
///
/// Every record is validated before any value is appended. Columns are
/// built in the schema's declared order; the residual map column is built
/// last, preserving each record's field insertion order.
///
/// # Arguments
///
/// * `records` - Mapped records to encode, one row each
/// * `schema` - The table schema the records were projected against
///
/// # Returns
///
/// A RecordBatch with one column per declared schema column plus the map
/// column, or the first validation error encountered.
pub fn mapped_to_arrow(records: &[MappedRecord], schema: &TableSchema) -> Result<RecordBatch> {
    for record in records {
        validate(record, schema)?;
    }

    let num_rows = records.len();
    let columns = schema.columns();

    // Pre-allocate column builders based on declared kinds
    let mut builders: Vec<ColumnBuilder> = columns
        .iter()
        .map(|column| ColumnBuilder::new(column.kind(), num_rows))
        .collect();
    let mut map_builder = residual_map_builder(num_rows);

    for record in records {
        for (idx, column) in columns.iter().enumerate() {
            builders[idx].append(column.name(), record.value(idx))?;
        }
        for (key, value) in record.residual().iter() {
            map_builder.keys().append_value(key);
            map_builder.values().append_value(value);
        }
        map_builder.append(true)?;
    }

    let mut arrays: Vec<ArrayRef> = builders.into_iter().map(ColumnBuilder::finish).collect();
    arrays.push(Arc::new(map_builder.finish()));

    RecordBatch::try_new(Arc::new(schema.to_arrow()), arrays).map_err(Error::from)
}

fn residual_map_builder(capacity: usize) -> MapBuilder<StringBuilder, StringBuilder> {
    let field_names = MapFieldNames {
        entry: MAP_ENTRY_NAME.to_string(),
        key: MAP_KEY_NAME.to_string(),
        value: MAP_VALUE_NAME.to_string(),
    };
    // Keys are non-nullable by construction; the values field must be
    // declared non-nullable explicitly to match the schema.
    MapBuilder::with_capacity(
        Some(field_names),
        StringBuilder::new(),
        StringBuilder::new(),
        capacity,
    )
    .with_values_field(Field::new(MAP_VALUE_NAME, DataType::Utf8, false))
}

/// Internal builder enum for the two scalar column kinds.
///
/// This allows dynamic column building based on schema without generics.
enum ColumnBuilder {
    Int64(Int64Builder),
    String(StringBuilder),
}

impl ColumnBuilder {
    fn new(kind: ScalarKind, capacity: usize) -> Self {
        match kind {
            ScalarKind::Int64 => ColumnBuilder::Int64(Int64Builder::with_capacity(capacity)),
            ScalarKind::Utf8 => {
                ColumnBuilder::String(StringBuilder::with_capacity(capacity, capacity * 32))
            }
        }
    }

    fn append(&mut self, column: &str, value: Option<&ScalarValue>) -> Result<()> {
        match (self, value) {
            (ColumnBuilder::Int64(builder), Some(ScalarValue::Int64(v))) => {
                builder.append_value(*v);
                Ok(())
            }
            (ColumnBuilder::Int64(builder), None) => {
                builder.append_null();
                Ok(())
            }
            (ColumnBuilder::Int64(_), Some(_)) => Err(Error::ColumnType {
                column: column.to_string(),
                expected: ScalarKind::Int64,
            }),
            (ColumnBuilder::String(builder), Some(ScalarValue::Utf8(v))) => {
                builder.append_value(v);
                Ok(())
            }
            (ColumnBuilder::String(builder), None) => {
                builder.append_null();
                Ok(())
            }
            (ColumnBuilder::String(_), Some(_)) => Err(Error::ColumnType {
                column: column.to_string(),
                expected: ScalarKind::Utf8,
            }),
        }
    }

    fn finish(self) -> ArrayRef {
        match self {
            ColumnBuilder::Int64(mut builder) => Arc::new(builder.finish()),
            ColumnBuilder::String(mut builder) => Arc::new(builder.finish()),
        }
    }
}
