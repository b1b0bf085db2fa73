//! JSON output serialization
//!
//! Serializes Arrow RecordBatches to newline-delimited JSON (NDJSON),
//! one record per line.

use arrow::array::RecordBatch;
use arrow::json::LineDelimitedWriter;

use crate::error::Result;

/// Serialize a RecordBatch to NDJSON
///
/// Each row becomes one JSON object on its own line. Null column values are
/// omitted from the object; the residual map column serializes as a nested
/// JSON object.
///
/// # Arguments
///
/// * `batch` - The RecordBatch to serialize
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The NDJSON output as bytes
/// * `Err(Error)` - If serialization fails
///
/// # Example
///
/// ```ignore
/// use arrow::array::RecordBatch;
/// use logs2records::output::to_json;
///
/// let batch: RecordBatch = /* create batch */;
/// let ndjson = to_json(&batch)?;
/// ```
pub fn to_json(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut writer = LineDelimitedWriter::new(Vec::new());
    writer.write_batches(&[batch])?;
    writer.finish()?;
    Ok(writer.into_inner())
}
