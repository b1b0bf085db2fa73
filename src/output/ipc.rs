//! Arrow IPC output serialization
//!
//! Serializes Arrow RecordBatches to the Arrow IPC streaming format for
//! cross-language interop and zero-copy readers.

use arrow::array::RecordBatch;
use arrow::ipc::writer::StreamWriter;

use crate::error::Result;

/// Serialize a RecordBatch to the Arrow IPC streaming format
///
/// Produces a complete IPC stream in memory: schema message, one record
/// batch message, and the end-of-stream marker.
///
/// # Arguments
///
/// * `batch` - The RecordBatch to serialize
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - The IPC stream as bytes
/// * `Err(Error)` - If serialization fails
///
/// # Example
///
/// ```ignore
/// use arrow::array::RecordBatch;
/// use logs2records::output::to_ipc;
///
/// let batch: RecordBatch = /* create batch */;
/// let ipc_bytes = to_ipc(&batch)?;
/// ```
pub fn to_ipc(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut writer = StreamWriter::try_new(Vec::new(), &batch.schema())?;
    writer.write(batch)?;
    writer.finish()?;
    Ok(writer.into_inner()?)
}
