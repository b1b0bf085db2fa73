//! Parquet output serialization
//!
//! Turns a partition's RecordBatch into a single in-memory Parquet file.
//! Only compiled when the `parquet` feature is enabled.

use std::io::{Cursor, Write};

use arrow::array::RecordBatch;
use arrow::error::ArrowError;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;

use crate::error::{Error, Result};

fn parquet_err(e: ParquetError) -> Error {
    Error::Arrow(ArrowError::ExternalError(Box::new(e)))
}

/// Stream a RecordBatch as Parquet into any writer
///
/// The core streaming entry point: writes straight into a caller-supplied
/// `std::io::Write` (a file, a network stream, a compression wrapper), so no
/// intermediate buffer is needed when the sink already has one.
///
/// # Arguments
///
/// * `batch` - The partition batch to serialize
/// * `writer` - Destination implementing `std::io::Write + Send`
/// * `props` - Writer properties; `None` means uncompressed defaults
///
/// # Returns
///
/// `Ok(())` on success, or the underlying writer error wrapped as
/// [`crate::Error::Arrow`].
///
/// # Example
///
/// ```ignore
/// use logs2records::output::write_parquet;
/// use std::fs::File;
///
/// let file = File::create("part-00000.parquet")?;
/// write_parquet(&partitioned.batch, file, None)?;
/// ```
pub fn write_parquet<W: Write + Send>(
    batch: &RecordBatch,
    writer: W,
    props: Option<WriterProperties>,
) -> Result<()> {
    let props = props.unwrap_or_else(|| {
        WriterProperties::builder()
            .set_compression(Compression::UNCOMPRESSED)
            .build()
    });

    let mut arrow_writer =
        ArrowWriter::try_new(writer, batch.schema(), Some(props)).map_err(parquet_err)?;
    arrow_writer.write(batch).map_err(parquet_err)?;
    arrow_writer.close().map_err(parquet_err)?;

    Ok(())
}

/// Serialize a RecordBatch to an in-memory Parquet file
///
/// Convenience wrapper around [`write_parquet`] that collects the output into
/// a `Vec<u8>` (uncompressed by default), ready to hand to an object-store
/// client under the batch's partition path.
///
/// # Arguments
///
/// * `batch` - The partition batch to serialize
///
/// # Returns
///
/// The complete Parquet file as bytes, or the first serialization error.
///
/// # Example
///
/// ```ignore
/// use logs2records::output::to_parquet;
///
/// let bytes = to_parquet(&partitioned.batch)?;
/// std::fs::write("part-00000.parquet", bytes)?;
/// ```
pub fn to_parquet(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    write_parquet(batch, &mut buffer, None)?;
    Ok(buffer.into_inner())
}

/// Serialize a RecordBatch to Parquet, returning `bytes::Bytes`
///
/// Same output as [`to_parquet`], in the cheaply-cloneable form storage
/// clients usually want.
pub fn to_parquet_bytes(batch: &RecordBatch) -> Result<Bytes> {
    let vec = to_parquet(batch)?;
    Ok(Bytes::from(vec))
}
