//! logs2records - Project event records into partitioned Arrow RecordBatches
//!
//! This crate provides synchronous, schema-driven transformation of
//! semi-structured event records (fixed attributes plus a dynamic field map)
//! into Arrow RecordBatches routed by hierarchical partition path.
//!
//! # Design Principles
//!
//! - **No I/O**: Core never touches network or filesystem
//! - **No async**: Pure synchronous transforms
//! - **Arrow-native**: RecordBatch is the canonical output format
//! - **Per-record failure isolation**: One bad record never aborts a batch
//!
//! # High-level API
//!
//! The simplest way to use this crate is the built-in request-summary
//! pipeline:
//!
//! ```ignore
//! use logs2records::{decode_records, request_summary_pipeline, Predicate};
//!
//! let pipeline = request_summary_pipeline(Predicate::always())?;
//! let records = decode_records(ndjson_bytes)?;
//!
//! let output = pipeline.process_batch(&records)?;
//! for batch in output.into_iter() {
//!     // batch.path, batch.batch, batch.record_count are available
//!     println!("{}: {} records", batch.path, batch.record_count);
//! }
//! ```
//!
//! # Lower-level API
//!
//! For more control over individual pipeline stages:
//!
//! ```ignore
//! use logs2records::{mapped_to_arrow, FieldProjector, PartitionKeyBuilder, Predicate};
//!
//! // Step 1: Decide inclusion
//! if predicate.evaluate(&record)? {
//!     // Step 2: Project dynamic fields into typed columns
//!     let mapped = projector.project(&record);
//!
//!     // Step 3: Validate and encode
//!     let batch = mapped_to_arrow(&[mapped], &schema)?;
//!
//!     // Step 4: Derive the partition path
//!     let path = partitioner.build_path(&record)?;
//! }
//! ```

pub mod arrow;
pub mod decode;
pub mod error;
pub mod output;
pub mod partition;
pub mod predicate;
pub mod project;
pub mod record;
pub mod schema;
pub mod summary;

use std::sync::Arc;

use ::arrow::record_batch::RecordBatch;
use indexmap::IndexMap;

pub use crate::arrow::{
    mapped_to_arrow, validate, PartitionedBatch, PartitionedBatches, RecordFailure,
};
pub use decode::{decode_record, decode_records};
pub use error::{Error, Result};
pub use output::{to_ipc, to_json};
#[cfg(feature = "parquet")]
pub use output::{to_parquet, to_parquet_bytes, write_parquet};
pub use partition::{DimensionSource, PartitionDimension, PartitionKeyBuilder, PartitionPath};
pub use predicate::{CompareOp, FieldRef, Predicate};
pub use project::{FieldProjector, MappedRecord, MappingRule, UserAgent};
pub use record::{Attribute, Fields, Record};
pub use schema::{Column, Nullability, ScalarKind, ScalarValue, TableSchema};
pub use summary::{
    request_summary_dimensions, request_summary_pipeline, request_summary_rules,
    request_summary_schema, REQUEST_SUMMARY_TYPE,
};

use crate::arrow::{encode_partitions, PartitionGroup};

// ============================================================================
// Pipeline types
// ============================================================================

/// Output of processing one record: the encoded single-row batch plus the
/// partition path it routes to.
#[derive(Debug, Clone)]
pub struct ProcessedRecord {
    /// Single-row RecordBatch holding the encoded record
    pub batch: RecordBatch,
    /// Partition path the record routes to
    pub path: PartitionPath,
}

/// The per-record projection and partitioning pipeline.
///
/// Composes the four stages over immutable configuration:
/// predicate, projector, validate/encode, partition path. All configuration
/// is read-only after construction, so a `&Pipeline` may be shared across
/// threads and records processed concurrently without locking.
#[derive(Debug, Clone)]
pub struct Pipeline {
    predicate: Predicate,
    projector: FieldProjector,
    partitioner: PartitionKeyBuilder,
    schema: Arc<TableSchema>,
}

// ============================================================================
// Pipeline
// ============================================================================

impl Pipeline {
    /// Assemble a pipeline from its immutable configuration.
    ///
    /// # Arguments
    ///
    /// * `predicate` - Inclusion predicate, already composed with any base
    /// * `schema` - Declared output columns plus the residual map column
    /// * `rules` - Mapping rules binding schema columns to record sources
    /// * `dimensions` - Partition dimensions, in path order
    ///
    /// # Returns
    ///
    /// The pipeline, or [`Error::Config`] when a rule references an unknown
    /// column, binds a column twice, or disagrees with its column's kind.
    pub fn new(
        predicate: Predicate,
        schema: TableSchema,
        rules: Vec<MappingRule>,
        dimensions: Vec<PartitionDimension>,
    ) -> Result<Self> {
        let projector = FieldProjector::new(&schema, rules)?;
        Ok(Pipeline {
            predicate,
            projector,
            partitioner: PartitionKeyBuilder::new(dimensions),
            schema: Arc::new(schema),
        })
    }

    /// The schema this pipeline encodes against.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Process one record through all four stages.
    ///
    /// Returns `Ok(None)` when the predicate rejects the record; projection
    /// never runs in that case. Otherwise the record is projected, validated,
    /// encoded as a single-row batch, and paired with its partition path.
    ///
    /// # Errors
    ///
    /// * [`Error::Predicate`] when a comparison cannot reconcile its types
    /// * [`Error::MissingRequiredColumn`] when a required column is null
    /// * [`Error::PartitionDimensionMissing`] when a dimension's source value
    ///   is absent; validation runs first, so a record failing both reports
    ///   the missing column
    ///
    /// # Example
    ///
    /// ```ignore
    /// use logs2records::{request_summary_pipeline, Predicate};
    ///
    /// let pipeline = request_summary_pipeline(Predicate::always())?;
    /// if let Some(processed) = pipeline.process(&record)? {
    ///     sink.write(&processed.path, &processed.batch)?;
    /// }
    /// ```
    pub fn process(&self, record: &Record) -> Result<Option<ProcessedRecord>> {
        match self.stage_record(record)? {
            Some((path, mapped)) => {
                let batch = mapped_to_arrow(std::slice::from_ref(&mapped), &self.schema)?;
                Ok(Some(ProcessedRecord { batch, path }))
            }
            None => Ok(None),
        }
    }

    /// Process a batch of records, grouping accepted ones by partition path.
    ///
    /// Failures are isolated per record: a record that fails predicate
    /// evaluation, validation, or dimension resolution lands in the output's
    /// `failures` with its input index, and processing continues with the
    /// next record. Records the predicate turns away are only counted.
    ///
    /// # Arguments
    ///
    /// * `records` - Decoded records, in input order
    ///
    /// # Returns
    ///
    /// One encoded RecordBatch per distinct partition path, ordered by first
    /// occurrence, along with rejection and failure accounting.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use logs2records::{request_summary_pipeline, Predicate};
    ///
    /// let pipeline = request_summary_pipeline(Predicate::always())?;
    /// let output = pipeline.process_batch(&records)?;
    /// for batch in output.into_iter() {
    ///     println!("{}: {} records", batch.path, batch.record_count);
    /// }
    /// ```
    pub fn process_batch(&self, records: &[Record]) -> Result<PartitionedBatches> {
        let mut groups: IndexMap<PartitionPath, PartitionGroup> = IndexMap::new();
        let mut total_records = 0usize;
        let mut rejected = 0usize;
        let mut failures = Vec::new();

        for (index, record) in records.iter().enumerate() {
            match self.stage_record(record) {
                Ok(Some((path, mapped))) => {
                    total_records += 1;
                    groups
                        .entry(path)
                        .or_default()
                        .push(mapped, record.timestamp);
                }
                Ok(None) => rejected += 1,
                Err(error) => {
                    tracing::warn!(index, %error, "record dropped");
                    failures.push(RecordFailure { index, error });
                }
            }
        }

        let batches = encode_partitions(groups, &self.schema)?;
        tracing::debug!(
            total_records,
            rejected,
            failed = failures.len(),
            partitions = batches.len(),
            "batch processed"
        );

        Ok(PartitionedBatches {
            batches,
            total_records,
            rejected,
            failures,
        })
    }

    /// Run predicate, projection, validation, and path resolution for one
    /// record without encoding it.
    fn stage_record(&self, record: &Record) -> Result<Option<(PartitionPath, MappedRecord)>> {
        if !self.predicate.evaluate(record)? {
            tracing::debug!("record rejected by predicate");
            return Ok(None);
        }

        let mapped = self.projector.project(record);
        validate(&mapped, &self.schema)?;
        let path = self.partitioner.build_path(record)?;

        Ok(Some((path, mapped)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ::arrow::array::{Array, Int64Array, MapArray, StringArray};

    fn request_record() -> Record {
        Record::new(145_767_775_123_456_789)
            .with_type("request.summary")
            .with_hostname("web-1")
            .with_logger("nginx")
            .with_env_version("1.0")
            .with_severity(6)
            .with_pid(4321)
            .with_field("Type", "request.summary")
            .with_field("Date", "2024-01-01")
            .with_field("Hour", "05")
            .with_field("method", "GET")
            .with_field("path", "/index.html")
            .with_field("rid", "abc123")
            .with_field("errno", "0")
            .with_field("t", "250")
    }

    fn pipeline() -> Pipeline {
        request_summary_pipeline(Predicate::always()).unwrap()
    }

    fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> &'a StringArray {
        batch
            .column_by_name(name)
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
    }

    fn int_column<'a>(batch: &'a RecordBatch, name: &str) -> &'a Int64Array {
        batch
            .column_by_name(name)
            .unwrap()
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap()
    }

    #[test]
    fn test_process_accepted_record() {
        let processed = pipeline().process(&request_record()).unwrap().unwrap();

        assert_eq!(
            processed.path.to_string(),
            "request.summary/request.summary/2024-01-01/05"
        );

        let batch = &processed.batch;
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.num_columns(), 19);

        assert_eq!(
            int_column(batch, "Timestamp").value(0),
            145_767_775_123_456_789
        );
        assert_eq!(string_column(batch, "fields_method").value(0), "GET");
        assert_eq!(string_column(batch, "fields_path").value(0), "/index.html");
        assert_eq!(int_column(batch, "fields_t").value(0), 250);
        assert!(string_column(batch, "fields_lang").is_null(0));
    }

    #[test]
    fn test_partition_sources_stay_residual() {
        let processed = pipeline().process(&request_record()).unwrap().unwrap();

        // Type, Date, and Hour have no mapping rule, so they remain in the
        // residual map even though partitioning reads them.
        let map = processed
            .batch
            .column_by_name("fields")
            .unwrap()
            .as_any()
            .downcast_ref::<MapArray>()
            .unwrap();
        assert_eq!(map.value(0).len(), 3);
    }

    #[test]
    fn test_process_rejected_record() {
        let record = request_record().with_field("Type", "request.other");
        assert!(pipeline().process(&record).unwrap().is_none());
    }

    #[test]
    fn test_rejected_record_skips_later_stages() {
        // Missing Timestamp would fail validation, but the predicate turns
        // the record away first, so no error surfaces.
        let mut record = request_record().with_field("Type", "request.other");
        record.timestamp = None;

        assert!(matches!(pipeline().process(&record), Ok(None)));
    }

    #[test]
    fn test_missing_timestamp_fails_validation() {
        let mut record = request_record();
        record.timestamp = None;

        let err = pipeline().process(&record).unwrap_err();
        match err {
            Error::MissingRequiredColumn { column } => assert_eq!(column, "Timestamp"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_dimension_fails_after_validation() {
        let record = Record::new(1000)
            .with_type("request.summary")
            .with_field("Type", "request.summary")
            .with_field("Date", "2024-01-01");

        let err = pipeline().process(&record).unwrap_err();
        match err {
            Error::PartitionDimensionMissing { dimension } => assert_eq!(dimension, "hour"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_outranks_dimension_resolution() {
        // Both Timestamp and Hour are missing; the validation error wins.
        let mut record = request_record();
        record.timestamp = None;
        let record = Record {
            fields: vec![("Type", "request.summary"), ("Date", "2024-01-01")]
                .into_iter()
                .collect(),
            ..record
        };

        let err = pipeline().process(&record).unwrap_err();
        assert!(matches!(err, Error::MissingRequiredColumn { .. }));
    }

    #[test]
    fn test_process_batch_groups_by_path() {
        let mut day_two = request_record();
        day_two.fields.insert("Date", "2024-01-02");

        let mut early = request_record();
        early.timestamp = Some(1000);

        let rejected = request_record().with_field("Type", "request.other");

        let mut no_hour = request_record();
        no_hour.fields = vec![("Type", "request.summary"), ("Date", "2024-01-01")]
            .into_iter()
            .collect();

        let records = vec![
            request_record(), // 2024-01-01
            day_two,          // 2024-01-02
            early,            // 2024-01-01, smallest timestamp
            rejected,
            no_hour,
        ];

        let output = pipeline().process_batch(&records).unwrap();

        assert_eq!(output.len(), 2);
        assert_eq!(output.total_records, 3);
        assert_eq!(output.rejected, 1);
        assert!(output.has_failures());
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].index, 4);
        assert!(matches!(
            output.failures[0].error,
            Error::PartitionDimensionMissing { .. }
        ));

        // Groups are ordered by first occurrence.
        assert_eq!(
            output.batches[0].path.to_string(),
            "request.summary/request.summary/2024-01-01/05"
        );
        assert_eq!(output.batches[0].record_count, 2);
        assert_eq!(output.batches[0].min_timestamp_ns, 1000);

        assert_eq!(
            output.batches[1].path.to_string(),
            "request.summary/request.summary/2024-01-02/05"
        );
        assert_eq!(output.batches[1].record_count, 1);
    }

    #[test]
    fn test_process_batch_empty_input() {
        let output = pipeline().process_batch(&[]).unwrap();
        assert!(output.is_empty());
        assert_eq!(output.total_records, 0);
        assert_eq!(output.rejected, 0);
        assert!(!output.has_failures());
    }

    #[test]
    fn test_pipeline_rejects_bad_rules() {
        let schema = request_summary_schema();
        let mut rules = request_summary_rules();
        rules.push(MappingRule::field("no_such_column", "x"));

        let err = Pipeline::new(
            Predicate::always(),
            schema,
            rules,
            request_summary_dimensions(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
