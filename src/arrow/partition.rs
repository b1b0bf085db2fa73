//! Partition output types for encoded RecordBatches.
//!
//! Records are grouped by partition path before encoding, so dimensions
//! sourced from residual fields participate in routing even though they
//! never become typed columns.

use arrow::record_batch::RecordBatch;
use indexmap::IndexMap;

use crate::arrow::builder::mapped_to_arrow;
use crate::error::{Error, Result};
use crate::partition::PartitionPath;
use crate::project::MappedRecord;
use crate::schema::TableSchema;

/// A RecordBatch with partition metadata for storage routing.
///
/// Contains the batch data along with pre-extracted metadata needed
/// for partitioned storage paths.
#[derive(Debug, Clone)]
pub struct PartitionedBatch {
    /// Partition path the batch belongs under
    pub path: PartitionPath,
    /// The Arrow RecordBatch containing the partition's records
    pub batch: RecordBatch,
    /// Number of records in this batch
    pub record_count: usize,
    /// Minimum record timestamp in nanoseconds (0 when no record carried one)
    pub min_timestamp_ns: i64,
}

/// A record that failed mid-batch, with its input position.
#[derive(Debug)]
pub struct RecordFailure {
    /// Zero-based index of the record in the input slice
    pub index: usize,
    /// The error that stopped it
    pub error: Error,
}

/// Multiple batches grouped by partition path.
///
/// This is the primary output type of batch processing. Batches are
/// ordered by first occurrence of each path in the input.
#[derive(Debug, Default)]
pub struct PartitionedBatches {
    /// Encoded batches keyed by partition path, in insertion order
    pub batches: Vec<PartitionedBatch>,
    /// Number of records encoded across all batches
    pub total_records: usize,
    /// Number of records the predicate filtered out
    pub rejected: usize,
    /// Records that failed projection or validation, with their input index
    pub failures: Vec<RecordFailure>,
}

impl PartitionedBatches {
    /// Iterate over (path, batch) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&PartitionPath, &RecordBatch)> {
        self.batches.iter().map(|pb| (&pb.path, &pb.batch))
    }

    /// Consume and iterate over partitioned batches
    pub fn into_iter(self) -> impl Iterator<Item = PartitionedBatch> {
        self.batches.into_iter()
    }

    /// Check if no batch was produced
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Number of partition groups
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Whether any record failed projection or validation
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Rows destined for one partition, accumulated before encoding.
#[derive(Debug, Default)]
pub(crate) struct PartitionGroup {
    records: Vec<MappedRecord>,
    min_timestamp_ns: Option<i64>,
}

impl PartitionGroup {
    pub(crate) fn push(&mut self, record: MappedRecord, timestamp_ns: Option<i64>) {
        self.records.push(record);
        self.min_timestamp_ns = match (self.min_timestamp_ns, timestamp_ns) {
            (Some(current), Some(ts)) => Some(current.min(ts)),
            (current, ts) => current.or(ts),
        };
    }
}

/// Encode one RecordBatch per accumulated partition group.
///
/// Groups keep their insertion order, so batch order follows the first
/// occurrence of each path in the input.
pub(crate) fn encode_partitions(
    groups: IndexMap<PartitionPath, PartitionGroup>,
    schema: &TableSchema,
) -> Result<Vec<PartitionedBatch>> {
    groups
        .into_iter()
        .map(|(path, group)| {
            let batch = mapped_to_arrow(&group.records, schema)?;
            Ok(PartitionedBatch {
                record_count: batch.num_rows(),
                min_timestamp_ns: group.min_timestamp_ns.unwrap_or(0),
                path,
                batch,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Fields;
    use crate::schema::{Column, ScalarKind, ScalarValue};

    fn test_schema() -> TableSchema {
        TableSchema::new(
            vec![
                Column::required("Timestamp", ScalarKind::Int64),
                Column::optional("Hostname", ScalarKind::Utf8),
            ],
            "fields",
        )
        .unwrap()
    }

    fn mapped(timestamp: i64, hostname: &str) -> MappedRecord {
        MappedRecord::new(
            vec![
                Some(ScalarValue::Int64(timestamp)),
                Some(ScalarValue::Utf8(hostname.to_string())),
            ],
            Fields::new(),
        )
    }

    fn path(segments: &[&str]) -> PartitionPath {
        PartitionPath::new(segments.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_encode_partitions_preserves_group_order() {
        let mut groups: IndexMap<PartitionPath, PartitionGroup> = IndexMap::new();
        groups
            .entry(path(&["request.summary", "2024-01-01"]))
            .or_default()
            .push(mapped(200, "a"), Some(200));
        groups
            .entry(path(&["request.other", "2024-01-01"]))
            .or_default()
            .push(mapped(100, "b"), Some(100));
        groups
            .entry(path(&["request.summary", "2024-01-01"]))
            .or_default()
            .push(mapped(50, "c"), Some(50));

        let batches = encode_partitions(groups, &test_schema()).unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].path, path(&["request.summary", "2024-01-01"]));
        assert_eq!(batches[0].record_count, 2);
        assert_eq!(batches[0].min_timestamp_ns, 50);
        assert_eq!(batches[1].path, path(&["request.other", "2024-01-01"]));
        assert_eq!(batches[1].record_count, 1);
        assert_eq!(batches[1].min_timestamp_ns, 100);
    }

    #[test]
    fn test_min_timestamp_defaults_to_zero() {
        let mut groups: IndexMap<PartitionPath, PartitionGroup> = IndexMap::new();
        let record = MappedRecord::new(vec![Some(ScalarValue::Int64(1)), None], Fields::new());
        groups.entry(path(&["a"])).or_default().push(record, None);

        let batches = encode_partitions(groups, &test_schema()).unwrap();
        assert_eq!(batches[0].min_timestamp_ns, 0);
    }

    #[test]
    fn test_partitioned_batches_accessors() {
        let mut groups: IndexMap<PartitionPath, PartitionGroup> = IndexMap::new();
        groups
            .entry(path(&["a"]))
            .or_default()
            .push(mapped(1, "x"), Some(1));
        let batches = encode_partitions(groups, &test_schema()).unwrap();

        let result = PartitionedBatches {
            total_records: 1,
            batches,
            rejected: 2,
            failures: Vec::new(),
        };

        assert_eq!(result.len(), 1);
        assert!(!result.is_empty());
        assert!(!result.has_failures());
        let pairs: Vec<_> = result.iter().collect();
        assert_eq!(pairs[0].0, &path(&["a"]));
        assert_eq!(pairs[0].1.num_rows(), 1);
    }
}
