//! Arrow layer for logs2records
//!
//! Provides Arrow RecordBatch construction from mapped records:
//! - Schema-driven RecordBatch builder with a trailing residual map column
//! - Standalone validation of mapped records against a table schema
//! - Partition output types for path-grouped batches

mod builder;
mod partition;

pub use builder::{mapped_to_arrow, validate};
pub use partition::{PartitionedBatch, PartitionedBatches, RecordFailure};

pub(crate) use partition::{encode_partitions, PartitionGroup};
