//! Crate-level error types.
//!
//! Every fallible operation in the crate returns [`Result`]. Failures are
//! per-record: callers drop the offending record, report the error, and
//! continue with the next one.

use arrow::error::ArrowError;
use thiserror::Error;

use crate::schema::ScalarKind;

/// Errors produced while filtering, projecting, encoding, or partitioning
/// records.
#[derive(Debug, Error)]
pub enum Error {
    /// A predicate comparison could not reconcile its operand types.
    #[error("predicate evaluation failed: {0}")]
    Predicate(String),

    /// A required schema column was null at encode time.
    #[error("missing required column: {column}")]
    MissingRequiredColumn {
        /// Name of the column that was null.
        column: String,
    },

    /// A column builder was handed a value of the wrong scalar kind.
    #[error("column '{column}' expects {expected} values")]
    ColumnType {
        /// Name of the mismatched column.
        column: String,
        /// Scalar kind the schema declares for it.
        expected: ScalarKind,
    },

    /// A configured partition dimension resolved to no value.
    #[error("partition dimension missing: {dimension}")]
    PartitionDimensionMissing {
        /// Name of the dimension that could not be resolved.
        dimension: String,
    },

    /// Schema, mapping-rule, or dimension configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Record decoding failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Arrow array or batch construction failed.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
