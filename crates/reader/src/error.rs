//! Error types for scan and seek operations

use sarg::{PredicateDataType, SargError};
use thiserror::Error;

/// Result type for reader operations
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors that can occur while planning or driving a scan
#[derive(Error, Debug)]
pub enum ReaderError {
    /// Search argument construction, binding or evaluation failed
    #[error("Search argument error: {0}")]
    Sarg(#[from] SargError),

    /// Error with Arrow data structures
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Seek past the end of the file
    #[error("Seek to row {target} is beyond the total row count {total}")]
    OutOfRangeSeek { target: u64, total: u64 },

    /// Failure reported by the stripe source
    #[error("Data access error: {0}")]
    DataAccess(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Checked access to the wrong column vector variant
    #[error("Column kind mismatch: expected {expected}, got {actual}")]
    ColumnKindMismatch {
        expected: PredicateDataType,
        actual: PredicateDataType,
    },

    /// Missing column
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Zero capacity, ragged columns or a batch that disagrees with its schema
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// Arrow type with no predicate counterpart
    #[error("Unsupported column type for {column}: {data_type}")]
    UnsupportedType { column: String, data_type: String },
}

impl ReaderError {
    /// Wraps a collaborator failure
    pub fn data_access(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ReaderError::DataAccess(err.into())
    }
}
