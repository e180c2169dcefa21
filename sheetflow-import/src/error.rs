//! Error types for the import pipeline.

use sheetflow_io::ReadError;
use sheetflow_types::CellValue;
use std::fmt;
use thiserror::Error;

/// Result type for imports.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for sink and augmentation hooks.
pub type SinkResult<T> = Result<T, SinkError>;

/// Why an import stopped.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The source file is missing, unreadable or malformed.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The job definition is unusable; raised before any row is read.
    #[error("invalid import job: {0}")]
    JobDefinition(String),

    /// A batch broke one or more rules. Nothing from this batch reached the sink.
    #[error(transparent)]
    Validation(#[from] BatchValidationError),

    /// Augmentation or persistence failed. Transactional sinks were rolled back.
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Failure raised by a sink, a transaction manager or an augmentation hook.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Begin/commit/rollback failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// Failure reported by caller-supplied code.
    #[error("{0}")]
    Handler(String),

    /// IO error (file sinks).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (file sinks).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SinkError {
    /// Shorthand for a caller-side failure.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

/// One rule violation in one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// 1-based row number within the batch.
    pub row: usize,
    pub column: String,
    /// Offending value, `Null` when the cell was missing.
    pub value: CellValue,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for value ({}) in column {}, in row {}",
            self.message, self.value, self.column, self.row
        )
    }
}

/// Every violation found in the batch that stopped the import.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed in batch {batch} (rows from {first_row}): {} error(s)", errors.len())]
pub struct BatchValidationError {
    /// 0-based batch number.
    pub batch: usize,
    /// 0-based stream offset of the batch's first row.
    pub first_row: usize,
    /// Violations in row-major, then rule-table order.
    pub errors: Vec<ValidationError>,
}

impl BatchValidationError {
    /// Detailed messages, one per violation.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}
