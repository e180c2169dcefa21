//! Error types for reading and writing files.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for reading.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type for writing.
pub type WriteResult<T> = Result<T, WriteError>;

/// A file that cannot be opened or parsed.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The file is missing or unreadable.
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension not recognised as a delimited file or workbook.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A row that the delimited parser rejects.
    #[error("malformed row at line {line}: {message}")]
    Malformed { line: u64, message: String },

    /// Delimited parser error without a row position.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook decoding error from calamine.
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    /// The requested sheet does not exist.
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// The workbook has no sheets at all.
    #[error("workbook has no sheets")]
    EmptyWorkbook,
}

/// A file that cannot be written.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook writer error from rust_xlsxwriter.
    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// More columns than a worksheet can hold.
    #[error("too many columns for a worksheet: {0}")]
    TooManyColumns(usize),

    /// Delimited files and `.xlsx` can be written; other workbook formats cannot.
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}
