//! Batched spreadsheet/CSV import for sheetflow.
//!
//! Rows stream out of a file reader, are grouped into fixed-size batches,
//! validated one batch at a time, optionally augmented with derived columns,
//! and handed to a caller-supplied sink.
//!
//! # Flow
//!
//! ```text
//! reader ──► batch (≤ batch_size) ──► validate ──► augment ──► sink
//!                 ▲                                             │
//!                 └──────────── next batch after flush ─────────┘
//! ```
//!
//! - One batch is in flight at a time; row order is preserved.
//! - The first batch that fails validation aborts the import. Batches
//!   committed before it stay committed.
//! - A [`TransactionalSink`] is wrapped in begin/commit, or rollback on any
//!   failure inside augmentation or persistence.
//! - A job with no sink validates and augments only (dry run).

mod error;
mod importer;
mod job;
mod report;
mod sqlite;
mod transaction;
mod validator;

pub use error::{
    BatchValidationError, ImportError, ImportResult, SinkError, SinkResult, ValidationError,
};
pub use importer::{import, import_records, ImportSummary};
pub use job::{
    ConstantColumns, ImportJob, ImportJobBuilder, PlainSink, RowAugmenter, RuleProvider,
    TransactionalSink, DEFAULT_BATCH_SIZE,
};
pub use report::{summarize_errors, Notification, NotificationLevel, DEFAULT_ERROR_LIMIT};
pub use sqlite::{read_table, SqliteSink};
pub use transaction::TransactionManager;
pub use validator::validate_batch;
