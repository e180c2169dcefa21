//! Core data model for sheetflow.
//!
//! Every other crate in the workspace speaks in these types:
//! - [`CellValue`]: one scalar cell read from a spreadsheet or CSV file
//! - [`Record`]: one row, an insertion-ordered column → value mapping
//! - [`Batch`]: a bounded, ordered group of records processed as one unit
//!
//! Nothing here performs I/O; readers, validators and sinks live in their
//! own crates.

mod batch;
mod record;
mod value;

pub use batch::Batch;
pub use record::Record;
pub use value::CellValue;
