//! File access for sheetflow.
//!
//! - [`open_records`] streams [`Record`](sheetflow_types::Record)s out of a
//!   delimited file (`.csv`, `.tsv`, `.txt`) or a workbook (`.xlsx`, `.xlsm`,
//!   `.xlsb`, `.xls`, `.ods`). The first row is the header.
//! - [`export_records`] / [`export_template`] write delimited files back out.
//!
//! Delimited files are read lazily row by row. Workbooks are decoded one sheet
//! at a time by calamine and then handed out row by row.

mod error;
mod export;
mod format;
mod reader;

pub use error::{ReadError, ReadResult, WriteError, WriteResult};
pub use export::{export_records, export_template, ExportSummary};
pub use format::SourceFormat;
pub use reader::{open_records, ReaderOptions, RecordStream};
