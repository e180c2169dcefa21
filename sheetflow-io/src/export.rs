//! Delimited file and `.xlsx` export.

use rust_xlsxwriter::{Workbook, Worksheet};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use sheetflow_types::{CellValue, Record};

use crate::error::{WriteError, WriteResult};
use crate::format::SourceFormat;

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub columns: Vec<String>,
    pub rows: usize,
}

/// Writes `records` to `path`, creating parent directories.
///
/// The format follows the extension: delimited for `.csv`/`.tsv`/`.txt`, a
/// single-sheet workbook for `.xlsx`. The header is taken from the first
/// record. Later records write blanks for columns they lack; columns absent
/// from the header are not written.
pub fn export_records<I>(records: I, path: impl AsRef<Path>) -> WriteResult<ExportSummary>
where
    I: IntoIterator<Item = Record>,
{
    let path = path.as_ref();
    let mut writer = TableWriter::create(path)?;
    let mut records = records.into_iter().peekable();

    let columns: Vec<String> = match records.peek() {
        Some(first) => first.columns().map(str::to_string).collect(),
        None => Vec::new(),
    };
    if !columns.is_empty() {
        writer.write_header(&columns)?;
    }

    let mut rows = 0;
    let mut warned_extra = false;
    for record in records {
        if !warned_extra && record.columns().any(|c| !columns.iter().any(|h| h == c)) {
            debug!(path = %path.display(), row = rows, "Dropping columns not present in export header");
            warned_extra = true;
        }
        let cells: Vec<CellValue> = columns
            .iter()
            .map(|column| record.get(column).cloned().unwrap_or_default())
            .collect();
        writer.write_row(&cells)?;
        rows += 1;
    }
    writer.finish()?;

    info!(path = %path.display(), rows, columns = columns.len(), "Exported records");
    Ok(ExportSummary {
        path: path.to_path_buf(),
        columns,
        rows,
    })
}

/// Writes a header-only template with the given columns.
pub fn export_template<S: AsRef<str>>(
    columns: &[S],
    path: impl AsRef<Path>,
) -> WriteResult<ExportSummary> {
    let path = path.as_ref();
    let mut writer = TableWriter::create(path)?;
    let columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
    writer.write_header(&columns)?;
    writer.finish()?;

    info!(path = %path.display(), columns = columns.len(), "Wrote import template");
    Ok(ExportSummary {
        path: path.to_path_buf(),
        columns,
        rows: 0,
    })
}

enum TableWriter {
    Delimited(csv::Writer<File>),
    Xlsx {
        sheet: Worksheet,
        path: PathBuf,
        next_row: u32,
    },
}

impl TableWriter {
    fn create(path: &Path) -> WriteResult<Self> {
        let format = SourceFormat::detect(path)
            .ok_or_else(|| WriteError::UnsupportedFormat(path.display().to_string()))?;
        if format == SourceFormat::Workbook && !has_extension(path, "xlsx") {
            return Err(WriteError::UnsupportedFormat(path.display().to_string()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        match format {
            SourceFormat::Delimited(delimiter) => {
                let file = File::create(path)?;
                Ok(Self::Delimited(
                    csv::WriterBuilder::new().delimiter(delimiter).from_writer(file),
                ))
            }
            SourceFormat::Workbook => Ok(Self::Xlsx {
                sheet: Worksheet::new(),
                path: path.to_path_buf(),
                next_row: 0,
            }),
        }
    }

    fn write_header(&mut self, columns: &[String]) -> WriteResult<()> {
        let cells: Vec<CellValue> = columns.iter().map(|c| CellValue::from(c.as_str())).collect();
        self.write_row(&cells)
    }

    fn write_row(&mut self, cells: &[CellValue]) -> WriteResult<()> {
        match self {
            Self::Delimited(writer) => writer.write_record(cells.iter().map(CellValue::to_text))?,
            Self::Xlsx {
                sheet, next_row, ..
            } => {
                for (col, cell) in cells.iter().enumerate() {
                    let col = u16::try_from(col).map_err(|_| WriteError::TooManyColumns(cells.len()))?;
                    match cell {
                        CellValue::Null => {}
                        CellValue::Bool(b) => {
                            sheet.write_boolean(*next_row, col, *b)?;
                        }
                        CellValue::Integer(i) => {
                            sheet.write_number(*next_row, col, *i as f64)?;
                        }
                        CellValue::Float(f) => {
                            sheet.write_number(*next_row, col, *f)?;
                        }
                        CellValue::String(s) => {
                            sheet.write_string(*next_row, col, s.as_str())?;
                        }
                    }
                }
                *next_row += 1;
            }
        }
        Ok(())
    }

    fn finish(self) -> WriteResult<()> {
        match self {
            Self::Delimited(mut writer) => writer.flush()?,
            Self::Xlsx { sheet, path, .. } => {
                let mut workbook = Workbook::new();
                workbook.push_worksheet(sheet);
                workbook.save(&path)?;
            }
        }
        Ok(())
    }
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(expected))
}
