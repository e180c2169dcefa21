//! Lazy record streams over delimited files and workbooks.

use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use sheetflow_types::{CellValue, Record};

use crate::error::{ReadError, ReadResult};
use crate::format::SourceFormat;

const UTF8_BOM: char = '\u{feff}';

/// Options for [`open_records`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Overrides the delimiter implied by the extension.
    pub delimiter: Option<u8>,
    /// Workbook sheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
    /// When false, columns are named `column_1`, `column_2`, ...
    pub has_headers: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            sheet: None,
            has_headers: true,
        }
    }
}

/// A finite, non-restartable sequence of records read from one file.
///
/// Yields `Err` for a row that cannot be parsed; callers are expected to stop
/// at the first error.
pub struct RecordStream {
    headers: Vec<String>,
    source: Source,
}

enum Source {
    Delimited(csv::StringRecordsIntoIter<File>),
    Sheet { range: Range<Data>, next_row: usize },
}

/// Opens `path` and returns a lazy stream of its rows.
///
/// Fails immediately when the file is missing, unreadable, of an unknown
/// format, or its header row cannot be parsed.
pub fn open_records(path: impl AsRef<Path>, options: &ReaderOptions) -> ReadResult<RecordStream> {
    let path = path.as_ref();
    std::fs::metadata(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let format = SourceFormat::detect(path)
        .ok_or_else(|| ReadError::UnsupportedFormat(path.display().to_string()))?;

    let stream = match format {
        SourceFormat::Delimited(default_delimiter) => {
            open_delimited(path, options.delimiter.unwrap_or(default_delimiter), options.has_headers)?
        }
        SourceFormat::Workbook => open_workbook(path, options)?,
    };

    info!(
        path = %path.display(),
        format = ?format,
        columns = stream.headers.len(),
        "Opened import source"
    );
    Ok(stream)
}

fn open_delimited(path: &Path, delimiter: u8, has_headers: bool) -> ReadResult<RecordStream> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_headers)
        .flexible(false)
        .from_path(path)
        .map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(source) => ReadError::Open {
                path: path.to_path_buf(),
                source,
            },
            kind => ReadError::Malformed {
                line: 1,
                message: format!("{kind:?}"),
            },
        })?;

    let first = reader.headers().map_err(malformed)?;
    let headers = if has_headers {
        normalize_headers(first.iter())
    } else {
        generated_headers(first.len())
    };

    Ok(RecordStream {
        headers,
        source: Source::Delimited(reader.into_records()),
    })
}

fn open_workbook(path: &Path, options: &ReaderOptions) -> ReadResult<RecordStream> {
    let mut workbook = open_workbook_auto(path)?;
    let range = match &options.sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(ReadError::SheetNotFound(name.clone()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook.worksheet_range_at(0).ok_or(ReadError::EmptyWorkbook)??,
    };

    let (height, width) = range.get_size();
    debug!(rows = height, columns = width, "Decoded worksheet");

    let (headers, next_row) = if options.has_headers && height > 0 {
        let names: Vec<String> = (0..width)
            .map(|col| range.get((0, col)).map(cell_text).unwrap_or_default())
            .collect();
        (normalize_headers(names.iter().map(String::as_str)), 1)
    } else {
        (generated_headers(width), 0)
    };

    Ok(RecordStream {
        headers,
        source: Source::Sheet { range, next_row },
    })
}

impl RecordStream {
    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn next_sheet_row(range: &Range<Data>, next_row: &mut usize, headers: &[String]) -> Option<Record> {
        let (height, width) = range.get_size();
        while *next_row < height {
            let row = *next_row;
            *next_row += 1;

            let cells: Vec<CellValue> = (0..width)
                .map(|col| range.get((row, col)).map_or_else(empty_cell, cell_value))
                .collect();
            if cells.iter().all(CellValue::is_blank) {
                continue;
            }
            return Some(headers.iter().cloned().zip(cells).collect());
        }
        None
    }
}

impl Iterator for RecordStream {
    type Item = ReadResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            Source::Delimited(rows) => {
                let row = match rows.next()? {
                    Ok(row) => row,
                    Err(e) => return Some(Err(malformed(e))),
                };
                Some(Ok(self
                    .headers
                    .iter()
                    .zip(row.iter())
                    .map(|(name, field)| (name.clone(), CellValue::from(field)))
                    .collect()))
            }
            Source::Sheet { range, next_row } => {
                Self::next_sheet_row(range, next_row, &self.headers).map(Ok)
            }
        }
    }
}

fn malformed(err: csv::Error) -> ReadError {
    match err.position() {
        Some(pos) => ReadError::Malformed {
            line: pos.line(),
            message: err.to_string(),
        },
        None => ReadError::Csv(err),
    }
}

fn normalize_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names
        .enumerate()
        .map(|(i, name)| {
            let name = if i == 0 { name.trim_start_matches(UTF8_BOM) } else { name };
            let name = name.trim();
            if name.is_empty() {
                format!("column_{}", i + 1)
            } else {
                name.to_string()
            }
        })
        .collect()
}

fn generated_headers(width: usize) -> Vec<String> {
    (1..=width).map(|i| format!("column_{i}")).collect()
}

fn cell_text(cell: &Data) -> String {
    cell_value(cell).to_text()
}

/// Empty cells read as empty text, the same as an empty delimited field.
fn empty_cell() -> CellValue {
    CellValue::String(String::new())
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => empty_cell(),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match cell.as_datetime() {
            Some(parsed) => CellValue::String(parsed.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}
