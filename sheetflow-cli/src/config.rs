//! Job file (`job.toml`) loading.
//!
//! ```toml
//! batch_size = 500
//!
//! [reader]
//! delimiter = ";"
//!
//! [rules]
//! name = "required|max:50"
//! age = ["required", "integer", "min:18"]
//!
//! [messages]
//! "age.min" = "Applicants must be adults."
//!
//! [attributes]
//! age = "Age (years)"
//!
//! [add_columns]
//! source = "upload"
//!
//! [sink]
//! database = "people.db"
//! table = "people"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sheetflow_import::{ConstantColumns, DEFAULT_BATCH_SIZE};
use sheetflow_io::ReaderOptions;
use sheetflow_rules::RuleSet;
use sheetflow_types::CellValue;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub reader: ReaderSection,
    #[serde(default)]
    pub rules: RuleSet,
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub add_columns: toml::Table,
    #[serde(default)]
    pub sink: SinkSection,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderSection {
    pub delimiter: Option<char>,
    pub sheet: Option<String>,
    #[serde(default = "default_true")]
    pub has_headers: bool,
}

impl Default for ReaderSection {
    fn default() -> Self {
        Self {
            delimiter: None,
            sheet: None,
            has_headers: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Where validated batches go. Both empty means a dry run.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SinkSection {
    pub database: Option<PathBuf>,
    pub table: Option<String>,
    pub jsonl: Option<PathBuf>,
}

impl JobFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid job file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let job: Self = toml::from_str(text)?;
        if job.sink.database.is_some() && job.sink.table.is_none() {
            bail!("[sink] database requires a table");
        }
        Ok(job)
    }
}

impl ReaderSection {
    pub fn to_options(&self) -> Result<ReaderOptions> {
        let delimiter = match self.delimiter {
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => bail!("delimiter must be a single ASCII character, got {c:?}"),
            None => None,
        };
        Ok(ReaderOptions {
            delimiter,
            sheet: self.sheet.clone(),
            has_headers: self.has_headers,
        })
    }
}

/// Converts `[add_columns]` into an augmenter, keeping file order.
pub fn constant_columns(table: &toml::Table) -> Result<ConstantColumns> {
    table
        .iter()
        .map(|(column, value)| {
            let value = match value {
                toml::Value::String(s) => CellValue::String(s.clone()),
                toml::Value::Integer(i) => CellValue::Integer(*i),
                toml::Value::Float(f) => CellValue::Float(*f),
                toml::Value::Boolean(b) => CellValue::Bool(*b),
                toml::Value::Datetime(dt) => CellValue::String(dt.to_string()),
                other => bail!("add_columns.{column}: unsupported value {other}"),
            };
            Ok((column.clone(), value))
        })
        .collect()
}
