//! JSON-lines file sink.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use sheetflow_import::{PlainSink, SinkResult};
use sheetflow_types::Batch;

/// Appends one JSON object per record to a file.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn create(path: &Path) -> SinkResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl PlainSink for JsonlSink {
    fn handle(&mut self, batch: &Batch) -> SinkResult<()> {
        for record in batch {
            writeln!(self.writer, "{}", record.to_json()?)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
