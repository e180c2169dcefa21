//! The batch loop: read, chunk, validate, augment, persist.

use sheetflow_io::{open_records, ReadResult};
use sheetflow_types::{Batch, Record};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{BatchValidationError, ImportResult, SinkResult};
use crate::job::{ImportJob, RowAugmenter, Sink, TransactionalSink};
use crate::validator::validate_batch;

/// What a completed import did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Batches validated and handed to the sink.
    pub batches: usize,
    /// Rows across those batches.
    pub rows: usize,
}

/// Imports the file at `path` with `job`.
///
/// Fails with [`ImportError::Read`](crate::ImportError::Read) before any
/// batch when the file cannot be opened. Otherwise see [`import_records`].
pub fn import(path: impl AsRef<Path>, job: &mut ImportJob<'_>) -> ImportResult<ImportSummary> {
    let path = path.as_ref();
    let stream = open_records(path, job.reader_options())?;

    let missing: Vec<&str> = job
        .rules()
        .columns()
        .filter(|column| !stream.headers().iter().any(|h| h == column))
        .collect();
    if !missing.is_empty() {
        warn!(path = %path.display(), columns = ?missing, "Rule columns not present in file header");
    }

    info!(path = %path.display(), batch_size = job.batch_size(), "Starting import");
    import_records(stream, job)
}

/// Runs the batch loop over an already opened record source.
///
/// Records are grouped into batches of `job.batch_size()`; the last batch
/// may be shorter. Each batch is validated, augmented and handed to the sink
/// before the next record is read. The first invalid batch, read error or
/// sink error stops the import; earlier batches are not undone.
pub fn import_records<I>(records: I, job: &mut ImportJob<'_>) -> ImportResult<ImportSummary>
where
    I: IntoIterator<Item = ReadResult<Record>>,
{
    let mut summary = ImportSummary::default();
    let mut pending = Vec::with_capacity(job.batch_size);

    for record in records {
        pending.push(record?);
        if pending.len() == job.batch_size {
            let records = std::mem::replace(&mut pending, Vec::with_capacity(job.batch_size));
            flush(job, &mut summary, records)?;
        }
    }
    if !pending.is_empty() {
        flush(job, &mut summary, pending)?;
    }

    info!(
        batches = summary.batches,
        rows = summary.rows,
        dry_run = job.is_dry_run(),
        "Import finished"
    );
    Ok(summary)
}

fn flush(job: &mut ImportJob<'_>, summary: &mut ImportSummary, records: Vec<Record>) -> ImportResult<()> {
    let batch = Batch::new(summary.batches, summary.rows, records);
    debug!(batch = batch.number(), first_row = batch.first_row(), rows = batch.len(), "Flushing batch");

    validate_batch(&batch, &job.rules, job.engine.as_ref()).map_err(|errors| {
        warn!(batch = batch.number(), errors = errors.len(), "Batch failed validation");
        BatchValidationError {
            batch: batch.number(),
            first_row: batch.first_row(),
            errors,
        }
    })?;

    let (number, rows) = (batch.number(), batch.len());
    let augmenter = job.augmenter.as_deref();
    match &mut job.sink {
        Sink::Transactional(sink) => persist_in_transaction(sink.as_mut(), augmenter, batch)?,
        Sink::Plain(sink) => sink.handle(&augment(augmenter, batch)?)?,
        Sink::DryRun => {
            augment(augmenter, batch)?;
        }
    }

    summary.batches += 1;
    summary.rows += rows;
    debug!(batch = number, rows, "Batch flushed");
    Ok(())
}

fn persist_in_transaction(
    sink: &mut dyn TransactionalSink,
    augmenter: Option<&dyn RowAugmenter>,
    batch: Batch,
) -> SinkResult<()> {
    let number = batch.number();
    sink.transactions().begin()?;

    let written = augment(augmenter, batch).and_then(|batch| sink.safely_persist(&batch));
    let outcome = written.and_then(|()| sink.transactions().commit());

    if let Err(err) = outcome {
        warn!(batch = number, error = %err, "Rolling back batch");
        if let Err(rollback) = sink.transactions().rollback() {
            warn!(batch = number, error = %rollback, "Rollback failed");
        }
        return Err(err);
    }
    debug!(batch = number, "Committed batch");
    Ok(())
}

fn augment(augmenter: Option<&dyn RowAugmenter>, batch: Batch) -> SinkResult<Batch> {
    let Some(augmenter) = augmenter else {
        return Ok(batch);
    };
    let (number, first_row, expected) = (batch.number(), batch.first_row(), batch.len());
    let records = batch
        .into_records()
        .into_iter()
        .map(|record| augmenter.add_columns(record))
        .collect::<SinkResult<Vec<_>>>()?;
    debug_assert_eq!(records.len(), expected, "augmentation changed the row count");
    Ok(Batch::new(number, first_row, records))
}
