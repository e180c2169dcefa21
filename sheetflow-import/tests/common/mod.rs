//! Shared test helpers for import tests.

#![allow(dead_code)]

use sheetflow_import::{SinkError, SinkResult, TransactionManager, TransactionalSink};
use sheetflow_io::ReadResult;
use sheetflow_types::{Batch, Record};

/// `n` records `{id, name, age}` with ids from 1.
pub fn people(n: usize) -> Vec<Record> {
    (1..=n)
        .map(|i| {
            Record::new()
                .with("id", i as i64)
                .with("name", format!("person {i}"))
                .with("age", (20 + i % 50).to_string())
        })
        .collect()
}

/// Wraps records as a reader would yield them.
pub fn stream(records: Vec<Record>) -> impl Iterator<Item = ReadResult<Record>> {
    records.into_iter().map(Ok)
}

/// In-memory store with explicit transactions.
#[derive(Debug, Default)]
pub struct FakeStore {
    pub committed: Vec<Record>,
    pending: Vec<Record>,
    in_transaction: bool,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

impl FakeStore {
    fn insert(&mut self, record: Record) {
        if self.in_transaction {
            self.pending.push(record);
        } else {
            self.committed.push(record);
        }
    }
}

impl TransactionManager for FakeStore {
    fn begin(&mut self) -> SinkResult<()> {
        if self.in_transaction {
            return Err(SinkError::Transaction("already in a transaction".into()));
        }
        self.in_transaction = true;
        self.begins += 1;
        Ok(())
    }

    fn commit(&mut self) -> SinkResult<()> {
        self.committed.append(&mut self.pending);
        self.in_transaction = false;
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> SinkResult<()> {
        self.pending.clear();
        self.in_transaction = false;
        self.rollbacks += 1;
        Ok(())
    }
}

/// Transactional sink over [`FakeStore`] that can fail after `fail_after`
/// inserts in a given batch.
#[derive(Debug, Default)]
pub struct FakeSink {
    pub store: FakeStore,
    pub fail_in_batch: Option<(usize, usize)>,
    pub batch_sizes: Vec<usize>,
}

impl FakeSink {
    pub fn failing(batch: usize, after: usize) -> Self {
        Self {
            fail_in_batch: Some((batch, after)),
            ..Self::default()
        }
    }
}

impl TransactionalSink for FakeSink {
    fn transactions(&mut self) -> &mut dyn TransactionManager {
        &mut self.store
    }

    fn safely_persist(&mut self, batch: &Batch) -> SinkResult<()> {
        self.batch_sizes.push(batch.len());
        for (i, record) in batch.iter().enumerate() {
            if self.fail_in_batch == Some((batch.number(), i)) {
                return Err(SinkError::handler(format!(
                    "insert failed at row {i} of batch {}",
                    batch.number()
                )));
            }
            self.store.insert(record.clone());
        }
        Ok(())
    }
}
