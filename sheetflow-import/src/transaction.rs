//! Transaction scope used around transactional sinks.

use rusqlite::Connection;

use crate::error::SinkResult;

/// Opens, commits and rolls back one unit of work.
///
/// The importer calls `begin` once per batch, then `commit`. `rollback` follows
/// when augmentation, persistence or the commit itself fails.
pub trait TransactionManager {
    fn begin(&mut self) -> SinkResult<()>;
    fn commit(&mut self) -> SinkResult<()>;
    fn rollback(&mut self) -> SinkResult<()>;
}

impl<T: TransactionManager + ?Sized> TransactionManager for &mut T {
    fn begin(&mut self) -> SinkResult<()> {
        (**self).begin()
    }

    fn commit(&mut self) -> SinkResult<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> SinkResult<()> {
        (**self).rollback()
    }
}

impl TransactionManager for Connection {
    fn begin(&mut self) -> SinkResult<()> {
        self.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> SinkResult<()> {
        self.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> SinkResult<()> {
        if self.is_autocommit() {
            return Ok(());
        }
        self.execute_batch("ROLLBACK")?;
        Ok(())
    }
}
