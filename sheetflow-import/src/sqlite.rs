//! SQLite-backed transactional sink.
//!
//! Columns are untyped (SQLite type affinity `BLOB`/none), so each cell keeps
//! the storage class of its [`CellValue`]. The table is created from the
//! first record it sees; columns that appear later are added with
//! `ALTER TABLE`. Schema changes run inside the batch transaction and are
//! rolled back with it.

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::Path;
use tracing::{debug, info};

use sheetflow_types::{Batch, CellValue, Record};

use crate::error::{SinkError, SinkResult};
use crate::job::TransactionalSink;
use crate::transaction::TransactionManager;

/// Inserts every batch into one SQLite table.
pub struct SqliteSink {
    conn: Connection,
    table: String,
}

impl SqliteSink {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>, table: impl Into<String>) -> SinkResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened SQLite sink");
        Self::with_connection(conn, table)
    }

    /// Opens an existing database read-only. Fails instead of creating the
    /// file when it does not exist.
    pub fn open_read_only(path: impl AsRef<Path>, table: impl Into<String>) -> SinkResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!(path = %path.display(), "Opened SQLite database read-only");
        Self::with_connection(conn, table)
    }

    /// Opens an in-memory database (for testing).
    pub fn open_in_memory(table: impl Into<String>) -> SinkResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, table)
    }

    pub fn with_connection(conn: Connection, table: impl Into<String>) -> SinkResult<Self> {
        let table = table.into();
        if table.trim().is_empty() {
            return Err(SinkError::handler("table name must not be empty"));
        }
        Ok(Self { conn, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Rows currently stored, 0 when the table does not exist yet.
    pub fn row_count(&self) -> SinkResult<usize> {
        if table_columns(&self.conn, &self.table)?.is_empty() {
            return Ok(0);
        }
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote(&self.table)),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// All stored rows in insertion order.
    pub fn rows(&self) -> SinkResult<Vec<Record>> {
        read_table(&self.conn, &self.table)
    }

    fn ensure_columns(&self, record: &Record) -> SinkResult<()> {
        let existing = table_columns(&self.conn, &self.table)?;
        if existing.is_empty() {
            let columns: Vec<String> = record.columns().map(quote).collect();
            if columns.is_empty() {
                return Err(SinkError::handler("cannot create a table for an empty record"));
            }
            self.conn.execute_batch(&format!(
                "CREATE TABLE {} ({})",
                quote(&self.table),
                columns.join(", ")
            ))?;
            debug!(table = %self.table, columns = columns.len(), "Created import table");
            return Ok(());
        }

        for column in record.columns().filter(|c| !existing.iter().any(|e| e == c)) {
            self.conn.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN {}",
                quote(&self.table),
                quote(column)
            ))?;
            debug!(table = %self.table, column, "Added import column");
        }
        Ok(())
    }

    fn insert(&self, record: &Record) -> SinkResult<()> {
        let columns: Vec<String> = record.columns().map(quote).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(&self.table),
            columns.join(", "),
            placeholders.join(", ")
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(record.iter().map(|(_, v)| to_sql_value(v))))?;
        Ok(())
    }
}

impl TransactionalSink for SqliteSink {
    fn transactions(&mut self) -> &mut dyn TransactionManager {
        &mut self.conn
    }

    fn safely_persist(&mut self, batch: &Batch) -> SinkResult<()> {
        let mut known: Vec<String> = Vec::new();
        for record in batch {
            if record.columns().any(|c| !known.iter().any(|k| k == c)) {
                self.ensure_columns(record)?;
                known = table_columns(&self.conn, &self.table)?;
            }
            self.insert(record)?;
        }
        debug!(table = %self.table, rows = batch.len(), "Inserted batch");
        Ok(())
    }
}

/// Reads every row of `table` in insertion order.
pub fn read_table(conn: &Connection, table: &str) -> SinkResult<Vec<Record>> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {} ORDER BY rowid", quote(table)))?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

    let rows = stmt.query_map([], |row| {
        let mut record = Record::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            record.insert(column.clone(), from_sql_value(row.get_ref(i)?));
        }
        Ok(record)
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn table_columns(conn: &Connection, table: &str) -> SinkResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote(table)))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    Ok(names.collect::<Result<Vec<_>, _>>()?)
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn to_sql_value(value: &CellValue) -> Value {
    match value {
        CellValue::Null => Value::Null,
        CellValue::Bool(b) => Value::Integer(i64::from(*b)),
        CellValue::Integer(i) => Value::Integer(*i),
        CellValue::Float(f) => Value::Real(*f),
        CellValue::String(s) => Value::Text(s.clone()),
    }
}

fn from_sql_value(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            CellValue::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
