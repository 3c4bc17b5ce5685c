//! The embedded SQL engine.
//!
//! An [`Engine`] owns one in-memory `SQLite` connection. It knows nothing
//! about persistence: it can be created empty, rebuilt from a snapshot and
//! serialized back into one.

use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, MAIN_DB};

use crate::error::{Error, Result};

use super::row::Row;
use super::snapshot::Snapshot;

/// Stamped into the header of every database this crate creates ("PRTG").
pub const APPLICATION_ID: i32 = 0x5052_5447;

pub(crate) struct Engine {
    conn: Connection,
}

impl Engine {
    /// Opens an empty in-memory database.
    pub(crate) fn open_empty(foreign_keys: bool) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&format!("PRAGMA application_id = {APPLICATION_ID}"))?;
        Self::configure(conn, foreign_keys)
    }

    /// Opens an empty database and applies `schema_sql` to it.
    ///
    /// The result is reloaded from its own snapshot, so the seed inserts
    /// leave no last-insert rowid behind.
    pub(crate) fn bootstrap(schema_sql: &str, foreign_keys: bool) -> Result<Self> {
        let seeded = Self::open_empty(foreign_keys)?;
        seeded.conn.execute_batch(schema_sql)?;
        Self::from_snapshot(&seeded.snapshot()?, foreign_keys)
    }

    /// Rebuilds a database from a snapshot.
    ///
    /// The image is loaded into a fresh connection and integrity-checked;
    /// on any failure the connection is discarded.
    pub(crate) fn from_snapshot(snapshot: &Snapshot, foreign_keys: bool) -> Result<Self> {
        let invalid = |e: rusqlite::Error| Error::InvalidSnapshot {
            reason: e.to_string(),
        };

        let mut conn = Connection::open_in_memory()?;
        let bytes = snapshot.as_bytes();
        conn.deserialize_read_exact(MAIN_DB, bytes, bytes.len(), false)
            .map_err(invalid)?;

        let status: String = conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))
            .map_err(invalid)?;
        if status != "ok" {
            return Err(Error::InvalidSnapshot {
                reason: format!("integrity check failed: {status}"),
            });
        }

        Self::configure(conn, foreign_keys)
    }

    fn configure(conn: Connection, foreign_keys: bool) -> Result<Self> {
        let switch = if foreign_keys { "ON" } else { "OFF" };
        conn.execute_batch(&format!("PRAGMA foreign_keys = {switch}"))?;
        Ok(Self { conn })
    }

    /// Serializes the whole `main` schema.
    pub(crate) fn snapshot(&self) -> Result<Snapshot> {
        let data = self.conn.serialize(MAIN_DB)?;
        Ok(Snapshot::from_engine(data.to_vec()))
    }

    pub(crate) fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.query_rows(sql, params)
            .map_err(|e| Error::sql(sql, params, e))
    }

    fn query_rows(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();

        let mut rows = stmt.query(params_from_iter(params))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|idx| row.get::<_, Value>(idx))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            results.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(results)
    }

    /// Executes a single statement and returns the number of rows it changed.
    ///
    /// Statements that produce a result set are refused before they run.
    pub(crate) fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        self.execute_statement(sql, params)
            .map_err(|e| Error::sql(sql, params, e))
    }

    fn execute_statement(&self, sql: &str, params: &[Value]) -> rusqlite::Result<usize> {
        let mut stmt = self.conn.prepare(sql)?;
        if stmt.column_count() > 0 {
            return Err(rusqlite::Error::ExecuteReturnedResults);
        }
        stmt.execute(params_from_iter(params))
    }

    /// Executes a script of zero or more statements.
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::sql(sql, &[], e))
    }

    pub(crate) fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// False while a transaction is open.
    pub(crate) fn is_autocommit(&self) -> bool {
        self.conn.is_autocommit()
    }
}
