//! Query and mutation operations.
//!
//! Reads go straight to the engine. Every successful mutation schedules a
//! snapshot of the whole database on the auto-save queue.

use rusqlite::types::Value;
use serde::Serialize;

use crate::error::{Error, Result};

use super::connection::Database;
use super::row::{FromRow, Row};

/// Outcome of [`Database::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// Always true; failures are reported as errors.
    pub success: bool,
    /// Rows inserted, updated or deleted by the statement.
    pub rows_affected: usize,
}

/// Outcome of [`Database::exec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    /// Always true; failures are reported as errors.
    pub success: bool,
}

fn log_failure(e: &Error) {
    log::error!("{e}");
}

impl Database {
    /// Runs a query and returns every result row.
    ///
    /// Parameters bind positionally. Queries have no persistence side effect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before initialization, or
    /// [`Error::Sql`] carrying the statement and parameters if the engine
    /// rejects it.
    ///
    /// # Examples
    ///
    /// ```
    /// use protege::{sql_params, Database};
    ///
    /// let db = Database::in_memory().unwrap();
    /// let rows = db
    ///     .query("SELECT valeur FROM parametres_systeme WHERE cle = ?", &sql_params!["heure_ouverture"])
    ///     .unwrap();
    /// assert_eq!(rows[0].get_str("valeur"), Some("09:00"));
    /// ```
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let ready = self.ready()?;
        log::debug!("query: {sql}");
        ready.engine.query(sql, params).inspect_err(log_failure)
    }

    /// Runs a query and returns its first row, if any.
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`]; zero rows is not an error.
    pub fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Runs a query and converts each row with [`FromRow`].
    ///
    /// # Errors
    ///
    /// Same as [`Database::query`], plus any conversion failure.
    pub fn query_as<T: FromRow>(&self, sql: &str, params: &[Value]) -> Result<Vec<T>> {
        self.query(sql, params)?
            .iter()
            .map(T::from_row)
            .collect()
    }

    /// Executes one mutating statement and schedules an auto-save.
    ///
    /// The change is visible to queries as soon as this returns; it reaches
    /// the durable store asynchronously. While a transaction is open, the
    /// auto-save is deferred to the statement that closes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before initialization, or
    /// [`Error::Sql`] if the statement fails. A failed statement changes
    /// nothing and schedules no save.
    pub fn run(&mut self, sql: &str, params: &[Value]) -> Result<RunResult> {
        let ready = self.ready()?;
        log::debug!("run: {sql}");
        let rows_affected = ready
            .engine
            .execute(sql, params)
            .inspect_err(log_failure)?;
        ready.persist();

        Ok(RunResult {
            success: true,
            rows_affected,
        })
    }

    /// Executes an unparameterized script of one or more statements and
    /// schedules an auto-save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before initialization, or
    /// [`Error::Sql`] if any statement fails. Statements before the failing
    /// one keep their effect in memory and are saved with the next mutation.
    pub fn exec(&mut self, sql: &str) -> Result<ExecResult> {
        let ready = self.ready()?;
        log::debug!("exec: {sql}");
        ready.engine.execute_batch(sql).inspect_err(log_failure)?;
        ready.persist();

        Ok(ExecResult { success: true })
    }

    /// Returns the rowid assigned by the most recent insert on this service.
    ///
    /// Returns `None` if no row has been inserted since initialization.
    /// Call it right after the relevant [`Database::run`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before initialization.
    pub fn last_insert_id(&self) -> Result<Option<i64>> {
        let id = self.ready()?.engine.last_insert_rowid();
        Ok((id != 0).then_some(id))
    }
}
