//! Transaction management.
//!
//! Transactions are plain `BEGIN`/`COMMIT`/`ROLLBACK` statements issued
//! through [`Database::exec`]. No snapshot is scheduled while one is open;
//! the closing statement schedules a single snapshot, so the durable store
//! never sees a half-applied transaction.

use crate::error::Result;

use super::connection::{Database, State};

impl Database {
    /// Opens a transaction.
    ///
    /// # Errors
    ///
    /// Returns an SQL error if a transaction is already open.
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.exec("BEGIN TRANSACTION").map(|_| ())
    }

    /// Commits the open transaction and schedules one snapshot for it.
    ///
    /// # Errors
    ///
    /// Returns an SQL error if no transaction is open or the commit fails;
    /// a failed commit leaves the transaction open.
    pub fn commit(&mut self) -> Result<()> {
        self.exec("COMMIT").map(|_| ())
    }

    /// Rolls back the open transaction.
    ///
    /// # Errors
    ///
    /// Returns an SQL error if no transaction is open.
    pub fn rollback(&mut self) -> Result<()> {
        self.exec("ROLLBACK").map(|_| ())
    }

    /// Returns true while a transaction is open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        matches!(&self.state, State::Ready(ready) if !ready.engine.is_autocommit())
    }

    /// Runs `f` inside a transaction.
    ///
    /// Commits if `f` returns `Ok`, rolls back if it returns `Err` or if the
    /// commit itself fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or from opening or committing the
    /// transaction.
    ///
    /// # Examples
    ///
    /// ```
    /// use protege::{sql_params, Database};
    ///
    /// let mut db = Database::in_memory().unwrap();
    /// let ids = db
    ///     .transaction(|db| {
    ///         db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["Romans"])?;
    ///         let first = db.last_insert_id()?;
    ///         db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["Sciences"])?;
    ///         Ok((first, db.last_insert_id()?))
    ///     })
    ///     .unwrap();
    /// assert_eq!(ids, (Some(1), Some(2)));
    /// ```
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.begin_transaction()?;

        let outcome = f(self).and_then(|value| self.commit().map(|()| value));
        if outcome.is_err() && self.in_transaction() {
            if let Err(e) = self.rollback() {
                log::warn!("rollback after failed transaction also failed: {e}");
            }
        }
        outcome
    }
}
