//! Error types for the protege library.
//!
//! This module provides the error hierarchy for every operation of the
//! database service, the snapshot stores and the configuration layer,
//! using `thiserror` for ergonomic error handling.

use rusqlite::types::Value;
use thiserror::Error;

/// Result type alias for operations that may fail with a protege error.
///
/// # Examples
///
/// ```
/// use protege::{Error, Result};
///
/// fn example_operation() -> Result<i64> {
///     Ok(1)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the protege library.
#[derive(Debug, Error)]
pub enum Error {
    /// A query or mutation was issued before `initialize()` completed.
    #[error("database not initialized")]
    NotInitialized,

    /// Initialization failed; the service is still uninitialized and
    /// `initialize()` may be retried.
    #[error("initialization failed: {source}")]
    Initialization {
        /// The underlying failure.
        source: Box<Error>,
    },

    /// A statement failed inside the engine.
    #[error("SQL error in `{sql}` (params: {params:?}): {source}")]
    Sql {
        /// The SQL text as submitted by the caller.
        sql: String,
        /// The positional parameters bound to the statement.
        params: Vec<Value>,
        /// The engine error.
        #[source]
        source: rusqlite::Error,
    },

    /// An engine error outside of a caller-submitted statement.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Snapshot bytes could not be turned back into a database.
    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot {
        /// Why the bytes were rejected.
        reason: String,
    },

    /// The durable store failed an I/O operation.
    #[error("store {operation} failed for slot '{slot}': {source}")]
    Store {
        /// The store operation (`get`, `put`, `delete_all`, `open`).
        operation: &'static str,
        /// The slot (or namespace) involved.
        slot: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A scheduled snapshot could not be persisted.
    #[error("snapshot persistence failed: {message}")]
    Persistence {
        /// The last persistence failure reported by the save queue.
        message: String,
    },

    /// The durable store was written by a newer version of this library.
    #[error("unsupported store version: expected {expected}, found {found}")]
    UnsupportedStoreVersion {
        /// The highest store version this library understands.
        expected: u32,
        /// The version found on disk.
        found: u32,
    },

    /// The operation cannot run while a transaction is open.
    #[error("cannot {operation} while a transaction is open")]
    TransactionActive {
        /// The refused operation.
        operation: &'static str,
    },

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },
}

impl Error {
    /// Wraps an engine error with the statement and parameters that caused it.
    #[must_use]
    pub fn sql(sql: &str, params: &[Value], source: rusqlite::Error) -> Self {
        Self::Sql {
            sql: sql.to_string(),
            params: params.to_vec(),
            source,
        }
    }

    /// Wraps an error as an initialization failure.
    #[must_use]
    pub fn initialization(source: Self) -> Self {
        Self::Initialization {
            source: Box::new(source),
        }
    }

    /// Check if error indicates the service was used before initialization.
    ///
    /// # Examples
    ///
    /// ```
    /// use protege::Error;
    ///
    /// assert!(Error::NotInitialized.is_not_initialized());
    /// ```
    #[must_use]
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized)
    }

    /// Check if error is a caller-visible SQL failure.
    #[must_use]
    pub fn is_sql(&self) -> bool {
        matches!(self, Self::Sql { .. })
    }

    /// Check if error is a rejected snapshot or backup file.
    #[must_use]
    pub fn is_invalid_snapshot(&self) -> bool {
        matches!(self, Self::InvalidSnapshot { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_error() {
        let err = Error::NotInitialized;
        assert_eq!(err.to_string(), "database not initialized");
        assert!(err.is_not_initialized());
    }

    #[test]
    fn test_sql_error_carries_statement_and_params() {
        let err = Error::sql(
            "SELECT * FROM nowhere WHERE id = ?",
            &[Value::Integer(7)],
            rusqlite::Error::InvalidQuery,
        );
        let display = err.to_string();
        assert!(display.contains("SELECT * FROM nowhere"));
        assert!(display.contains("Integer(7)"));
        assert!(err.is_sql());
    }

    #[test]
    fn test_initialization_error_wraps_source() {
        let err = Error::initialization(Error::InvalidSnapshot {
            reason: "bad header".into(),
        });
        let display = err.to_string();
        assert!(display.contains("initialization failed"));
        assert!(display.contains("bad header"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_store_error_display() {
        let err = Error::Store {
            operation: "put",
            slot: "protege-lecture".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded"),
        };
        let display = err.to_string();
        assert!(display.contains("store put failed"));
        assert!(display.contains("protege-lecture"));
        assert!(display.contains("quota exceeded"));
    }

    #[test]
    fn test_unsupported_store_version_error() {
        let err = Error::UnsupportedStoreVersion {
            expected: 1,
            found: 2,
        };
        let display = err.to_string();
        assert!(display.contains("expected 1"));
        assert!(display.contains("found 2"));
    }

    #[test]
    fn test_transaction_active_error() {
        let err = Error::TransactionActive {
            operation: "restore",
        };
        assert_eq!(err.to_string(), "cannot restore while a transaction is open");
    }

    #[test]
    fn test_validation_error() {
        let err = Error::Validation {
            field: "slot".to_string(),
            message: "must be non-empty".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("validation error"));
        assert!(display.contains("slot"));
        assert!(display.contains("must be non-empty"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(format!("{err}").contains("I/O error"));
    }

    #[test]
    fn test_invalid_snapshot_predicate() {
        let err = Error::InvalidSnapshot {
            reason: "truncated".into(),
        };
        assert!(err.is_invalid_snapshot());
        assert!(!err.is_sql());
    }
}
