//! Persistent database service.
//!
//! This module provides an in-memory `SQLite` engine whose full state is
//! serialized into a [`Snapshot`] and saved to a durable
//! [`SnapshotStore`](crate::store::SnapshotStore) after every mutation.
//!
//! # Examples
//!
//! ```
//! use protege::database::{Database, DatabaseConfig};
//! use protege::sql_params;
//! use protege::store::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = MemoryStore::new();
//!
//! // First run: the schema is applied and saved
//! let mut db = Database::open(DatabaseConfig::default(), Arc::new(store.clone())).unwrap();
//! db.run("INSERT INTO categories (nom) VALUES (?)", &sql_params!["Fiction"]).unwrap();
//! db.flush().unwrap();
//! drop(db);
//!
//! // Next run: the saved snapshot is restored
//! let db = Database::open(DatabaseConfig::default(), Arc::new(store)).unwrap();
//! let rows = db.query("SELECT nom FROM categories", &[]).unwrap();
//! assert_eq!(rows[0].get_str("nom"), Some("Fiction"));
//! ```

mod autosave;
mod backup;
mod config;
mod connection;
mod engine;
mod operations;
mod row;
mod schema;
mod snapshot;
mod transaction;

#[cfg(test)]
pub(crate) mod test_util;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

// Re-export public API
pub use autosave::{AutosavePolicy, SaveStatus};
pub use backup::{backup_filename, Backup, BACKUP_EXTENSION};
pub use config::{
    default_data_dir, resolve_data_dir, DatabaseConfig, DATA_DIR_ENV, DEFAULT_BACKUP_PREFIX,
    DEFAULT_DATABASE_NAME, DEFAULT_OBJECT_STORE, DEFAULT_SLOT,
};
pub use connection::{Database, DatabaseState, InitOutcome};
pub use engine::APPLICATION_ID;
pub use operations::{ExecResult, RunResult};
pub use row::{FromRow, Row};
pub use schema::{SchemaSource, EMBEDDED_SCHEMA};
pub use snapshot::{Snapshot, SQLITE_HEADER_LEN, SQLITE_HEADER_MAGIC};

pub use rusqlite::types::Value;

/// Conversion of Rust values into positional SQL parameters.
///
/// Used by [`sql_params!`](crate::sql_params).
pub trait IntoValue {
    /// Converts `self` into an engine value.
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

macro_rules! integer_into_value {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Integer(i64::from(self))
                }
            }
        )*
    };
}

integer_into_value!(i8, i16, i32, i64, u8, u16, u32);

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Real(f64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Blob(self)
    }
}

impl IntoValue for &[u8] {
    fn into_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

/// Builds a `Vec<Value>` of positional parameters.
///
/// # Examples
///
/// ```
/// use protege::database::Value;
/// use protege::sql_params;
///
/// let params = sql_params!["Fiction", 3, 2.5, None::<i64>, true];
/// assert_eq!(
///     params,
///     vec![
///         Value::Text("Fiction".into()),
///         Value::Integer(3),
///         Value::Real(2.5),
///         Value::Null,
///         Value::Integer(1),
///     ]
/// );
/// assert!(sql_params![].is_empty());
/// ```
#[macro_export]
macro_rules! sql_params {
    () => {
        ::std::vec::Vec::<$crate::database::Value>::new()
    };
    ($($param:expr),+ $(,)?) => {
        ::std::vec![$($crate::database::IntoValue::into_value($param)),+]
    };
}
