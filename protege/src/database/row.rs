//! Result rows.
//!
//! Query results are schema-agnostic: each [`Row`] is an ordered list of
//! column values sharing the column names of its result set. Callers that
//! want static typing implement [`FromRow`] for their own record types.

use std::sync::Arc;

use rusqlite::types::Value;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{Error, Result};

/// One row of a query result.
///
/// Serializes as a map from column name to value, in column order.
///
/// # Examples
///
/// ```
/// use protege::Database;
///
/// let mut db = Database::in_memory().unwrap();
/// db.run("INSERT INTO categories (nom) VALUES (?)", &protege::sql_params!["Fiction"]).unwrap();
///
/// let row = db.query_one("SELECT id, nom FROM categories", &[]).unwrap().unwrap();
/// assert_eq!(row.columns(), ["id", "nom"]);
/// assert_eq!(row.get_str("nom"), Some("Fiction"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Column names, in result order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Column values, in result order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(column, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Returns the value of the first column named `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|idx| &self.values[idx])
    }

    /// Returns the value at position `idx`.
    #[must_use]
    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Returns `column` as an integer, if it holds one.
    #[must_use]
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns `column` as a float. Integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get_f64(&self, column: &str) -> Option<f64> {
        match self.get(column)? {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns `column` as text, if it holds text.
    #[must_use]
    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Like [`Row::get_i64`], but a missing or mistyped column is an error.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the column.
    pub fn require_i64(&self, column: &str) -> Result<i64> {
        self.get_i64(column)
            .ok_or_else(|| self.type_error(column, "an integer"))
    }

    /// Like [`Row::get_str`], but a missing or mistyped column is an error.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the column.
    pub fn require_str(&self, column: &str) -> Result<&str> {
        self.get_str(column)
            .ok_or_else(|| self.type_error(column, "text"))
    }

    fn type_error(&self, column: &str, expected: &str) -> Error {
        let message = match self.get(column) {
            None => "column not present in result".to_string(),
            Some(found) => format!("expected {expected}, found {}", value_kind(found)),
        };
        Error::Validation {
            field: column.to_string(),
            message,
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Integer(_) => "integer",
        Value::Real(_) => "real",
        Value::Text(_) => "text",
        Value::Blob(_) => "blob",
    }
}

struct SqlValue<'a>(&'a Value);

impl Serialize for SqlValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Blob(b) => serializer.serialize_bytes(b),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &SqlValue(value))?;
        }
        map.end()
    }
}

/// Conversion from a generic [`Row`] into a caller-defined record.
///
/// # Examples
///
/// ```
/// use protege::database::{FromRow, Row};
///
/// struct Category {
///     id: i64,
///     nom: String,
/// }
///
/// impl FromRow for Category {
///     fn from_row(row: &Row) -> protege::Result<Self> {
///         Ok(Self {
///             id: row.require_i64("id")?,
///             nom: row.require_str("nom")?.to_string(),
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Builds the record from one result row.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing or has the wrong type.
    fn from_row(row: &Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}
