//! Schema definition applied on first-run bootstrap.
//!
//! The schema is only ever applied to an empty engine, when the durable
//! store holds no snapshot yet. Restored databases keep whatever schema
//! their snapshot carries.

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// The application schema compiled into the library: tables, indices and
/// the default system parameters.
pub const EMBEDDED_SCHEMA: &str = include_str!("../../schema/schema.sql");

/// Where the bootstrap schema comes from.
///
/// # Examples
///
/// ```
/// use protege::database::SchemaSource;
///
/// let inline = SchemaSource::Inline("CREATE TABLE t (id INTEGER)".into());
/// assert!(inline.load().unwrap().contains("CREATE TABLE t"));
/// assert!(SchemaSource::default().load().unwrap().contains("parametres_systeme"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchemaSource {
    /// The schema shipped with the library.
    #[default]
    Embedded,
    /// Caller-provided SQL text.
    Inline(String),
    /// A SQL file read at bootstrap time.
    File(PathBuf),
}

impl SchemaSource {
    /// Returns the schema SQL text.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a schema file cannot be read, or a
    /// validation error if it is empty.
    pub fn load(&self) -> Result<String> {
        let sql = match self {
            Self::Embedded => EMBEDDED_SCHEMA.to_string(),
            Self::Inline(sql) => sql.clone(),
            Self::File(path) => fs::read_to_string(path).map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("cannot read schema file {}: {e}", path.display()),
                ))
            })?,
        };

        if sql.trim().is_empty() {
            return Err(Error::Validation {
                field: "schema".into(),
                message: "Schema definition is empty".into(),
            });
        }
        Ok(sql)
    }
}
