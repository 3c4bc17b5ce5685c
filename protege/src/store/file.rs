//! Directory-backed snapshot store.
//!
//! Layout on disk:
//!
//! ```text
//! <data_dir>/<database_name>/VERSION
//! <data_dir>/<database_name>/<object_store>/<slot>.sqlite
//! ```
//!
//! The namespace directory and its `VERSION` marker are created the first
//! time the store is opened, whether for reading or writing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::{atomic_write, validate_name, SnapshotStore};

/// Current on-disk layout version of [`FileStore`].
pub const STORE_VERSION: u32 = 1;

const VERSION_FILE: &str = "VERSION";
const SNAPSHOT_EXTENSION: &str = "sqlite";

/// A snapshot store rooted in a directory of the local filesystem.
///
/// # Examples
///
/// ```
/// use protege::store::{FileStore, SnapshotStore};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = FileStore::new(dir.path(), "ProtegeDB", "database").unwrap();
///
/// assert!(store.get("protege-lecture").unwrap().is_none());
/// store.put("protege-lecture", b"snapshot").unwrap();
/// assert_eq!(store.get("protege-lecture").unwrap().unwrap(), b"snapshot");
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    object_store: String,
}

impl FileStore {
    /// Creates a store handle for `<data_dir>/<database_name>/<object_store>`.
    ///
    /// Nothing is touched on disk until the first operation.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either name is not a valid store name.
    pub fn new(data_dir: impl AsRef<Path>, database_name: &str, object_store: &str) -> Result<Self> {
        validate_name("database_name", database_name)?;
        validate_name("object_store", object_store)?;

        Ok(Self {
            root: data_dir.as_ref().join(database_name),
            object_store: object_store.to_string(),
        })
    }

    /// Returns the namespace directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file that holds `slot`.
    #[must_use]
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.root
            .join(&self.object_store)
            .join(format!("{slot}.{SNAPSHOT_EXTENSION}"))
    }

    /// Reads the layout version marker, if the namespace exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker exists but cannot be read or parsed.
    pub fn version(&self) -> Result<Option<u32>> {
        let path = self.root.join(VERSION_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error("open", e)),
        };

        contents
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| Error::Validation {
                field: path.display().to_string(),
                message: format!("Invalid store version marker: {e}"),
            })
    }

    /// Opens the namespace, creating it on first use, and checks its version.
    fn open(&self) -> Result<()> {
        match self.version()? {
            Some(found) if found > STORE_VERSION => Err(Error::UnsupportedStoreVersion {
                expected: STORE_VERSION,
                found,
            }),
            Some(_) => Ok(()),
            None => {
                log::debug!("creating snapshot store at {}", self.root.display());
                fs::create_dir_all(self.root.join(&self.object_store))
                    .map_err(|e| self.io_error("open", e))?;
                atomic_write(
                    &self.root.join(VERSION_FILE),
                    STORE_VERSION.to_string().as_bytes(),
                )
                .map_err(|e| self.io_error("open", e))
            }
        }
    }

    fn io_error(&self, operation: &'static str, source: io::Error) -> Error {
        Error::Store {
            operation,
            slot: self.root.display().to_string(),
            source,
        }
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        validate_name("slot", slot)?;
        self.open()?;

        match fs::read(self.slot_path(slot)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Store {
                operation: "get",
                slot: slot.to_string(),
                source,
            }),
        }
    }

    fn put(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        validate_name("slot", slot)?;
        self.open()?;

        atomic_write(&self.slot_path(slot), bytes).map_err(|source| Error::Store {
            operation: "put",
            slot: slot.to_string(),
            source,
        })
    }

    fn delete_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("delete_all", e)),
        }
    }
}
