//! Durable snapshot stores.
//!
//! A store keeps exactly one binary blob per named slot. The database
//! service only ever uses a single slot, replacing its content wholesale
//! after every persisted mutation.
//!
//! # Examples
//!
//! ```
//! use protege::store::{MemoryStore, SnapshotStore};
//!
//! let store = MemoryStore::new();
//! assert!(store.get("protege-lecture").unwrap().is_none());
//!
//! store.put("protege-lecture", b"bytes").unwrap();
//! assert_eq!(store.get("protege-lecture").unwrap().unwrap(), b"bytes");
//!
//! store.delete_all().unwrap();
//! assert!(store.get("protege-lecture").unwrap().is_none());
//! ```

mod atomic;
mod file;
mod memory;

pub use atomic::atomic_write;
pub use file::{FileStore, STORE_VERSION};
pub use memory::MemoryStore;

use crate::error::{Error, Result};

/// Maximum length of a slot name.
pub const MAX_SLOT_NAME_LEN: usize = 128;

/// A durable key-blob store holding database snapshots.
///
/// Implementations must make `put` atomic from the caller's point of view:
/// a concurrent or subsequent `get` sees either the previous blob or the
/// new one, never a mix. Concurrent `put`s to the same slot are
/// last-write-wins.
#[cfg_attr(test, mockall::automock)]
pub trait SnapshotStore: Send + Sync {
    /// Reads the blob stored under `slot`.
    ///
    /// A store or slot that does not exist yet reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    fn get(&self, slot: &str) -> Result<Option<Vec<u8>>>;

    /// Replaces the blob stored under `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn put(&self, slot: &str, bytes: &[u8]) -> Result<()>;

    /// Destroys the whole store, every slot included.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be removed.
    fn delete_all(&self) -> Result<()>;
}

/// Validates a slot or namespace name.
///
/// Names must be non-empty, at most [`MAX_SLOT_NAME_LEN`] characters, and
/// free of path separators, `..` and NUL bytes.
///
/// # Errors
///
/// Returns a validation error naming `field` when the name is rejected.
///
/// # Examples
///
/// ```
/// use protege::store::validate_name;
///
/// assert!(validate_name("slot", "protege-lecture").is_ok());
/// assert!(validate_name("slot", "../escape").is_err());
/// assert!(validate_name("slot", "").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> Result<()> {
    let reject = |message: &str| {
        Err(Error::Validation {
            field: field.to_string(),
            message: message.to_string(),
        })
    };

    if name.trim().is_empty() {
        return reject("cannot be empty");
    }
    if name.chars().count() > MAX_SLOT_NAME_LEN {
        return reject("is too long");
    }
    if name.contains(['/', '\\', '\0']) {
        return reject("cannot contain path separators or NUL bytes");
    }
    if name.contains("..") {
        return reject("cannot contain '..'");
    }

    Ok(())
}
