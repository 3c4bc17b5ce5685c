//! Serialized database images.
//!
//! A [`Snapshot`] is the complete byte image of the `main` schema of an
//! engine, as produced by `SQLite`'s serialize API. It is the unit written
//! to the durable store and the format of backup files.

use std::fmt;

use crate::error::{Error, Result};

/// The 16-byte magic string every `SQLite` database file starts with.
pub const SQLITE_HEADER_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Size of the `SQLite` database header.
pub const SQLITE_HEADER_LEN: usize = 100;

// File format write/read version bytes; 2 marks a WAL-mode image.
const WRITE_VERSION_OFFSET: usize = 18;
const READ_VERSION_OFFSET: usize = 19;
const LEGACY_JOURNAL: u8 = 1;
const WAL_JOURNAL: u8 = 2;

/// A full serialized image of a database.
///
/// # Examples
///
/// ```
/// use protege::database::Snapshot;
///
/// assert!(Snapshot::from_bytes(b"definitely not a database".to_vec()).is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    bytes: Vec<u8>,
}

impl Snapshot {
    /// Wraps bytes coming from an untrusted source such as a backup file.
    ///
    /// Only the header is checked here; the content is verified when the
    /// snapshot is loaded into an engine. Images written in WAL mode are
    /// switched to rollback-journal mode so they can be loaded in memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSnapshot`] if the bytes are shorter than a
    /// database header or do not start with the `SQLite` magic string.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < SQLITE_HEADER_LEN {
            return Err(Error::InvalidSnapshot {
                reason: format!(
                    "{} bytes is shorter than a database header ({SQLITE_HEADER_LEN} bytes)",
                    bytes.len()
                ),
            });
        }
        if !bytes.starts_with(SQLITE_HEADER_MAGIC) {
            return Err(Error::InvalidSnapshot {
                reason: "missing SQLite header".to_string(),
            });
        }

        let mut snapshot = Self { bytes };
        snapshot.normalize_journal_mode();
        Ok(snapshot)
    }

    /// Wraps bytes freshly serialized by an engine.
    pub(crate) fn from_engine(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns the raw image.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the snapshot and returns the raw image.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the image is empty. Engine snapshots never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn normalize_journal_mode(&mut self) {
        if self.bytes[WRITE_VERSION_OFFSET] == WAL_JOURNAL
            && self.bytes[READ_VERSION_OFFSET] == WAL_JOURNAL
        {
            log::debug!("snapshot header is in WAL mode, switching to rollback journal");
            self.bytes[WRITE_VERSION_OFFSET] = LEGACY_JOURNAL;
            self.bytes[READ_VERSION_OFFSET] = LEGACY_JOURNAL;
        }
    }
}

impl AsRef<[u8]> for Snapshot {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot").field("len", &self.bytes.len()).finish()
    }
}
