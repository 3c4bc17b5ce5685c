//! Backup export, restore and full reset.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::store::atomic_write;

use super::connection::{Database, State};
use super::engine::Engine;
use super::snapshot::Snapshot;

/// Extension of exported backup files.
pub const BACKUP_EXTENSION: &str = "db";

/// Builds the suggested filename of a backup taken on `date`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use protege::database::backup_filename;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(backup_filename("protege-backup", date), "protege-backup-2024-03-09.db");
/// ```
#[must_use]
pub fn backup_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.{BACKUP_EXTENSION}", date.format("%Y-%m-%d"))
}

/// A serialized copy of the database, ready for export.
#[derive(Debug, Clone)]
pub struct Backup {
    snapshot: Snapshot,
    filename: String,
    created_at: DateTime<Utc>,
}

impl Backup {
    /// The database image.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.snapshot.as_bytes()
    }

    /// Suggested filename, embedding the UTC date of the backup.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// When the backup was taken.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Consumes the backup and returns the database image.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.snapshot.into_bytes()
    }

    /// Writes the backup into `dir` under its suggested filename.
    ///
    /// The file is replaced atomically if it already exists.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.filename);
        atomic_write(&path, self.bytes())?;
        log::info!("wrote backup to {}", path.display());
        Ok(path)
    }
}

impl Database {
    /// Serializes the live database for export.
    ///
    /// Has no effect on the engine or the durable store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before initialization.
    pub fn backup(&self) -> Result<Backup> {
        let snapshot = self.ready()?.engine.snapshot()?;
        let created_at = Utc::now();
        Ok(Backup {
            filename: backup_filename(&self.config.backup_prefix, created_at.date_naive()),
            snapshot,
            created_at,
        })
    }

    /// Replaces the live database with the image in `bytes` and writes it
    /// to the durable store before returning.
    ///
    /// The image is loaded into a separate engine first; if it is rejected,
    /// the live database and the stored snapshot are left untouched. An
    /// uninitialized service, for instance one whose stored snapshot is
    /// unreadable, becomes ready with the restored database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSnapshot`] for bytes that are not a valid
    /// database, [`Error::TransactionActive`] while a transaction is open,
    /// or [`Error::Persistence`] if the restored image could not be stored.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<()> {
        if self.in_transaction() {
            return Err(Error::TransactionActive {
                operation: "restore",
            });
        }

        let engine = Snapshot::from_bytes(bytes.to_vec())
            .and_then(|snapshot| Engine::from_snapshot(&snapshot, self.config.foreign_keys))
            .inspect_err(|e| log::error!("restore rejected: {e}"))?;

        log::info!("restoring database from a {} byte image", bytes.len());
        self.install(engine)
    }

    /// Reads a backup file and restores it with [`Database::restore`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise the same
    /// errors as [`Database::restore`].
    pub fn restore_from_file(&mut self, path: &Path) -> Result<()> {
        let bytes = fs::read(path)?;
        self.restore(&bytes)
    }

    /// Destroys the durable store and starts over from the schema.
    ///
    /// Irreversible. Pending saves are drained first so that none of them
    /// lands after the reset. Works on an uninitialized service too, which
    /// is how a store holding an unreadable snapshot is recovered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionActive`] while a transaction is open, a
    /// store error if the store cannot be deleted, or [`Error::Persistence`]
    /// if the fresh database could not be stored.
    pub fn clear_database(&mut self) -> Result<()> {
        if self.in_transaction() {
            return Err(Error::TransactionActive {
                operation: "clear the database",
            });
        }
        let fresh = self.fresh_engine()?;

        if let State::Ready(ready) = &self.state {
            if let Err(e) = ready.saver.flush() {
                log::warn!("pending save failed before reset: {e}");
            }
        }

        log::info!("clearing database store");
        self.store.delete_all()?;
        self.install(fresh)
    }

    /// Makes `engine` the live database and waits until it is stored.
    fn install(&mut self, engine: Engine) -> Result<()> {
        if let State::Ready(ready) = &mut self.state {
            return ready.install(engine);
        }
        let ready = self.start_with(engine)?;
        self.state = State::Ready(ready);
        Ok(())
    }
}
