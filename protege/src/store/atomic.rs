//! Atomic file replacement.
//!
//! Writes go to a named temp file in the target directory, are synced,
//! then persisted over the target.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Atomically replaces `target` with `content`.
///
/// The parent directory is created if needed. Readers observe either the
/// old file or the complete new one.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the temp file
/// cannot be written, synced or persisted. The temp file is removed on
/// failure.
///
/// # Examples
///
/// ```
/// use protege::store::atomic_write;
///
/// let dir = tempfile::tempdir().unwrap();
/// let target = dir.path().join("nested").join("slot.sqlite");
/// atomic_write(&target, b"hello").unwrap();
/// assert_eq!(std::fs::read(&target).unwrap(), b"hello");
/// ```
pub fn atomic_write(target: &Path, content: &[u8]) -> io::Result<()> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.as_file_mut().write_all(content)?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;

    match tmp.persist(target) {
        Ok(_) => Ok(()),
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
            // Some filesystems refuse to rename over an existing file.
            fs::remove_file(target)?;
            err.file.persist(target).map(|_| ()).map_err(|e| e.error)
        }
        Err(err) => Err(err.error),
    }
}
