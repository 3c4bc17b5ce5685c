//! In-process snapshot store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;

use super::{validate_name, SnapshotStore};

/// A snapshot store kept in process memory.
///
/// Clones share the same slots, so two handles behave like two views of
/// one durable store. This is how tests simulate a process restart or a
/// second application instance.
///
/// # Examples
///
/// ```
/// use protege::store::{MemoryStore, SnapshotStore};
///
/// let store = MemoryStore::new();
/// let view = store.clone();
/// store.put("slot", &[1, 2, 3]).unwrap();
/// assert_eq!(view.get("slot").unwrap(), Some(vec![1, 2, 3]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no slot holds a blob.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the size in bytes of the blob under `slot`, if any.
    #[must_use]
    pub fn slot_len(&self, slot: &str) -> Option<usize> {
        self.lock().get(slot).map(Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, slot: &str) -> Result<Option<Vec<u8>>> {
        validate_name("slot", slot)?;
        Ok(self.lock().get(slot).cloned())
    }

    fn put(&self, slot: &str, bytes: &[u8]) -> Result<()> {
        validate_name("slot", slot)?;
        self.lock().insert(slot.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }
}
