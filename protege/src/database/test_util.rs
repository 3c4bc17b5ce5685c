//! Shared test utilities for database unit tests.

use std::sync::Arc;

use crate::database::{Database, DatabaseConfig};
use crate::store::MemoryStore;

/// Creates an initialized database over a fresh in-memory store.
///
/// # Panics
///
/// Panics if the embedded schema cannot be applied. This is acceptable in
/// test code where we want to fail fast.
#[must_use]
pub fn create_test_database() -> Database {
    create_test_database_with_store(MemoryStore::new())
}

/// Creates an initialized database over `store`.
///
/// # Panics
///
/// Panics if initialization fails.
#[must_use]
#[allow(dead_code)]
pub fn create_test_database_with_store(store: MemoryStore) -> Database {
    Database::open(DatabaseConfig::default(), Arc::new(store)).unwrap()
}
