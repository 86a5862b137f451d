//! In-memory settings store for tests.
//!
//! Clones share the same state, so a test can hand one clone to the code
//! under test and keep another to inspect what was written.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::application::store::{SettingsStore, StorageError};

const LOCATION: &str = "memory";

#[derive(Debug, Default)]
struct Inner {
    value: Option<Vec<u8>>,
    reads: usize,
    writes: usize,
    deny_reads: bool,
    deny_writes: bool,
}

/// A [`SettingsStore`] backed by a shared in-memory buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store; reads return [`StorageError::NotFound`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `bytes`.
    pub fn with_value(bytes: Vec<u8>) -> Self {
        let store = Self::new();
        store.lock().value = Some(bytes);
        store
    }

    /// The bytes currently stored, if any.
    pub fn value(&self) -> Option<Vec<u8>> {
        self.lock().value.clone()
    }

    /// Number of `get_raw` calls so far, failed ones included.
    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    /// Number of `set_raw` calls so far, failed ones included.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Makes subsequent reads fail with [`StorageError::AccessDenied`].
    pub fn deny_reads(&self, deny: bool) {
        self.lock().deny_reads = deny;
    }

    /// Makes subsequent writes fail with [`StorageError::AccessDenied`].
    pub fn deny_writes(&self, deny: bool) {
        self.lock().deny_writes = deny;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsStore for MemoryStore {
    fn get_raw(&self) -> Result<Vec<u8>, StorageError> {
        let mut inner = self.lock();
        inner.reads += 1;
        if inner.deny_reads {
            return Err(StorageError::AccessDenied {
                location: LOCATION.to_string(),
            });
        }
        inner.value.clone().ok_or_else(|| StorageError::NotFound {
            location: LOCATION.to_string(),
        })
    }

    fn set_raw(&self, bytes: &[u8]) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.writes += 1;
        if inner.deny_writes {
            return Err(StorageError::AccessDenied {
                location: LOCATION.to_string(),
            });
        }
        inner.value = Some(bytes.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        LOCATION.to_string()
    }
}
