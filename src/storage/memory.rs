use std::{
    collections::HashMap,
    future::Future,
    io,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use crate::storage::{KeyValueStore, StorageError};

/// In-memory store with switchable failures. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.insert(key, value);
        store
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `set` calls seen, failed ones included.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.inner
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn simulated_failure(key: &str) -> io::Error {
        io::Error::other(format!("simulated failure for '{key}'"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        let result = if self.inner.fail_reads.load(Ordering::SeqCst) {
            Err(StorageError::ReadFailed {
                path: PathBuf::from(key),
                source: Self::simulated_failure(key),
            })
        } else {
            Ok(self.value(key))
        };
        async move { result }
    }

    fn set(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        let result = if self.inner.fail_writes.load(Ordering::SeqCst) {
            Err(StorageError::WriteFailed {
                path: PathBuf::from(key),
                source: Self::simulated_failure(key),
            })
        } else {
            self.insert(key, &value);
            Ok(())
        };
        async move { result }
    }
}
