//! InMemoryStore - HashMap-backed key-value store for tests and embedding.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{KeyValueStore, StorageError};

/// In-memory key-value store backed by a HashMap.
///
/// Clone-friendly via Arc: clones share the same underlying map, which is how
/// tests observe what a `ListingStore` wrote. An optional quota caps the sum of
/// key and value lengths, mirroring the capacity limit of browser storage.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    storage: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl InMemoryStore {
    /// Create a new empty store with no capacity limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty store that rejects writes past `bytes` in total.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            quota: Some(bytes),
        }
    }

    /// Total bytes currently held (keys plus values).
    pub fn used_bytes(&self) -> Result<usize, StorageError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StorageError::LockPoisoned("read"))?;
        Ok(storage.iter().map(|(k, v)| k.len() + v.len()).sum())
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StorageError::LockPoisoned("read"))?;
        Ok(storage.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StorageError::LockPoisoned("write"))?;

        if let Some(limit) = self.quota {
            let others: usize = storage
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }

        storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StorageError::LockPoisoned("write"))?;
        storage.remove(key);
        Ok(())
    }
}
