//! Key-value backends - the durable slot a `ListingStore` persists into.
//!
//! A backend only has to offer atomic single-key reads and writes of string
//! values. The listing layer never relies on anything richer than that.
//!
//! ## Example
//!
//! ```ignore
//! use rental_listings::{InMemoryStore, KeyValueStore};
//!
//! let store = InMemoryStore::new();
//! store.set("th_listings_v1", "[]")?;
//! assert_eq!(store.get("th_listings_v1")?.as_deref(), Some("[]"));
//! store.remove("th_listings_v1")?;
//! ```

mod file;
mod in_memory;

use thiserror::Error;

/// Synchronous string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`. Returns None if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Error type for key-value backend operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would grow the store past its configured capacity.
    #[error("storage quota exceeded writing {key} ({needed} bytes needed, limit {limit})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The backend's lock was poisoned by a panicking writer.
    #[error("storage lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

pub use file::FileStore;
pub use in_memory::InMemoryStore;
