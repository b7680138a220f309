mod config;
mod kv;
mod listing;
mod store;

pub use config::{StoreConfig, DEFAULT_DATA_DIR};
pub use kv::{FileStore, InMemoryStore, KeyValueStore, StorageError};
pub use listing::{
    validate, Condition, DataUrl, Image, ImageKind, Listing, ListingDraft, ListingPatch,
    ValidationError, Visibility, INLINE_IMAGE_BUDGET,
};
pub use store::{ListingStore, ListingStoreError, DEFAULT_EXPORT_FILE, STORAGE_KEY};
