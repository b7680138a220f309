//! ListingStore - validated persistence of the published listing collection.
//!
//! The whole collection lives as one JSON array under a single key of a
//! [`KeyValueStore`]. Every mutation reads the array, changes it, and writes
//! it back. Reads are forgiving (corrupt data reads as empty, invalid entries
//! are skipped); writes are strict (nothing invalid is ever stored).
//!
//! ## Example
//!
//! ```ignore
//! use rental_listings::{InMemoryStore, ListingDraft, ListingPatch, ListingStore};
//!
//! let store = ListingStore::new(InMemoryStore::new());
//! let mut draft = ListingDraft::new("Catan", "Strategy", "Complete copy", 100.0);
//! draft.push_image("data:image/jpeg;base64,AA", None);
//!
//! let listing = store.publish(&draft)?;
//! store.update(&listing.id, &ListingPatch::new().price_per_day(150.0))?;
//! let backup = store.export_listings()?;
//! ```

mod error;
mod merge;

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::kv::{FileStore, KeyValueStore};
use crate::listing::{validate, Listing, ListingDraft, ListingPatch, ValidationError};

pub use error::ListingStoreError;
use merge::merge_by_id;

/// Storage key the collection lives under unless configured otherwise.
pub const STORAGE_KEY: &str = "th_listings_v1";

/// Suggested file name for backups written by `export_to_path`.
pub const DEFAULT_EXPORT_FILE: &str = "my-listings.json";

/// Validated listing collection persisted in one key of `S`.
///
/// Read-modify-write operations on one instance are serialized by an internal
/// lock. Separate instances sharing a backing key are not coordinated: the last
/// writer wins.
pub struct ListingStore<S> {
    backend: S,
    key: String,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> ListingStore<S> {
    /// Create a store persisting under [`STORAGE_KEY`].
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read every valid listing, in stored order.
    ///
    /// Never fails: a missing key, unreadable backend, or malformed payload
    /// yields an empty collection, and invalid entries are skipped.
    pub fn load(&self) -> Vec<Listing> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read listings, treating as empty");
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!(key = %self.key, "stored listings are not a JSON array, ignoring");
                return Vec::new();
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored listings are not valid JSON, ignoring");
                return Vec::new();
            }
        };

        let total = entries.len();
        let listings: Vec<Listing> = entries
            .iter()
            .filter_map(|entry| match validate(entry) {
                Ok(listing) => Some(listing),
                Err(err) => {
                    debug!(error = %err, "skipping invalid stored listing");
                    None
                }
            })
            .collect();

        if listings.len() < total {
            warn!(
                key = %self.key,
                dropped = total - listings.len(),
                kept = listings.len(),
                "dropped invalid stored listings"
            );
        }

        listings
    }

    /// Look up one listing by id.
    pub fn get(&self, id: &str) -> Option<Listing> {
        self.load().into_iter().find(|listing| listing.id == id)
    }

    /// Listings visible in the public catalog.
    pub fn public_listings(&self) -> Vec<Listing> {
        self.load()
            .into_iter()
            .filter(Listing::is_public)
            .collect()
    }

    /// Overwrite the stored collection with `listings`.
    ///
    /// Every listing must be valid and ids must be unique.
    pub fn save(&self, listings: &[Listing]) -> Result<(), ListingStoreError> {
        let mut messages = Vec::new();
        for (idx, listing) in listings.iter().enumerate() {
            if let Err(err) = listing.validate() {
                messages.extend(
                    err.into_messages()
                        .into_iter()
                        .map(|message| format!("[{}].{}", idx, message)),
                );
            }
        }
        if !messages.is_empty() {
            return Err(ValidationError::new(messages).into());
        }

        let mut seen = HashSet::new();
        if let Some(dup) = listings.iter().find(|listing| !seen.insert(listing.id.as_str())) {
            return Err(ListingStoreError::Conflict { id: dup.id.clone() });
        }

        let _guard = self.lock("save")?;
        self.write(listings)
    }

    /// Validate and append a new listing.
    pub fn add(&self, item: Listing) -> Result<(), ListingStoreError> {
        item.validate()?;

        let _guard = self.lock("add")?;
        let mut current = self.load();
        if current.iter().any(|listing| listing.id == item.id) {
            return Err(ListingStoreError::Conflict { id: item.id });
        }

        warn_oversized_images(&item);
        let id = item.id.clone();
        current.push(item);
        self.write(&current)?;

        info!(id = %id, total = current.len(), "listing added");
        Ok(())
    }

    /// Turn a draft into a listing and add it.
    pub fn publish(&self, draft: &ListingDraft) -> Result<Listing, ListingStoreError> {
        let listing = draft.publish();
        self.add(listing.clone())?;
        Ok(listing)
    }

    /// Merge `patch` into the listing with `id`.
    ///
    /// Returns `Ok(false)` without touching storage when no listing has `id`.
    pub fn update(&self, id: &str, patch: &ListingPatch) -> Result<bool, ListingStoreError> {
        let _guard = self.lock("update")?;
        let mut current = self.load();

        let Some(pos) = current.iter().position(|listing| listing.id == id) else {
            debug!(id = %id, "update skipped, listing not found");
            return Ok(false);
        };

        let merged = patch.apply_to(&current[pos])?;
        let updated = validate(&merged)?;
        if updated.id != id && current.iter().any(|listing| listing.id == updated.id) {
            return Err(ListingStoreError::Conflict { id: updated.id });
        }

        current[pos] = updated;
        self.write(&current)?;

        info!(id = %id, fields = ?patch.fields().collect::<Vec<_>>(), "listing updated");
        Ok(true)
    }

    /// Merge a batch of candidates into the collection by id.
    ///
    /// Invalid candidates are skipped. Incoming listings replace stored ones
    /// with the same id in place; new ids are appended. Returns the resulting
    /// collection size.
    pub fn import_listings<I>(&self, items: I) -> Result<usize, ListingStoreError>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut skipped = 0usize;
        let incoming: Vec<Listing> = items
            .into_iter()
            .filter_map(|item| match validate(&item) {
                Ok(listing) => Some(listing),
                Err(err) => {
                    skipped += 1;
                    debug!(error = %err, "skipping invalid import candidate");
                    None
                }
            })
            .collect();

        let _guard = self.lock("import")?;
        let accepted = incoming.len();
        let merged = merge_by_id(self.load(), incoming);
        self.write(&merged)?;

        info!(accepted, skipped, total = merged.len(), "listings imported");
        Ok(merged.len())
    }

    /// Import a backup file's contents (a JSON array of listings).
    pub fn import_json(&self, json: &str) -> Result<usize, ListingStoreError> {
        match serde_json::from_str::<Value>(json)? {
            Value::Array(items) => self.import_listings(items),
            _ => Err(ListingStoreError::InvalidImport(
                "expected a JSON array of listings".to_string(),
            )),
        }
    }

    /// Pretty-printed JSON array of the current collection.
    pub fn export_listings(&self) -> Result<String, ListingStoreError> {
        Ok(serde_json::to_string_pretty(&self.load())?)
    }

    /// Write an export to `path`, returning how many listings it holds.
    pub fn export_to_path(&self, path: impl AsRef<Path>) -> Result<usize, ListingStoreError> {
        let listings = self.load();
        fs::write(path.as_ref(), serde_json::to_string_pretty(&listings)?)?;
        info!(path = %path.as_ref().display(), count = listings.len(), "listings exported");
        Ok(listings.len())
    }

    pub fn import_from_path(&self, path: impl AsRef<Path>) -> Result<usize, ListingStoreError> {
        let contents = fs::read_to_string(path.as_ref())?;
        self.import_json(&contents)
    }

    /// Remove the stored collection. Clearing an empty store succeeds.
    pub fn clear(&self) -> Result<(), ListingStoreError> {
        let _guard = self.lock("clear")?;
        self.backend.remove(&self.key)?;
        info!(key = %self.key, "listings cleared");
        Ok(())
    }

    fn write(&self, listings: &[Listing]) -> Result<(), ListingStoreError> {
        let json = serde_json::to_string(listings)?;
        self.backend.set(&self.key, &json)?;
        debug!(key = %self.key, count = listings.len(), bytes = json.len(), "listings written");
        Ok(())
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, ()>, ListingStoreError> {
        self.write_lock
            .lock()
            .map_err(|_| ListingStoreError::LockPoisoned(operation))
    }
}

impl ListingStore<FileStore> {
    /// Open the file-backed store described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self, ListingStoreError> {
        let backend = FileStore::new(&config.data_dir)?;
        backend.key_path(&config.storage_key)?;
        Ok(Self::with_key(backend, config.storage_key.clone()))
    }
}

fn warn_oversized_images(listing: &Listing) {
    for (idx, image) in listing.images.iter().enumerate() {
        if let Some(size) = image.inline_size() {
            if size > crate::listing::INLINE_IMAGE_BUDGET {
                warn!(id = %listing.id, image = idx, bytes = size, "inline image exceeds budget");
            }
        }
    }
}
