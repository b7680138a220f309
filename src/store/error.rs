use thiserror::Error;

use crate::kv::StorageError;
use crate::listing::ValidationError;

/// Error type for `ListingStore` operations.
#[derive(Debug, Error)]
pub enum ListingStoreError {
    /// The candidate (or merged) record failed schema validation.
    #[error("invalid listing: {0}")]
    Validation(#[from] ValidationError),

    /// A different listing already uses this id.
    #[error("listing {id} already exists")]
    Conflict { id: String },

    /// The backing key-value store rejected the write.
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("listing serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// An import payload was well-formed JSON but not a listing array.
    #[error("invalid import file: {0}")]
    InvalidImport(String),

    #[error("listing store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("backup file io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ListingStoreError {
    /// Schema violation messages, when this is a validation failure.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            ListingStoreError::Validation(err) => Some(err.messages()),
            _ => None,
        }
    }
}
