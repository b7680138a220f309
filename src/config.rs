use anyhow::{ensure, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

use crate::store::STORAGE_KEY;

pub const DEFAULT_DATA_DIR: &str = "./data";

/// Where the file-backed listing store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let storage_key = lookup("LISTINGS_STORAGE_KEY").unwrap_or(defaults.storage_key);
        ensure!(
            !storage_key.trim().is_empty(),
            "LISTINGS_STORAGE_KEY must not be empty"
        );

        let data_dir = lookup("LISTINGS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        Ok(Self {
            storage_key,
            data_dir,
        })
    }
}
