//! File-backed store and backup files.

use std::fs;

use rental_listings::{FileStore, ListingStore, ListingStoreError, StoreConfig, STORAGE_KEY};

use crate::support::{catan, listing, AZUL_ID, CATAN_ID};

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    let store = ListingStore::new(FileStore::new(dir.path()).unwrap());
    store.add(catan()).unwrap();
    drop(store);

    let reopened = ListingStore::new(FileStore::new(dir.path()).unwrap());
    assert_eq!(reopened.load(), vec![catan()]);
    assert!(dir.path().join(format!("{}.json", STORAGE_KEY)).exists());
}

#[test]
fn open_uses_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        storage_key: "listings_test".to_string(),
        data_dir: dir.path().join("store"),
    };

    let store = ListingStore::open(&config).unwrap();
    store.add(catan()).unwrap();

    assert_eq!(store.key(), "listings_test");
    assert!(dir.path().join("store").join("listings_test.json").exists());
}

#[test]
fn open_rejects_unusable_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        storage_key: "../escape".to_string(),
        data_dir: dir.path().to_path_buf(),
    };

    assert!(matches!(
        ListingStore::open(&config),
        Err(ListingStoreError::Storage(_))
    ));
}

#[test]
fn corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(format!("{}.json", STORAGE_KEY)), "\u{0}garbage").unwrap();

    let store = ListingStore::new(FileStore::new(dir.path()).unwrap());
    assert!(store.load().is_empty());

    store.add(catan()).unwrap();
    assert_eq!(store.load().len(), 1);
}

#[test]
fn backup_file_restores_into_another_store() {
    let dir = tempfile::tempdir().unwrap();
    let backup = dir.path().join("my-listings.json");

    let source = ListingStore::new(FileStore::new(dir.path().join("a")).unwrap());
    source.add(catan()).unwrap();
    source.add(listing(AZUL_ID, "Azul")).unwrap();
    assert_eq!(source.export_to_path(&backup).unwrap(), 2);

    let target = ListingStore::new(FileStore::new(dir.path().join("b")).unwrap());
    target.add(listing(CATAN_ID, "Stale title")).unwrap();

    assert_eq!(target.import_from_path(&backup).unwrap(), 2);
    assert_eq!(target.get(CATAN_ID).unwrap().title, "Catan");
}

#[test]
fn missing_backup_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = ListingStore::new(FileStore::new(dir.path()).unwrap());

    let err = store.import_from_path(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ListingStoreError::Io(_)));
}
