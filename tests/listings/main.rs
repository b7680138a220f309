//! Integration tests for ListingStore over the in-memory backend.

mod backups;

use std::sync::Arc;
use std::thread;

use rental_listings::{
    InMemoryStore, KeyValueStore, ListingPatch, ListingStore, ListingStoreError, StorageError,
    Visibility, STORAGE_KEY,
};
use serde_json::json;
use support::{catan, listing, sorted_ids, to_value, AZUL_ID, CATAN_ID, DIXIT_ID};

fn store() -> (ListingStore<InMemoryStore>, InMemoryStore) {
    let backend = InMemoryStore::new();
    (ListingStore::new(backend.clone()), backend)
}

#[test]
fn add_then_load_round_trips() {
    let (store, _) = store();
    let item = catan();

    store.add(item.clone()).unwrap();

    let all = store.load();
    assert_eq!(all, vec![item]);
}

#[test]
fn add_rejects_invalid_listing_without_writing() {
    let (store, backend) = store();
    store.add(listing(AZUL_ID, "Azul")).unwrap();
    let before = backend.get(STORAGE_KEY).unwrap();

    let mut missing_title = catan();
    missing_title.title.clear();
    let mut free = catan();
    free.price_per_day = 0.0;
    let mut no_images = catan();
    no_images.images.clear();

    for candidate in [missing_title, free, no_images] {
        let err = store.add(candidate).unwrap_err();
        assert!(matches!(err, ListingStoreError::Validation(_)), "{}", err);
    }

    assert_eq!(backend.get(STORAGE_KEY).unwrap(), before);
    assert_eq!(store.load().len(), 1);
}

#[test]
fn add_rejects_non_finite_numbers() {
    let (store, backend) = store();
    store.add(listing(AZUL_ID, "Azul")).unwrap();
    let before = backend.get(STORAGE_KEY).unwrap();

    let mut item = catan();
    item.deposit = Some(f64::NAN);
    item.rating = Some(f64::INFINITY);

    let err = store.add(item).unwrap_err();
    assert_eq!(
        err.validation_messages().unwrap(),
        &[
            "rating: expected a number".to_string(),
            "deposit: expected a number".to_string(),
        ]
    );
    assert_eq!(backend.get(STORAGE_KEY).unwrap(), before);
    assert_eq!(store.load(), vec![listing(AZUL_ID, "Azul")]);
}

#[test]
fn add_reports_all_messages() {
    let (store, _) = store();
    let mut item = catan();
    item.title.clear();
    item.price_per_day = -1.0;

    let err = store.add(item).unwrap_err();
    assert_eq!(
        err.validation_messages().unwrap(),
        &[
            "title: title is required".to_string(),
            "pricePerDay: price per day must be greater than 0".to_string(),
        ]
    );
}

#[test]
fn add_rejects_duplicate_id() {
    let (store, _) = store();
    store.add(catan()).unwrap();

    let err = store.add(listing(CATAN_ID, "Catan again")).unwrap_err();
    assert!(matches!(err, ListingStoreError::Conflict { ref id } if id == CATAN_ID));
    assert_eq!(store.load().len(), 1);
}

#[test]
fn load_missing_key_is_empty() {
    let (store, _) = store();
    assert!(store.load().is_empty());
}

#[test]
fn load_treats_corrupt_json_as_empty() {
    let (store, backend) = store();
    backend.set(STORAGE_KEY, "{not json").unwrap();
    assert!(store.load().is_empty());

    backend.set(STORAGE_KEY, r#"{"id": "x"}"#).unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn load_skips_invalid_entries() {
    let (store, backend) = store();
    let valid = to_value(&catan());
    let mut broken = to_value(&listing(AZUL_ID, "Azul"));
    broken.as_object_mut().unwrap().remove("category");

    backend
        .set(STORAGE_KEY, &json!([broken, valid, 42]).to_string())
        .unwrap();

    assert_eq!(store.load(), vec![catan()]);
}

#[test]
fn update_merges_patch() {
    let (store, _) = store();
    store.add(listing(AZUL_ID, "Azul")).unwrap();
    store.add(catan()).unwrap();

    let applied = store
        .update(CATAN_ID, &ListingPatch::new().price_per_day(150.0))
        .unwrap();
    assert!(applied);

    let all = store.load();
    let mut expected = catan();
    expected.price_per_day = 150.0;
    assert_eq!(all[1], expected);
    assert_eq!(all[0].title, "Azul");
}

#[test]
fn update_can_unset_optional_fields() {
    let (store, _) = store();
    store.add(catan()).unwrap();

    store
        .update(CATAN_ID, &ListingPatch::new().unset("publisher").unset("deposit"))
        .unwrap();

    let stored = store.get(CATAN_ID).unwrap();
    assert_eq!(stored.publisher, None);
    assert_eq!(stored.deposit, None);
}

#[test]
fn update_missing_id_is_noop() {
    let (store, backend) = store();
    store.add(catan()).unwrap();
    let before = backend.get(STORAGE_KEY).unwrap();

    let applied = store
        .update("nonexistent-uuid", &ListingPatch::new().title("x"))
        .unwrap();

    assert!(!applied);
    assert_eq!(backend.get(STORAGE_KEY).unwrap(), before);
}

#[test]
fn update_rejects_invalid_merge() {
    let (store, _) = store();
    store.add(catan()).unwrap();

    let err = store
        .update(CATAN_ID, &ListingPatch::new().deposit(-1.0).title(""))
        .unwrap_err();
    assert_eq!(err.validation_messages().unwrap().len(), 2);
    assert_eq!(store.load(), vec![catan()]);
}

#[test]
fn update_rejects_id_collision() {
    let (store, _) = store();
    store.add(catan()).unwrap();
    store.add(listing(AZUL_ID, "Azul")).unwrap();

    let err = store
        .update(AZUL_ID, &ListingPatch::new().set("id", CATAN_ID))
        .unwrap_err();
    assert!(matches!(err, ListingStoreError::Conflict { .. }));
    assert_eq!(store.get(AZUL_ID).unwrap().title, "Azul");
}

#[test]
fn import_merges_by_id() {
    let (store, _) = store();
    store.add(listing(CATAN_ID, "Old")).unwrap();
    store.add(listing(AZUL_ID, "Azul")).unwrap();

    let total = store
        .import_listings(vec![
            to_value(&listing(CATAN_ID, "New")),
            to_value(&listing(DIXIT_ID, "Dixit")),
        ])
        .unwrap();
    assert_eq!(total, 3);

    let all = store.load();
    let titles: Vec<_> = all.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["New", "Azul", "Dixit"]);
    assert_eq!(all.iter().filter(|l| l.id == CATAN_ID).count(), 1);
}

#[test]
fn import_skips_invalid_candidates() {
    let (store, _) = store();
    let mut broken = to_value(&listing(AZUL_ID, "Azul"));
    broken["pricePerDay"] = json!(0);

    let total = store
        .import_listings(vec![broken, json!("junk"), to_value(&catan())])
        .unwrap();

    assert_eq!(total, 1);
    assert_eq!(store.load(), vec![catan()]);
}

#[test]
fn import_json_requires_array() {
    let (store, _) = store();

    let err = store.import_json(r#"{"listings": []}"#).unwrap_err();
    assert!(matches!(err, ListingStoreError::InvalidImport(_)));

    let err = store.import_json("not json").unwrap_err();
    assert!(matches!(err, ListingStoreError::Serde(_)));
}

#[test]
fn export_import_round_trip() {
    let (store, _) = store();
    store.add(catan()).unwrap();
    store.add(listing(AZUL_ID, "Azul")).unwrap();
    let mut private = listing(DIXIT_ID, "Dixit");
    private.visibility = Visibility::Private;
    private.publisher = None;
    store.add(private).unwrap();
    let before = store.load();

    let exported = store.export_listings().unwrap();
    assert!(exported.contains("\n  {"));

    store.clear().unwrap();
    assert!(store.load().is_empty());

    let total = store.import_json(&exported).unwrap();
    assert_eq!(total, 3);

    let after = store.load();
    assert_eq!(sorted_ids(&after), sorted_ids(&before));
    for item in &before {
        assert!(after.contains(item));
    }
}

#[test]
fn clear_is_idempotent() {
    let (store, _) = store();
    store.add(catan()).unwrap();

    store.clear().unwrap();
    assert!(store.load().is_empty());
    store.clear().unwrap();
    assert!(store.load().is_empty());
}

#[test]
fn save_overwrites_and_validates() {
    let (store, backend) = store();
    store.add(catan()).unwrap();

    store.save(&[listing(AZUL_ID, "Azul")]).unwrap();
    assert_eq!(store.load().len(), 1);
    assert_eq!(store.load()[0].id, AZUL_ID);

    let mut bad = listing(DIXIT_ID, "Dixit");
    bad.category.clear();
    let err = store.save(&[catan(), bad]).unwrap_err();
    assert_eq!(
        err.validation_messages().unwrap(),
        &["[1].category: category is required".to_string()]
    );
    assert!(backend.get(STORAGE_KEY).unwrap().unwrap().contains(AZUL_ID));
}

#[test]
fn save_rejects_duplicate_ids() {
    let (store, backend) = store();
    store.add(listing(AZUL_ID, "Azul")).unwrap();
    let before = backend.get(STORAGE_KEY).unwrap();

    let err = store
        .save(&[catan(), listing(AZUL_ID, "Azul"), listing(CATAN_ID, "Catan copy")])
        .unwrap_err();
    assert!(matches!(err, ListingStoreError::Conflict { ref id } if id == CATAN_ID));
    assert_eq!(backend.get(STORAGE_KEY).unwrap(), before);
}

#[test]
fn import_accepts_timestamp_without_offset() {
    let (store, _) = store();
    let mut item = to_value(&catan());
    item["createdAt"] = json!("2024-05-01T12:00:00");

    assert_eq!(store.import_listings(vec![item]).unwrap(), 1);
    let stored = store.get(CATAN_ID).unwrap();
    assert_eq!(stored.created_at, "2024-05-01T12:00:00");
    assert!(stored.created_at_utc().is_some());
}

#[test]
fn storage_failures_propagate() {
    let backend = InMemoryStore::with_quota(64);
    let store = ListingStore::new(backend);

    let err = store.add(catan()).unwrap_err();
    assert!(matches!(
        err,
        ListingStoreError::Storage(StorageError::QuotaExceeded { .. })
    ));
    assert!(store.load().is_empty());
}

#[test]
fn public_listings_hide_private_ones() {
    let (store, _) = store();
    store.add(catan()).unwrap();
    let mut private = listing(AZUL_ID, "Azul");
    private.visibility = Visibility::Private;
    store.add(private).unwrap();

    let public = store.public_listings();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].id, CATAN_ID);
}

#[test]
fn custom_key_isolates_collections() {
    let backend = InMemoryStore::new();
    let first = ListingStore::with_key(backend.clone(), "first");
    let second = ListingStore::with_key(backend, "second");

    first.add(catan()).unwrap();
    assert_eq!(first.load().len(), 1);
    assert!(second.load().is_empty());
}

#[test]
fn concurrent_adds_on_one_store_keep_every_listing() {
    let store = Arc::new(ListingStore::new(InMemoryStore::new()));
    let ids: Vec<String> = (0..8)
        .map(|n| format!("{:08x}-0000-4000-8000-000000000000", n))
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.add(listing(&id, "Copy")).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(sorted_ids(&store.load()), expected);
}
