//! Concurrency Integration Tests
//!
//! Tests for the store-wide lock, lost-update freedom, and run-to-completion
//! of submitted operations.

mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{gradient_png, open_store};
use stickerbook::{CatalogDocument, ChangeKind, StickerOptions, StoreHandle};

#[test]
fn test_parallel_creates_lose_nothing() {
    let (store, _temp) = open_store();
    let store = Arc::new(store);

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store.create_pack(&format!("Pack {}", i % 2), "Acme").unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let mut ids: Vec<String> = store
        .load_packs()
        .iter()
        .map(|p| p.identifier().to_string())
        .collect();
    ids.sort();

    assert_eq!(ids.len(), 8);
    ids.dedup();
    assert_eq!(ids.len(), 8);
}

#[test]
fn test_parallel_adds_to_independent_packs() {
    let (store, _temp) = open_store();
    store.create_pack("Cats", "Acme").unwrap();
    store.create_pack("Dogs", "Acme").unwrap();
    let store = Arc::new(store);

    let workers: Vec<_> = ["cats", "dogs", "cats", "dogs"]
        .into_iter()
        .map(|id| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store
                    .add_sticker(id, &gradient_png(80, 80), StickerOptions::default())
                    .unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let bytes = std::fs::read(store.layout().metadata_file()).unwrap();
    let doc = CatalogDocument::parse(&bytes).unwrap();
    assert_eq!(doc.find_pack("cats").unwrap().stickers.len(), 2);
    assert_eq!(doc.find_pack("dogs").unwrap().stickers.len(), 2);

    for pack in &doc.sticker_packs {
        for sticker in &pack.stickers {
            assert!(store.asset_path(&pack.identifier, &sticker.image_file).is_file());
        }
    }
}

#[test]
fn test_racing_delete_and_add_on_same_pack_stay_consistent() {
    let (store, _temp) = open_store();
    store.create_pack("Cats", "Acme").unwrap();
    let store = Arc::new(store);

    let adder = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store.add_sticker("cats", &gradient_png(64, 64), StickerOptions::default())
        })
    };
    let deleter = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.delete_pack("cats"))
    };

    let added = adder.join().unwrap();
    assert!(deleter.join().unwrap().unwrap());

    // Whichever ran first, the pack is gone and the document parses
    if let Err(e) = added {
        assert!(e.is_not_found());
    }
    let bytes = std::fs::read(store.layout().metadata_file()).unwrap();
    let doc = CatalogDocument::parse(&bytes).unwrap();
    assert!(doc.find_pack("cats").is_none());
    assert!(!store.layout().pack_dir("cats").exists());
}

#[tokio::test]
async fn test_handle_round_trip() {
    let (store, _temp) = open_store();
    let handle = StoreHandle::new(store);

    let pack = handle.create_pack("Cats", "Acme").await.unwrap();
    assert_eq!(pack.identifier(), "cats");

    let pack = handle
        .add_sticker("cats", gradient_png(64, 64), StickerOptions::default())
        .await
        .unwrap();
    let file = pack.stickers()[0].image_file.clone();

    let pack = handle.remove_sticker("cats", file).await.unwrap();
    assert!(pack.stickers().is_empty());

    handle.hide_pack("bundled").await.unwrap();
    assert!(handle.is_pack_hidden("bundled").await.unwrap());

    assert!(handle.delete_pack("cats").await.unwrap());
    assert!(handle.load_packs().await.is_empty());
}

#[tokio::test]
async fn test_abandoned_operation_still_completes() {
    let (store, _temp) = open_store();
    let handle = StoreHandle::new(store);
    handle.create_pack("Cats", "Acme").await.unwrap();
    let mut changes = handle.subscribe();

    let task = handle.add_sticker("cats", gradient_png(400, 300), StickerOptions::default());
    drop(task);

    let change = tokio::time::timeout(Duration::from_secs(30), changes.recv())
        .await
        .expect("operation did not complete")
        .unwrap();
    assert_eq!(change.identifier, "cats");
    assert!(matches!(change.kind, ChangeKind::StickerAdded { .. }));

    let packs = handle.load_packs().await;
    assert_eq!(packs[0].stickers().len(), 1);
}

#[tokio::test]
async fn test_every_mutation_is_broadcast() {
    let (store, _temp) = open_store();
    let handle = StoreHandle::new(store);
    let mut changes = handle.subscribe();

    handle.create_pack("Cats", "Acme").await.unwrap();
    handle.delete_pack("cats").await.unwrap();
    handle.delete_pack("cats").await.unwrap();

    assert_eq!(changes.recv().await.unwrap().kind, ChangeKind::PackCreated);
    assert_eq!(changes.recv().await.unwrap().kind, ChangeKind::PackDeleted);
    assert!(changes.try_recv().is_err());
}
