//! Async front end for the catalog store.
//!
//! Every call is handed to tokio's blocking pool as soon as it is made.
//! The returned [`StoreTask`] only delivers the result: dropping it does not
//! cancel the operation, which always runs to completion and persists.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::domain::StickerPack;

use super::catalog::{CatalogStore, StickerOptions};
use super::error::StoreError;
use super::notify::CatalogChange;

/// Result of an operation submitted to the store
#[must_use = "dropping a StoreTask discards the result, not the operation"]
#[derive(Debug)]
pub struct StoreTask<T> {
    handle: JoinHandle<Result<T, StoreError>>,
}

impl<T> Future for StoreTask<T> {
    type Output = Result<T, StoreError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) => Err(StoreError::Worker(e.to_string())),
        })
    }
}

/// Cloneable handle submitting store operations to background workers
///
/// Methods must be called from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    store: Arc<CatalogStore>,
}

impl StoreHandle {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// The underlying synchronous store
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Subscribe to committed catalog changes
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogChange> {
        self.store.notifier().subscribe()
    }

    fn submit<T, F>(&self, op: F) -> StoreTask<T>
    where
        T: Send + 'static,
        F: FnOnce(&CatalogStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        StoreTask {
            handle: tokio::task::spawn_blocking(move || op(store.as_ref())),
        }
    }

    pub fn create_pack(
        &self,
        name: impl Into<String>,
        publisher: impl Into<String>,
    ) -> StoreTask<StickerPack> {
        let (name, publisher) = (name.into(), publisher.into());
        self.submit(move |store| store.create_pack(&name, &publisher))
    }

    pub fn add_sticker(
        &self,
        identifier: impl Into<String>,
        source: Vec<u8>,
        options: StickerOptions,
    ) -> StoreTask<StickerPack> {
        let identifier = identifier.into();
        self.submit(move |store| store.add_sticker(&identifier, &source, options))
    }

    pub fn remove_sticker(
        &self,
        identifier: impl Into<String>,
        image_file: impl Into<String>,
    ) -> StoreTask<StickerPack> {
        let (identifier, image_file) = (identifier.into(), image_file.into());
        self.submit(move |store| store.remove_sticker(&identifier, &image_file))
    }

    pub fn delete_pack(&self, identifier: impl Into<String>) -> StoreTask<bool> {
        let identifier = identifier.into();
        self.submit(move |store| store.delete_pack(&identifier))
    }

    pub fn hide_pack(&self, identifier: impl Into<String>) -> StoreTask<()> {
        let identifier = identifier.into();
        self.submit(move |store| store.hide_pack(&identifier))
    }

    pub fn is_pack_hidden(&self, identifier: impl Into<String>) -> StoreTask<bool> {
        let identifier = identifier.into();
        self.submit(move |store| Ok(store.is_pack_hidden(&identifier)))
    }

    /// List packs; a failed worker yields an empty list like any other error
    pub async fn load_packs(&self) -> Vec<StickerPack> {
        match self.submit(|store| Ok(store.load_packs())).await {
            Ok(packs) => packs,
            Err(e) => {
                warn!(error = %e, "Failed to load sticker packs");
                Vec::new()
            }
        }
    }
}
