//! "Catalog changed" broadcast for out-of-band consumers.
//!
//! Delivery is fire-and-forget: a send with no live subscribers is not an
//! error, and slow subscribers simply lag.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// Buffered changes per subscriber before it starts lagging
const CHANNEL_CAPACITY: usize = 64;

/// What changed in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    PackCreated,
    StickerAdded { image_file: String },
    StickerRemoved { image_file: String },
    PackDeleted,
    PackHidden,
}

/// A single committed catalog change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogChange {
    pub identifier: String,
    #[serde(flatten)]
    pub kind: ChangeKind,
    pub at: DateTime<Utc>,
}

impl CatalogChange {
    pub fn new(identifier: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
            at: Utc::now(),
        }
    }
}

/// Broadcasts committed changes to any number of subscribers
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<CatalogChange>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future changes
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogChange> {
        self.tx.subscribe()
    }

    /// Publish a change; never fails
    pub fn notify(&self, change: CatalogChange) {
        if let Err(e) = self.tx.send(change) {
            debug!(identifier = %e.0.identifier, "No subscribers for catalog change");
        }
    }
}
