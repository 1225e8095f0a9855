//! stickerbook - Local sticker pack catalog
//!
//! A file-backed catalog of sticker packs plus the pipeline that turns
//! arbitrary images into size-budgeted sticker assets.
//!
//! # Architecture
//!
//! - A JSON document (`contents.json`) lists packs and their stickers
//! - Assets live under `packs/<identifier>/`, referenced by filename only
//! - Every mutation reloads the document, applies one change, and persists
//!   it atomically under a single store-wide lock
//!
//! # Modules
//!
//! - `transcode`: Image normalization and tray icons
//! - `domain`: Catalog document, records, identifier allocation
//! - `store`: Mutation surface, hidden packs, change broadcast, async handle
//! - `config`: Configuration and on-disk layout
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! stickerbook create "My Pack" --publisher Acme
//! stickerbook add my_pack ./cat.jpg --emoji 😺
//! stickerbook list
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod store;
pub mod transcode;

// Re-export main types at crate root for convenience
pub use config::StoreLayout;
pub use domain::{CatalogDocument, DocumentError, PackRecord, StickerPack, StickerRecord};
pub use store::{
    CatalogChange, CatalogStore, ChangeKind, StickerOptions, StoreError, StoreHandle, StoreTask,
};
pub use transcode::{TranscodeError, TranscodeSettings, Transcoder};
