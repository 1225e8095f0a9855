//! Catalog data model.
//!
//! This module contains:
//! - Pack and sticker records plus the caller-facing pack view
//! - The catalog document with its parse/serialize and queries
//! - Identifier allocation for new packs

pub mod document;
pub mod identifier;
mod lenient;
pub mod pack;

// Re-export commonly used types
pub use document::{CatalogDocument, DocumentError};
pub use identifier::{allocate_identifier, is_valid_identifier, slugify};
pub use pack::{PackRecord, StickerPack, StickerRecord, DEFAULT_STICKER_EMOJI, DEFAULT_TRAY_FILE};
