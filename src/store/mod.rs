//! Sticker pack storage.
//!
//! This module contains:
//! - CatalogStore: Locked load-mutate-persist operations over packs and assets
//! - StoreHandle: Background submission with run-to-completion semantics
//! - HiddenPacks: Persisted set of packs suppressed from listings
//! - ChangeNotifier: "Catalog changed" broadcast

pub mod catalog;
pub mod error;
pub mod files;
pub mod hidden;
pub mod notify;
pub mod worker;

// Re-export commonly used types
pub use catalog::{CatalogStore, StickerOptions};
pub use error::StoreError;
pub use hidden::HiddenPacks;
pub use notify::{CatalogChange, ChangeKind, ChangeNotifier};
pub use worker::{StoreHandle, StoreTask};
