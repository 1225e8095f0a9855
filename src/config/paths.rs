//! On-disk layout of a sticker store.
//!
//! ```text
//! <root>/
//! ├── contents.json             # Catalog document
//! ├── prefs.json                # Hidden-pack set
//! ├── .lock                     # Advisory writer lock
//! └── packs/
//!     └── <identifier>/
//!         ├── tray.png
//!         └── sticker_<millis>.webp
//! ```

use std::path::{Path, PathBuf};

/// Catalog document filename
pub const METADATA_FILE: &str = "contents.json";

/// Directory holding one subdirectory per pack
pub const PACKS_FOLDER: &str = "packs";

/// Small key/value preferences file
pub const PREFS_FILE: &str = "prefs.json";

/// Lock file guarding the read-modify-write cycle
pub const LOCK_FILE: &str = ".lock";

/// Resolves every path the store touches from a single root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn prefs_file(&self) -> PathBuf {
        self.root.join(PREFS_FILE)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    pub fn packs_dir(&self) -> PathBuf {
        self.root.join(PACKS_FOLDER)
    }

    /// Asset directory of one pack
    pub fn pack_dir(&self, identifier: &str) -> PathBuf {
        self.packs_dir().join(identifier)
    }

    /// Path of one asset inside a pack directory
    pub fn asset_file(&self, identifier: &str, filename: &str) -> PathBuf {
        self.pack_dir(identifier).join(filename)
    }
}
