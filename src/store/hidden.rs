//! Hidden-pack set.
//!
//! Identifiers of packs suppressed from listings without being deleted.
//! Stored in `prefs.json`, separate from the catalog document.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::StoreError;
use super::files::{read_optional, write_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Prefs {
    #[serde(default)]
    hidden_packs: BTreeSet<String>,
}

/// Persisted set of hidden pack identifiers
#[derive(Debug, Clone)]
pub struct HiddenPacks {
    path: PathBuf,
}

impl HiddenPacks {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the current set; unreadable prefs count as empty
    pub fn load(&self) -> BTreeSet<String> {
        let bytes = match read_optional(&self.path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return BTreeSet::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read hidden packs");
                return BTreeSet::new();
            }
        };

        match serde_json::from_slice::<Prefs>(&bytes) {
            Ok(prefs) => prefs.hidden_packs,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring malformed prefs");
                BTreeSet::new()
            }
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.load().contains(identifier)
    }

    /// Add `identifier`; returns false if it was already hidden
    pub fn insert(&self, identifier: &str) -> Result<bool, StoreError> {
        let mut hidden_packs = self.load();
        if !hidden_packs.insert(identifier.to_string()) {
            return Ok(false);
        }

        let prefs = Prefs { hidden_packs };
        let bytes = serde_json::to_vec_pretty(&prefs).map_err(|e| {
            StoreError::io("Failed to serialize prefs", std::io::Error::other(e))
        })?;
        write_atomic(&self.path, &bytes)?;
        Ok(true)
    }
}
