//! Errors surfaced by store operations.

use std::path::Path;

use thiserror::Error;

use crate::domain::DocumentError;
use crate::transcode::TranscodeError;

/// Errors that can occur in the sticker store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Pack not found: {0}")]
    PackNotFound(String),

    #[error("Sticker not found: {identifier}/{image_file}")]
    StickerNotFound {
        identifier: String,
        image_file: String,
    },

    #[error("Refusing to write outside the store: {0}")]
    UnsafePath(String),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Malformed(#[from] DocumentError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Store task failed: {0}")]
    Worker(String),
}

impl StoreError {
    /// Wrap an I/O error with a description of what was attempted
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap an I/O error on `path`
    pub(crate) fn io_at(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::io(format!("Failed to {} {}", action, path.display()), source)
    }

    /// True for a missing pack or sticker
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::PackNotFound(_) | StoreError::StickerNotFound { .. }
        )
    }
}
