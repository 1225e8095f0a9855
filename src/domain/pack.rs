//! Pack and sticker records as stored in the catalog document.
//!
//! Records mirror the persisted JSON field-for-field. `StickerPack` is the
//! read-side view handed to callers after a listing or a mutation.

use serde::{Deserialize, Deserializer, Serialize};

use super::lenient;

/// Tray image filename used when a pack does not name one
pub const DEFAULT_TRAY_FILE: &str = "tray.png";

/// Placeholder emoji attached to stickers added without tags
pub const DEFAULT_STICKER_EMOJI: &str = "\u{1F642}";

fn default_tray_file() -> String {
    DEFAULT_TRAY_FILE.to_string()
}

fn tray_file_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let file = lenient::string(deserializer)?;
    Ok(if file.is_empty() { default_tray_file() } else { file })
}

/// A pack entry in the catalog document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackRecord {
    /// Catalog-unique slug, also the name of the pack's asset directory
    #[serde(default, deserialize_with = "lenient::string")]
    pub identifier: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub publisher: String,

    #[serde(default = "default_tray_file", deserialize_with = "tray_file_or_default")]
    pub tray_image_file: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub publisher_email: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub publisher_website: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub privacy_policy_website: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub license_agreement_website: String,

    /// Opaque change stamp read by downstream consumers
    #[serde(default, deserialize_with = "lenient::string")]
    pub image_data_version: String,

    #[serde(
        default,
        deserialize_with = "lenient::boolean",
        skip_serializing_if = "is_false"
    )]
    pub avoid_cache: bool,

    #[serde(default, deserialize_with = "lenient::boolean")]
    pub animated_sticker_pack: bool,

    #[serde(default, deserialize_with = "lenient::records")]
    pub stickers: Vec<StickerRecord>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PackRecord {
    /// Create an empty, non-animated pack
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        publisher: impl Into<String>,
        image_data_version: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            publisher: publisher.into(),
            tray_image_file: default_tray_file(),
            publisher_email: String::new(),
            publisher_website: String::new(),
            privacy_policy_website: String::new(),
            license_agreement_website: String::new(),
            image_data_version: image_data_version.into(),
            avoid_cache: false,
            animated_sticker_pack: false,
            stickers: Vec::new(),
        }
    }

    /// Find a sticker by its image filename
    pub fn find_sticker(&self, image_file: &str) -> Option<&StickerRecord> {
        self.stickers.iter().find(|s| s.image_file == image_file)
    }

    /// Remove the first sticker with the given filename
    pub fn remove_sticker(&mut self, image_file: &str) -> Option<StickerRecord> {
        let pos = self.stickers.iter().position(|s| s.image_file == image_file)?;
        Some(self.stickers.remove(pos))
    }
}

/// A sticker entry inside a pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerRecord {
    /// Asset filename inside the pack directory
    #[serde(default, deserialize_with = "lenient::string")]
    pub image_file: String,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub emojis: Vec<String>,

    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub accessibility_text: Option<String>,

    /// Byte size of the asset, if known
    #[serde(
        default,
        deserialize_with = "lenient::byte_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u64>,
}

impl StickerRecord {
    /// Create a sticker record; empty `emojis` gets the placeholder emoji
    pub fn new(image_file: impl Into<String>, emojis: Vec<String>) -> Self {
        let emojis = if emojis.iter().all(|e| e.is_empty()) {
            vec![DEFAULT_STICKER_EMOJI.to_string()]
        } else {
            emojis.into_iter().filter(|e| !e.is_empty()).collect()
        };

        Self {
            image_file: image_file.into(),
            emojis,
            accessibility_text: None,
            size: None,
        }
    }

    /// Set the accessibility text
    pub fn with_accessibility_text(mut self, text: impl Into<String>) -> Self {
        self.accessibility_text = Some(text.into());
        self
    }
}

/// A pack as presented to callers
///
/// Carries the catalog-wide store links alongside the record, with
/// unusable sticker entries filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerPack {
    pub record: PackRecord,
    pub android_play_store_link: String,
    pub ios_app_store_link: String,
}

impl StickerPack {
    /// Build a view from a record, or `None` if the record has no identifier
    pub fn from_record(
        record: &PackRecord,
        android_play_store_link: &str,
        ios_app_store_link: &str,
    ) -> Option<Self> {
        if record.identifier.is_empty() {
            return None;
        }

        let mut record = record.clone();
        record.stickers = record
            .stickers
            .into_iter()
            .filter(|s| !s.image_file.is_empty())
            .map(|mut s| {
                s.emojis.retain(|e| !e.is_empty());
                s.size = s.size.filter(|size| *size > 0);
                s
            })
            .collect();

        Some(Self {
            record,
            android_play_store_link: android_play_store_link.to_string(),
            ios_app_store_link: ios_app_store_link.to_string(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.record.identifier
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn publisher(&self) -> &str {
        &self.record.publisher
    }

    pub fn tray_image_file(&self) -> &str {
        &self.record.tray_image_file
    }

    pub fn image_data_version(&self) -> &str {
        &self.record.image_data_version
    }

    pub fn stickers(&self) -> &[StickerRecord] {
        &self.record.stickers
    }
}
