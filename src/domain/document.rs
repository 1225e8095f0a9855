//! The catalog metadata document (`contents.json`).
//!
//! Parsing is tolerant of missing or mistyped fields and of non-object
//! entries, but requires the `sticker_packs` array. Serialization keeps pack and sticker order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::identifier::allocate_identifier;
use super::lenient;
use super::pack::{PackRecord, StickerPack, StickerRecord};

/// Errors reading the catalog document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Root of the catalog metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default, deserialize_with = "lenient::string")]
    pub android_play_store_link: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub ios_app_store_link: String,

    /// Packs in display order
    #[serde(deserialize_with = "lenient::required_records")]
    pub sticker_packs: Vec<PackRecord>,
}

impl Default for CatalogDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogDocument {
    /// Create an empty document with blank links
    pub fn new() -> Self {
        Self::with_links("", "")
    }

    /// Create an empty document with the given store links
    pub fn with_links(
        android_play_store_link: impl Into<String>,
        ios_app_store_link: impl Into<String>,
    ) -> Self {
        Self {
            android_play_store_link: android_play_store_link.into(),
            ios_app_store_link: ios_app_store_link.into(),
            sticker_packs: Vec::new(),
        }
    }

    /// Parse a document from raw bytes
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serialize the document to bytes
    pub fn serialize(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Find a pack by identifier
    pub fn find_pack(&self, identifier: &str) -> Option<&PackRecord> {
        self.sticker_packs.iter().find(|p| p.identifier == identifier)
    }

    /// Find a pack by identifier for mutation
    pub fn find_pack_mut(&mut self, identifier: &str) -> Option<&mut PackRecord> {
        self.sticker_packs
            .iter_mut()
            .find(|p| p.identifier == identifier)
    }

    /// Find a sticker inside a pack
    pub fn find_sticker(&self, identifier: &str, image_file: &str) -> Option<&StickerRecord> {
        self.find_pack(identifier)?.find_sticker(image_file)
    }

    /// Remove the first pack with the given identifier
    pub fn remove_pack(&mut self, identifier: &str) -> Option<PackRecord> {
        let pos = self
            .sticker_packs
            .iter()
            .position(|p| p.identifier == identifier)?;
        Some(self.sticker_packs.remove(pos))
    }

    /// Allocate an identifier for a new pack named `name`
    pub fn allocate_identifier(&self, name: &str) -> String {
        allocate_identifier(name, self.sticker_packs.iter().map(|p| p.identifier.as_str()))
    }

    /// Caller-facing views of every usable pack, in document order
    pub fn packs(&self) -> Vec<StickerPack> {
        self.sticker_packs
            .iter()
            .filter_map(|p| self.view(p))
            .collect()
    }

    /// Caller-facing view of one pack
    pub fn pack(&self, identifier: &str) -> Option<StickerPack> {
        self.find_pack(identifier).and_then(|p| self.view(p))
    }

    fn view(&self, record: &PackRecord) -> Option<StickerPack> {
        StickerPack::from_record(record, &self.android_play_store_link, &self.ios_app_store_link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CatalogDocument {
        let mut doc = CatalogDocument::with_links("https://play.example", "");
        let mut cats = PackRecord::new("cats", "Cats", "Acme", "1700000000000");
        cats.stickers.push(StickerRecord::new("sticker_1.webp", Vec::new()));
        cats.stickers.push(
            StickerRecord::new("sticker_2.webp", vec!["😺".to_string()])
                .with_accessibility_text("a cat"),
        );
        doc.sticker_packs.push(cats);
        doc.sticker_packs
            .push(PackRecord::new("dogs", "Dogs", "Acme", "1700000000001"));
        doc
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let doc = sample();
        let bytes = doc.serialize().unwrap();
        let parsed = CatalogDocument::parse(&bytes).unwrap();

        assert_eq!(parsed, doc);
        assert_eq!(parsed.sticker_packs[0].identifier, "cats");
        assert_eq!(parsed.sticker_packs[1].identifier, "dogs");
        assert_eq!(parsed.sticker_packs[0].stickers[1].image_file, "sticker_2.webp");
    }

    #[test]
    fn test_serialized_field_names() {
        let bytes = sample().serialize().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["android_play_store_link"], "https://play.example");
        assert_eq!(value["ios_app_store_link"], "");
        let pack = &value["sticker_packs"][0];
        for field in [
            "identifier",
            "name",
            "publisher",
            "tray_image_file",
            "publisher_email",
            "publisher_website",
            "privacy_policy_website",
            "license_agreement_website",
            "image_data_version",
            "animated_sticker_pack",
            "stickers",
        ] {
            assert!(pack.get(field).is_some(), "missing field {}", field);
        }
        assert!(pack["image_data_version"].is_string());
        assert_eq!(pack["stickers"][1]["accessibility_text"], "a cat");
        assert!(pack["stickers"][0].get("accessibility_text").is_none());
    }

    #[test]
    fn test_parse_tolerates_missing_optional_fields() {
        let doc = CatalogDocument::parse(
            br#"{"sticker_packs": [{"identifier": "x", "stickers": [{"image_file": "a.webp"}]}]}"#,
        )
        .unwrap();

        assert_eq!(doc.android_play_store_link, "");
        let pack = doc.find_pack("x").unwrap();
        assert_eq!(pack.tray_image_file, "tray.png");
        assert_eq!(pack.image_data_version, "");
        assert!(pack.stickers[0].emojis.is_empty());
        assert_eq!(pack.stickers[0].size, None);
    }

    #[test]
    fn test_parse_skips_bad_entries_and_coerces_fields() {
        let doc = CatalogDocument::parse(
            r#"{"sticker_packs": [
                null,
                "junk",
                {"identifier": "x", "animated_sticker_pack": "true", "avoid_cache": 1,
                 "stickers": [null, {"image_file": "a.webp", "size": -1, "emojis": ["😀", 7]},
                              {"image_file": "b.webp", "size": "oops", "accessibility_text": 3}]}
            ]}"#
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(doc.sticker_packs.len(), 1);
        let pack = doc.find_pack("x").unwrap();
        assert!(pack.animated_sticker_pack);
        assert!(!pack.avoid_cache);
        assert_eq!(pack.stickers.len(), 2);
        assert_eq!(pack.stickers[0].size, None);
        assert_eq!(pack.stickers[0].emojis, vec!["😀".to_string()]);
        assert_eq!(pack.stickers[1].size, None);
        assert_eq!(pack.stickers[1].accessibility_text, None);
    }

    #[test]
    fn test_parse_requires_pack_list() {
        assert!(CatalogDocument::parse(br#"{"android_play_store_link": ""}"#).is_err());
        assert!(CatalogDocument::parse(br#"{"sticker_packs": null}"#).is_err());
        assert!(CatalogDocument::parse(b"not json").is_err());
    }

    #[test]
    fn test_find_and_remove() {
        let mut doc = sample();

        assert!(doc.find_sticker("cats", "sticker_2.webp").is_some());
        assert!(doc.find_sticker("cats", "missing.webp").is_none());
        assert!(doc.find_sticker("birds", "sticker_1.webp").is_none());

        assert!(doc.remove_pack("cats").is_some());
        assert!(doc.remove_pack("cats").is_none());
        assert_eq!(doc.sticker_packs.len(), 1);
    }

    #[test]
    fn test_allocate_identifier_uses_existing_packs() {
        let doc = sample();
        assert_eq!(doc.allocate_identifier("Cats"), "cats_1");
        assert_eq!(doc.allocate_identifier("Birds"), "birds");
    }

    #[test]
    fn test_views_carry_links() {
        let doc = sample();
        let packs = doc.packs();

        assert_eq!(packs.len(), 2);
        assert_eq!(packs[0].android_play_store_link, "https://play.example");
        assert_eq!(doc.pack("dogs").unwrap().name(), "Dogs");
    }
}
