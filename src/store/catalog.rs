//! The catalog store: every mutation of packs, stickers and their assets.
//!
//! Each operation runs one load-mutate-persist cycle while holding the
//! store's writer lock, so two calls never interleave. Asset files and the
//! metadata document are separate resources; a crash between their updates
//! can leave an orphaned asset or pack directory, never a torn document.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use fs2::FileExt;
use tracing::{debug, info, instrument, warn};

use crate::config::{ResolvedConfig, StoreLayout};
use crate::domain::{
    is_valid_identifier, CatalogDocument, PackRecord, StickerPack, StickerRecord,
    DEFAULT_TRAY_FILE,
};
use crate::transcode::Transcoder;

use super::error::StoreError;
use super::files::{
    is_plain_file_name, read_optional, remove_dir_best_effort, remove_file_best_effort,
    write_atomic, write_file,
};
use super::hidden::HiddenPacks;
use super::notify::{CatalogChange, ChangeKind, ChangeNotifier};

/// Caller-supplied sticker metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StickerOptions {
    /// Tags for the sticker; empty means the placeholder emoji
    pub emojis: Vec<String>,
    pub accessibility_text: Option<String>,
}

impl StickerOptions {
    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emojis.push(emoji.into());
        self
    }

    pub fn with_accessibility_text(mut self, text: impl Into<String>) -> Self {
        self.accessibility_text = Some(text.into());
        self
    }
}

/// Held for the duration of one store operation
struct WriterGuard<'a> {
    file: MutexGuard<'a, File>,
}

impl Drop for WriterGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&*self.file) {
            warn!(error = %e, "Failed to release store lock");
        }
    }
}

/// File-backed sticker pack catalog
#[derive(Debug)]
pub struct CatalogStore {
    layout: StoreLayout,
    transcoder: Transcoder,
    hidden: HiddenPacks,
    notifier: ChangeNotifier,
    android_play_store_link: String,
    ios_app_store_link: String,
    writer: Mutex<File>,
}

impl CatalogStore {
    /// Open (or initialise) a store at `layout`
    ///
    /// Creates the root, the `packs/` directory and the lock file. The
    /// catalog document itself is only written by the first mutation.
    pub fn open(layout: StoreLayout) -> Result<Self, StoreError> {
        let packs_dir = layout.packs_dir();
        fs::create_dir_all(&packs_dir)
            .map_err(|e| StoreError::io_at("create directory", &packs_dir, e))?;

        let lock_path = layout.lock_file();
        let lock_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StoreError::io_at("open lock file", &lock_path, e))?;

        Ok(Self {
            hidden: HiddenPacks::new(layout.prefs_file()),
            layout,
            transcoder: Transcoder::new(),
            notifier: ChangeNotifier::new(),
            android_play_store_link: String::new(),
            ios_app_store_link: String::new(),
            writer: Mutex::new(lock_file),
        })
    }

    /// Open the store described by the resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, StoreError> {
        Ok(Self::open(config.layout())?.with_links(
            &config.catalog.android_play_store_link,
            &config.catalog.ios_app_store_link,
        ))
    }

    /// Links written into a freshly created catalog document
    pub fn with_links(
        mut self,
        android_play_store_link: impl Into<String>,
        ios_app_store_link: impl Into<String>,
    ) -> Self {
        self.android_play_store_link = android_play_store_link.into();
        self.ios_app_store_link = ios_app_store_link.into();
        self
    }

    pub fn with_transcoder(mut self, transcoder: Transcoder) -> Self {
        self.transcoder = transcoder;
        self
    }

    pub fn with_notifier(mut self, notifier: ChangeNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Path of an asset inside a pack directory
    pub fn asset_path(&self, identifier: &str, filename: &str) -> PathBuf {
        self.layout.asset_file(identifier, filename)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All packs in display order
    ///
    /// Never fails: any error is logged and yields an empty list.
    pub fn load_packs(&self) -> Vec<StickerPack> {
        let result = self
            .lock()
            .and_then(|_guard| self.read_document())
            .map(|doc| doc.packs());

        match result {
            Ok(packs) => packs,
            Err(e) => {
                warn!(error = %e, "Failed to load sticker packs");
                Vec::new()
            }
        }
    }

    /// True if `identifier` belongs to a pack in this catalog
    pub fn is_custom_pack(&self, identifier: &str) -> bool {
        self.load_packs()
            .iter()
            .any(|p| p.identifier() == identifier)
    }

    /// True if `identifier` is in the hidden-pack set
    pub fn is_pack_hidden(&self, identifier: &str) -> bool {
        match self.lock() {
            Ok(_guard) => self.hidden.contains(identifier),
            Err(e) => {
                warn!(error = %e, "Failed to check hidden packs");
                false
            }
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create an empty pack with a blank tray icon
    #[instrument(skip(self))]
    pub fn create_pack(&self, name: &str, publisher: &str) -> Result<StickerPack, StoreError> {
        let _guard = self.lock()?;
        let mut doc = self.read_document()?;

        let identifier = doc.allocate_identifier(name);
        let pack_dir = self.layout.pack_dir(&identifier);
        if pack_dir.exists() {
            debug!(path = %pack_dir.display(), "Clearing stale pack directory");
            remove_dir_best_effort(&pack_dir);
        }
        fs::create_dir_all(&pack_dir)
            .map_err(|e| StoreError::io_at("create directory", &pack_dir, e))?;

        let tray = self.transcoder.derive_thumbnail(None)?;
        write_file(&pack_dir.join(DEFAULT_TRAY_FILE), &tray)?;

        doc.sticker_packs
            .push(PackRecord::new(&identifier, name, publisher, next_version("")));
        self.write_document(&doc)?;

        info!(%identifier, "Created pack");
        self.notifier
            .notify(CatalogChange::new(&identifier, ChangeKind::PackCreated));

        self.reload_pack(&identifier)
    }

    /// Transcode `source` and append it to the pack as a new sticker
    ///
    /// The first sticker of a pack also becomes its tray icon, written to
    /// [`DEFAULT_TRAY_FILE`]. Packs whose identifier is not a slug are
    /// refused before anything is written.
    #[instrument(skip(self, source, options), fields(source_bytes = source.len()))]
    pub fn add_sticker(
        &self,
        identifier: &str,
        source: &[u8],
        options: StickerOptions,
    ) -> Result<StickerPack, StoreError> {
        let _guard = self.lock()?;
        let mut doc = self.read_document()?;

        let pack = doc
            .find_pack_mut(identifier)
            .ok_or_else(|| StoreError::PackNotFound(identifier.to_string()))?;
        if !is_valid_identifier(identifier) {
            return Err(StoreError::UnsafePath(identifier.to_string()));
        }

        let asset = self.transcoder.normalize(source)?;

        let pack_dir = self.layout.pack_dir(identifier);
        fs::create_dir_all(&pack_dir)
            .map_err(|e| StoreError::io_at("create directory", &pack_dir, e))?;

        let image_file = sticker_file_name(pack, &pack_dir);
        write_file(&pack_dir.join(&image_file), &asset)?;

        let mut sticker = StickerRecord::new(&image_file, options.emojis);
        sticker.accessibility_text = options.accessibility_text;
        sticker.size = Some(asset.len() as u64);
        pack.stickers.push(sticker);
        pack.image_data_version = next_version(&pack.image_data_version);

        if pack.stickers.len() == 1 {
            match self.transcoder.derive_thumbnail(Some(&asset)) {
                Ok(tray) => {
                    write_file(&pack_dir.join(DEFAULT_TRAY_FILE), &tray)?;
                    pack.tray_image_file = DEFAULT_TRAY_FILE.to_string();
                }
                Err(e) => warn!(error = %e, "Keeping previous tray icon"),
            }
        }

        self.write_document(&doc)?;

        info!(%image_file, bytes = asset.len(), "Added sticker");
        self.notifier.notify(CatalogChange::new(
            identifier,
            ChangeKind::StickerAdded { image_file },
        ));

        self.reload_pack(identifier)
    }

    /// Remove a sticker and delete its asset
    ///
    /// The asset is deleted after the document no longer references it; a
    /// missing asset file is not an error. Filenames that would resolve
    /// outside the pack directory are dropped from the document only.
    #[instrument(skip(self))]
    pub fn remove_sticker(
        &self,
        identifier: &str,
        image_file: &str,
    ) -> Result<StickerPack, StoreError> {
        let _guard = self.lock()?;
        let mut doc = self.read_document()?;

        let pack = doc
            .find_pack_mut(identifier)
            .ok_or_else(|| StoreError::PackNotFound(identifier.to_string()))?;

        let removed = pack
            .remove_sticker(image_file)
            .ok_or_else(|| StoreError::StickerNotFound {
                identifier: identifier.to_string(),
                image_file: image_file.to_string(),
            })?;
        pack.image_data_version = next_version(&pack.image_data_version);

        self.write_document(&doc)?;
        if is_valid_identifier(identifier) && is_plain_file_name(&removed.image_file) {
            remove_file_best_effort(&self.layout.asset_file(identifier, &removed.image_file));
        } else {
            warn!(
                image_file = %removed.image_file,
                "Not deleting asset outside the pack directory"
            );
        }

        info!("Removed sticker");
        self.notifier.notify(CatalogChange::new(
            identifier,
            ChangeKind::StickerRemoved {
                image_file: removed.image_file,
            },
        ));

        self.reload_pack(identifier)
    }

    /// Delete a pack and its asset directory
    ///
    /// Returns `false` without touching anything if the pack is unknown.
    #[instrument(skip(self))]
    pub fn delete_pack(&self, identifier: &str) -> Result<bool, StoreError> {
        let _guard = self.lock()?;
        let mut doc = self.read_document()?;

        if doc.remove_pack(identifier).is_none() {
            debug!("No such pack");
            return Ok(false);
        }

        self.write_document(&doc)?;

        if is_valid_identifier(identifier) {
            remove_dir_best_effort(&self.layout.pack_dir(identifier));
        } else {
            warn!("Not removing directory for malformed identifier");
        }

        info!("Deleted pack");
        self.notifier
            .notify(CatalogChange::new(identifier, ChangeKind::PackDeleted));

        Ok(true)
    }

    /// Suppress a pack from listings without deleting anything
    #[instrument(skip(self))]
    pub fn hide_pack(&self, identifier: &str) -> Result<(), StoreError> {
        let _guard = self.lock()?;

        if self.hidden.insert(identifier)? {
            info!("Hid pack");
            self.notifier
                .notify(CatalogChange::new(identifier, ChangeKind::PackHidden));
        }

        Ok(())
    }

    // ========================================================================
    // Internals (callers hold the writer lock)
    // ========================================================================

    fn lock(&self) -> Result<WriterGuard<'_>, StoreError> {
        let file = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        file.lock_exclusive()
            .map_err(|e| StoreError::io_at("lock", &self.layout.lock_file(), e))?;
        Ok(WriterGuard { file })
    }

    fn read_document(&self) -> Result<CatalogDocument, StoreError> {
        match read_optional(&self.layout.metadata_file())? {
            Some(bytes) => Ok(CatalogDocument::parse(&bytes)?),
            None => Ok(CatalogDocument::with_links(
                &self.android_play_store_link,
                &self.ios_app_store_link,
            )),
        }
    }

    fn write_document(&self, doc: &CatalogDocument) -> Result<(), StoreError> {
        write_atomic(&self.layout.metadata_file(), &doc.serialize()?)
    }

    fn reload_pack(&self, identifier: &str) -> Result<StickerPack, StoreError> {
        self.read_document()?
            .pack(identifier)
            .ok_or_else(|| StoreError::PackNotFound(identifier.to_string()))
    }
}

/// Next `image_data_version`: unix millis, strictly after `previous`
fn next_version(previous: &str) -> String {
    let now = Utc::now().timestamp_millis();
    match previous.parse::<i64>() {
        Ok(previous) => now.max(previous.saturating_add(1)).to_string(),
        Err(_) => now.to_string(),
    }
}

/// A `sticker_<millis>.webp` name not yet used by the pack
fn sticker_file_name(pack: &PackRecord, pack_dir: &Path) -> String {
    let mut millis = Utc::now().timestamp_millis();
    loop {
        let name = format!("sticker_{}.webp", millis);
        if pack.find_sticker(&name).is_none() && !pack_dir.join(&name).exists() {
            return name;
        }
        millis += 1;
    }
}
