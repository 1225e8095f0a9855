//! Command-line interface for stickerbook.
//!
//! Provides commands for creating packs, adding and removing stickers,
//! deleting or hiding packs, and inspecting the catalog.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{self, ResolvedConfig};
use crate::domain::StickerPack;
use crate::store::{CatalogStore, StickerOptions, StoreHandle};

/// stickerbook - Local sticker pack catalog
#[derive(Parser, Debug)]
#[command(name = "stickerbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Store root (overrides config file and defaults)
    #[arg(long, global = true, env = "STICKERBOOK_HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty pack
    Create {
        /// Display name (the identifier is derived from it)
        name: String,

        /// Publisher shown with the pack
        #[arg(short, long)]
        publisher: Option<String>,
    },

    /// Add an image to a pack as a sticker
    Add {
        /// Pack identifier
        pack: String,

        /// Source image file ("-" reads from stdin)
        image: PathBuf,

        /// Emoji tag (repeatable)
        #[arg(short, long = "emoji")]
        emojis: Vec<String>,

        /// Accessibility description
        #[arg(long)]
        accessibility_text: Option<String>,
    },

    /// Remove a sticker from a pack
    Remove {
        /// Pack identifier
        pack: String,

        /// Sticker image filename
        file: String,
    },

    /// Delete a pack and all its images
    Delete {
        /// Pack identifier
        pack: String,
    },

    /// Hide a pack from listings without deleting it
    Hide {
        /// Pack identifier
        pack: String,
    },

    /// List packs
    List,

    /// Show details of a pack
    Show {
        /// Pack identifier
        pack: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let mut config = config::config()?.clone();
        if let Some(home) = self.home {
            config.home = home;
        }

        if let Commands::Config = self.command {
            show_config(&config);
            return Ok(());
        }

        let store = CatalogStore::from_config(&config)
            .with_context(|| format!("Failed to open store at {}", config.home.display()))?;
        let handle = StoreHandle::new(store);

        match self.command {
            Commands::Create { name, publisher } => {
                let publisher = publisher.unwrap_or_else(|| config.default_publisher());
                let pack = handle.create_pack(name, publisher).await?;
                println!("Created pack {}", pack.identifier());
                Ok(())
            }
            Commands::Add {
                pack,
                image,
                emojis,
                accessibility_text,
            } => {
                let source = read_source(&image)?;
                let options = StickerOptions {
                    emojis,
                    accessibility_text,
                };
                let updated = handle.add_sticker(pack, source, options).await?;
                if let Some(sticker) = updated.stickers().last() {
                    println!("Added {} to {}", sticker.image_file, updated.identifier());
                }
                Ok(())
            }
            Commands::Remove { pack, file } => {
                let updated = handle.remove_sticker(pack, file).await?;
                println!(
                    "{} now has {} sticker(s)",
                    updated.identifier(),
                    updated.stickers().len()
                );
                Ok(())
            }
            Commands::Delete { pack } => {
                if handle.delete_pack(pack.clone()).await? {
                    println!("Deleted pack {}", pack);
                } else {
                    println!("No pack named {}", pack);
                }
                Ok(())
            }
            Commands::Hide { pack } => {
                handle.hide_pack(pack.clone()).await?;
                println!("Hid pack {}", pack);
                Ok(())
            }
            Commands::List => {
                list_packs(&handle).await;
                Ok(())
            }
            Commands::Show { pack } => show_pack(&handle, &pack).await,
            Commands::Config => Ok(()),
        }
    }
}

/// Read source image bytes from a file or stdin
fn read_source(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read image from stdin")?;
        return Ok(buffer);
    }

    std::fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))
}

/// List packs in display order
async fn list_packs(handle: &StoreHandle) {
    let packs = handle.load_packs().await;

    if packs.is_empty() {
        println!("No packs found");
        return;
    }

    println!("{:<32} {:<28} {:>8}  {}", "IDENTIFIER", "NAME", "STICKERS", "");
    println!("{}", "-".repeat(78));

    for pack in packs {
        let hidden = handle.is_pack_hidden(pack.identifier()).await.unwrap_or(false);
        println!(
            "{:<32} {:<28} {:>8}  {}",
            pack.identifier(),
            truncate(pack.name(), 28),
            pack.stickers().len(),
            if hidden { "(hidden)" } else { "" }
        );
    }
}

/// Show one pack with its stickers
async fn show_pack(handle: &StoreHandle, identifier: &str) -> Result<()> {
    let packs = handle.load_packs().await;
    let pack: &StickerPack = packs
        .iter()
        .find(|p| p.identifier() == identifier)
        .with_context(|| format!("Pack not found: {}", identifier))?;

    println!("Identifier: {}", pack.identifier());
    println!("Name: {}", pack.name());
    println!("Publisher: {}", pack.publisher());
    println!("Tray: {}", pack.tray_image_file());
    println!("Version: {}", pack.image_data_version());
    println!(
        "Directory: {}",
        handle.store().layout().pack_dir(pack.identifier()).display()
    );
    println!("\nStickers:");
    for sticker in pack.stickers() {
        let size = sticker
            .size
            .map(|s| format!("{} bytes", s))
            .unwrap_or_else(|| "size unknown".to_string());
        println!("  {} {} ({})", sticker.image_file, sticker.emojis.join(""), size);
        if let Some(text) = &sticker.accessibility_text {
            println!("      {}", text);
        }
    }

    Ok(())
}

/// Print the resolved configuration
fn show_config(config: &ResolvedConfig) {
    let layout = config.layout();
    println!("Home: {}", config.home.display());
    println!(
        "Config file: {}",
        config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("Catalog: {}", layout.metadata_file().display());
    println!("Packs: {}", layout.packs_dir().display());
    println!("Default publisher: {}", config.default_publisher());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
