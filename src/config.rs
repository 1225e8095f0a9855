//! Configuration for stickerbook.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (STICKERBOOK_HOME)
//! 2. Config file (.stickerbook/config.yaml)
//! 3. Defaults (~/.stickerbook)
//!
//! Config file discovery:
//! - Searches current directory and parents for .stickerbook/config.yaml
//! - `paths.home` is relative to the .stickerbook/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

pub mod paths;

pub use paths::StoreLayout;

/// Environment variable overriding the store root
pub const HOME_ENV: &str = "STICKERBOOK_HOME";

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Store root (relative to the .stickerbook/ directory)
    pub home: Option<String>,
}

/// Values used when seeding a new catalog and by the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub android_play_store_link: String,
    #[serde(default)]
    pub ios_app_store_link: String,
    pub default_publisher: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to the store root
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Catalog seeding and CLI defaults
    pub catalog: CatalogConfig,
}

impl ResolvedConfig {
    /// On-disk layout rooted at `home`
    pub fn layout(&self) -> StoreLayout {
        StoreLayout::new(&self.home)
    }

    /// Publisher used when the caller does not name one
    pub fn default_publisher(&self) -> String {
        self.catalog
            .default_publisher
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "stickerbook".to_string())
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".stickerbook").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".stickerbook");

    let config_file = find_config_file();
    let env_home = std::env::var(HOME_ENV).ok().map(PathBuf::from);

    let (home, catalog) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;
        let config_dir = config_path.parent().unwrap_or(Path::new("."));

        let home = match (env_home, config.paths.home.as_deref()) {
            (Some(home), _) => home,
            (None, Some(home_path)) => resolve_path(config_dir, home_path),
            (None, None) => default_home,
        };

        (home, config.catalog)
    } else {
        (env_home.unwrap_or(default_home), CatalogConfig::default())
    };

    Ok(ResolvedConfig {
        home,
        config_file,
        catalog,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the store root directory
pub fn stickerbook_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".stickerbook");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./data
catalog:
  android_play_store_link: https://play.example/app
  default_publisher: Acme
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./data".to_string()));
        assert_eq!(
            config.catalog.android_play_store_link,
            "https://play.example/app"
        );
        assert_eq!(config.catalog.ios_app_store_link, "");
        assert_eq!(config.catalog.default_publisher, Some("Acme".to_string()));
    }

    #[test]
    fn test_config_file_minimal() {
        let config: ConfigFile = serde_yaml::from_str("version: \"1\"\n").unwrap();
        assert!(config.paths.home.is_none());
        assert_eq!(config.catalog, CatalogConfig::default());
    }

    #[test]
    fn test_default_publisher_prefers_config() {
        let config = ResolvedConfig {
            home: PathBuf::from("/tmp/stickers"),
            config_file: None,
            catalog: CatalogConfig {
                default_publisher: Some("Acme".to_string()),
                ..CatalogConfig::default()
            },
        };

        assert_eq!(config.default_publisher(), "Acme");
        assert_eq!(
            config.layout().metadata_file(),
            PathBuf::from("/tmp/stickers/contents.json")
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project/.stickerbook");

        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
        assert_eq!(
            resolve_path(&base, "./data"),
            PathBuf::from("/home/user/project/.stickerbook/./data")
        );
    }
}
