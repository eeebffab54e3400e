//! Library configuration module.
//!
//! Handles loading, validating, and merging `doclib.toml`. Stock defaults
//! are serialized to a TOML table and the user's file is merged on top, so
//! a config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! documents_dir = "docs"        # Directory that is scanned
//! thumbnail_dir = "docs/crop"   # Where thumbnails are written
//! allowed_types = ["pdf", "doc", "txt", "rtf", "jpg", "gif", "png", "bmp"]
//! display = "button"            # "list" or "button"
//!
//! [thumbnails]
//! size = 100                    # Square edge in pixels
//! quality = 90                  # JPEG quality (1-100)
//! image_types = ["jpg", "gif", "png", "bmp"]
//!
//! [store]
//! database = "doclib.db"        # SQLite catalog
//! error_log = "log/dberror.log" # Fallback when the database is unusable
//! busy_timeout_ms = 5000        # Per-call lock wait
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, ThumbnailConfig};
use crate::scan::{AllowedTypes, allowed_types};
use crate::view::DisplayMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default config filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "doclib.toml";

/// Library configuration loaded from `doclib.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    /// Directory whose files are listed and catalogued.
    pub documents_dir: PathBuf,
    /// Directory thumbnails are written to.
    pub thumbnail_dir: PathBuf,
    /// Extensions that survive filtering (case-sensitive).
    pub allowed_types: Vec<String>,
    /// Presentation mode name; unrecognized names are inert.
    pub display: String,
    pub thumbnails: ThumbnailsConfig,
    pub store: StoreConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("docs"),
            thumbnail_dir: PathBuf::from("docs/crop"),
            allowed_types: ["pdf", "doc", "txt", "rtf", "jpg", "gif", "png", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            display: "button".to_string(),
            thumbnails: ThumbnailsConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl LibraryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_types.is_empty() {
            return Err(ConfigError::Validation(
                "allowed_types must not be empty".into(),
            ));
        }
        if self.thumbnails.size == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.size must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.store.busy_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "store.busy_timeout_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn allowed(&self) -> AllowedTypes {
        allowed_types(&self.allowed_types)
    }

    pub fn display_mode(&self) -> Option<DisplayMode> {
        DisplayMode::from_name(&self.display)
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Edge of the square thumbnail in pixels.
    pub size: u32,
    /// JPEG encoding quality.
    pub quality: u32,
    /// Extensions that get a thumbnail.
    pub image_types: Vec<String>,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            size: 100,
            quality: 90,
            image_types: ["jpg", "gif", "png", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ThumbnailsConfig {
    pub fn to_thumbnail_config(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            size: self.size,
            quality: Quality::new(self.quality),
        }
    }

    pub fn image_types(&self) -> AllowedTypes {
        allowed_types(&self.image_types)
    }
}

/// Catalog store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database: PathBuf,
    /// Flat file used when errors cannot be written to the database.
    pub error_log: PathBuf,
    /// How long a call waits on a locked database.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("doclib.db"),
            error_log: PathBuf::from("log/dberror.log"),
            busy_timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(LibraryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<LibraryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: LibraryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file, falling back to defaults if it is missing.
pub fn load_config(path: &Path) -> Result<LibraryConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `doclib.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# doclib configuration
# =====================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory whose files are listed and catalogued.
documents_dir = "docs"

# Directory thumbnails are written to (created on first sync).
thumbnail_dir = "docs/crop"

# Extensions to show. Matching is case-sensitive: "pdf" does not match "a.PDF".
allowed_types = ["pdf", "doc", "txt", "rtf", "jpg", "gif", "png", "bmp"]

# "list" prints filenames; "button" synchronizes the catalog and thumbnails.
# Any other value does nothing.
display = "button"

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Edge of the square thumbnail in pixels. Smaller images are copied as-is.
size = 100

# JPEG quality (1 = worst, 100 = best).
quality = 90

# Extensions that get a thumbnail.
image_types = ["jpg", "gif", "png", "bmp"]

# ---------------------------------------------------------------------------
# Catalog store
# ---------------------------------------------------------------------------
[store]
# SQLite database holding the `files` catalog and the `log` error table.
database = "doclib.db"

# Flat file used when errors cannot be written to the database.
error_log = "log/dberror.log"

# How long a call waits on a locked database, in milliseconds.
busy_timeout_ms = 5000
"##
}
