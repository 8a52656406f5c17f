//! Pipeline configuration.
//!
//! Settings are read from an optional `postcards.toml` in the project root.
//! The file is sparse: stock defaults are serialized to a TOML table, the
//! user's file is merged over it key by key, and the result is deserialized
//! and validated. Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! publish_dir = "public"                 # Mirror target, read by the image jobs
//! catalog_path = "src/data/metadata.json"
//!
//! [categories]
//! exclude = ["node_modules", ".git", "dist", ".astro", "public", "src", ".github", "260113"]
//!
//! [thumbnails]
//! max_size = 300   # Bounding box edge in pixels (never upscaled)
//! quality = 85     # JPEG quality
//!
//! [optimize]
//! quality = 85     # WebP and JPEG recompression quality
//!
//! [processing]
//! max_processes = 4  # Omit for auto (= CPU cores)
//!
//! [cache]
//! freshness = "mtime"  # or "content-hash"
//! ```

use crate::cache::FreshnessMode;
use crate::collect::DEFAULT_EXCLUDES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "postcards.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Publish directory, relative to the project root.
    pub publish_dir: String,
    /// Catalog JSON output path, relative to the project root.
    pub catalog_path: String,
    pub categories: CategoriesConfig,
    pub thumbnails: ThumbnailsConfig,
    pub optimize: OptimizeConfig,
    pub processing: ProcessingConfig,
    pub cache: CacheConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            publish_dir: "public".to_string(),
            catalog_path: "src/data/metadata.json".to_string(),
            categories: CategoriesConfig::default(),
            thumbnails: ThumbnailsConfig::default(),
            optimize: OptimizeConfig::default(),
            processing: ProcessingConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.publish_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "publish_dir must not be empty".into(),
            ));
        }
        if self.catalog_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "catalog_path must not be empty".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.max_size == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_size must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.optimize.quality) {
            return Err(ConfigError::Validation(
                "optimize.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// Absolute-or-root-relative publish directory.
    pub fn publish_path(&self, root: &Path) -> PathBuf {
        root.join(&self.publish_dir)
    }

    /// Absolute-or-root-relative catalog path.
    pub fn catalog_file(&self, root: &Path) -> PathBuf {
        root.join(&self.catalog_path)
    }

    /// Exclusion list for the project root.
    ///
    /// The configured list, plus the top-level folder holding the publish
    /// directory when it lives inside `root`, so the publish tree is never
    /// mirrored into itself. `./site`, `site/out` and an absolute path under
    /// the root all resolve to `site`.
    pub fn root_excludes(&self, root: &Path) -> Vec<String> {
        let mut excludes = self.categories.exclude.clone();
        if let Some(name) = publish_top_level(root, Path::new(&self.publish_dir))
            && !excludes.contains(&name)
        {
            excludes.push(name);
        }
        excludes
    }
}

/// Name of the root entry that contains `publish`, if `publish` is inside
/// `root`.
fn publish_top_level(root: &Path, publish: &Path) -> Option<String> {
    let relative = if publish.is_absolute() {
        match publish.strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => {
                let canonical_root = fs::canonicalize(root).ok()?;
                let canonical_publish =
                    fs::canonicalize(publish).unwrap_or_else(|_| publish.to_path_buf());
                canonical_publish
                    .strip_prefix(&canonical_root)
                    .ok()?
                    .to_path_buf()
            }
        }
    } else {
        publish.to_path_buf()
    };

    match relative.components().find(|c| *c != Component::CurDir)? {
        Component::Normal(name) => name.to_str().map(str::to_string),
        _ => None,
    }
}

/// Category discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoriesConfig {
    /// Folder names that are never categories. Hidden folders are always skipped.
    pub exclude: Vec<String>,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Thumbnail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Bounding box edge in pixels. Images are fit inside, never enlarged.
    pub max_size: u32,
    /// JPEG quality (1-100).
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            max_size: 300,
            quality: 85,
        }
    }
}

/// Optimized-variant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    /// Lossy quality (1-100) for the WebP variant and JPEG recompression.
    /// Optimized PNGs always use maximum lossless compression.
    pub quality: u32,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self { quality: 85 }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel transcoding workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Memoization settings for the image jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub freshness: FreshnessMode,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PipelineConfig::default())?)
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

/// Load `postcards.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config for a project root: stock defaults, user overrides, validation.
pub fn load_config(root: &Path) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// A fully commented stock `postcards.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Postcard pipeline configuration
# ===============================
# All settings are optional. Values shown below are the defaults.
# Place this file in the project root as postcards.toml.
# Unknown keys will cause an error.

# Directory the category folders are mirrored into, and from which thumbnails
# and optimized variants are generated. Relative to the project root.
publish_dir = "public"

# Where the JSON catalog is written. Relative to the project root.
catalog_path = "src/data/metadata.json"

# ---------------------------------------------------------------------------
# Category discovery
# ---------------------------------------------------------------------------
[categories]
# Top-level folders that are never categories. Folders starting with "."
# are always skipped. The publish directory is excluded automatically.
exclude = ["node_modules", ".git", "dist", ".astro", "public", "src", ".github", "260113"]

# ---------------------------------------------------------------------------
# Thumbnails (<category>/thumbs/thumb_<name>.jpg)
# ---------------------------------------------------------------------------
[thumbnails]
# Images are fit inside a max_size x max_size box, never enlarged.
max_size = 300

# JPEG quality (1-100).
quality = 85

# ---------------------------------------------------------------------------
# Optimized variants (<category>/webp/ and <category>/optimized/)
# ---------------------------------------------------------------------------
[optimize]
# Quality (1-100) for the WebP variant and JPEG recompression.
# Optimized PNGs use maximum lossless compression.
quality = 85

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel transcoding workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Memoization
# ---------------------------------------------------------------------------
[cache]
# "mtime": skip an output whose modification time is not older than its source.
# "content-hash": skip an output when the source bytes and encode settings
# match the last run (recorded in <publish_dir>/.asset-cache.json).
freshness = "mtime"
"##
}
