//! High-level image operations.
//!
//! These functions decide which derived files a source image gets, where they
//! live inside its category folder, and which backend parameters produce them.
//! Nothing here touches pixels; [`PlannedOp::run`] hands the parameters to an
//! [`ImageBackend`].
//!
//! ## Output layout
//!
//! For a source `<category>/eagle.jpg`:
//!
//! ```text
//! <category>/thumbs/thumb_eagle.jpg   bounded JPEG thumbnail
//! <category>/webp/eagle.webp          lossy WebP re-encode
//! <category>/optimized/eagle.jpg      same-format recompression
//! ```

use super::backend::{BackendError, ImageBackend};
use super::params::{EncodeParams, OutputFormat, Quality, ThumbnailParams};
use crate::naming;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

pub const THUMBS_DIR: &str = "thumbs";
pub const WEBP_DIR: &str = "webp";
pub const OPTIMIZED_DIR: &str = "optimized";

/// Source extensions the derived-asset jobs accept.
///
/// WebP sources are recognised as postcards but never re-derived.
pub const DERIVABLE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

fn stem(filename: &str) -> &str {
    naming::split_extension(filename)
        .map(|(stem, _)| stem)
        .unwrap_or(filename)
}

pub fn thumbnail_path(category_dir: &Path, filename: &str) -> PathBuf {
    category_dir
        .join(THUMBS_DIR)
        .join(format!("thumb_{}.jpg", stem(filename)))
}

pub fn webp_path(category_dir: &Path, filename: &str) -> PathBuf {
    category_dir
        .join(WEBP_DIR)
        .join(format!("{}.webp", stem(filename)))
}

pub fn optimized_path(category_dir: &Path, filename: &str) -> PathBuf {
    category_dir.join(OPTIMIZED_DIR).join(filename)
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Longest allowed edge; thumbnails fit inside a square of this size.
    pub max_size: u32,
    pub quality: Quality,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_size: 300,
            quality: Quality::default(),
        }
    }
}

/// Configuration for the full-size WebP and optimized variants.
#[derive(Debug, Clone, Default)]
pub struct VariantConfig {
    /// Quality for the lossy outputs: the WebP variant and JPEG
    /// recompression. PNG sources stay lossless.
    pub quality: Quality,
}

/// A single backend call, planned but not yet executed.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedOp {
    Thumbnail(ThumbnailParams),
    Encode(EncodeParams),
}

impl PlannedOp {
    pub fn source(&self) -> &Path {
        match self {
            PlannedOp::Thumbnail(p) => &p.source,
            PlannedOp::Encode(p) => &p.source,
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            PlannedOp::Thumbnail(p) => &p.output,
            PlannedOp::Encode(p) => &p.output,
        }
    }

    /// Stable description of every setting that shapes the output bytes.
    pub fn cache_key(&self) -> String {
        match self {
            PlannedOp::Thumbnail(p) => p.cache_key(),
            PlannedOp::Encode(p) => p.cache_key(),
        }
    }

    pub fn run(&self, backend: &impl ImageBackend) -> Result<()> {
        match self {
            PlannedOp::Thumbnail(p) => backend.thumbnail(p),
            PlannedOp::Encode(p) => backend.encode(p),
        }
    }
}

/// Plan the thumbnail for `filename` inside `category_dir`.
pub fn plan_thumbnail(category_dir: &Path, filename: &str, config: &ThumbnailConfig) -> PlannedOp {
    PlannedOp::Thumbnail(ThumbnailParams {
        source: category_dir.join(filename),
        output: thumbnail_path(category_dir, filename),
        max_width: config.max_size,
        max_height: config.max_size,
        quality: config.quality,
    })
}

/// Plan the WebP and optimized variants for `filename`, in that order.
///
/// PNG sources are recompressed as PNG; every other source becomes JPEG.
/// Orientation is never applied, so pixels keep their stored layout.
pub fn plan_variants(category_dir: &Path, filename: &str, config: &VariantConfig) -> Vec<PlannedOp> {
    let source = category_dir.join(filename);
    let optimized_format = if naming::has_extension(filename, &["png"]) {
        OutputFormat::Png
    } else {
        OutputFormat::Jpeg(config.quality)
    };

    vec![
        PlannedOp::Encode(EncodeParams {
            source: source.clone(),
            output: webp_path(category_dir, filename),
            format: OutputFormat::WebP(config.quality),
            auto_orient: false,
        }),
        PlannedOp::Encode(EncodeParams {
            source,
            output: optimized_path(category_dir, filename),
            format: optimized_format,
            auto_orient: false,
        }),
    ]
}
