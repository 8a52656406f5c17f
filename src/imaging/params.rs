//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what images to create) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! Every params type can describe itself as a stable string
//! ([`ThumbnailParams::cache_key`], [`EncodeParams::cache_key`]) covering all
//! settings that influence the output bytes. The content-hash freshness mode
//! hashes that string.

use std::path::PathBuf;

/// libwebp compression method (0 = fast, 6 = smallest output).
pub const WEBP_METHOD: i32 = 6;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Target encoding of an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Baseline JPEG at the given quality.
    Jpeg(Quality),
    /// PNG at maximum compression with adaptive filtering.
    Png,
    /// Lossy WebP at the given quality, encoded at the slowest, smallest
    /// method.
    WebP(Quality),
}

impl OutputFormat {
    fn describe(self) -> String {
        match self {
            OutputFormat::Jpeg(q) => format!("jpeg:q{}", q.value()),
            OutputFormat::Png => "png:best".to_string(),
            OutputFormat::WebP(q) => format!("webp:q{}:m{}", q.value(), WEBP_METHOD),
        }
    }
}

/// Parameters for a thumbnail: fit inside a box, never upscale, encode JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Bounding box. The result fits inside with its aspect ratio kept.
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
}

impl ThumbnailParams {
    pub fn cache_key(&self) -> String {
        format!(
            "thumbnail:{}x{}:{}",
            self.max_width,
            self.max_height,
            OutputFormat::Jpeg(self.quality).describe()
        )
    }
}

/// Parameters for a full-size re-encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    /// Apply the EXIF orientation tag before encoding. When false, pixel data
    /// is written exactly as stored.
    pub auto_orient: bool,
}

impl EncodeParams {
    pub fn cache_key(&self) -> String {
        format!(
            "encode:{}:orient={}",
            self.format.describe(),
            self.auto_orient
        )
    }
}
