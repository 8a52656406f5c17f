//! Image processing backend built on the `image` crate, with libwebp for
//! lossy WebP.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate, format sniffed from content |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3`, sized by [`fit_within`] |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, best compression |
//! | Encode → WebP | `webp::Encoder::encode_advanced`, lossy, method 6 |
//!
//! Each output is encoded into a uniquely named temp file in the output's
//! directory and persisted over the target once the encoder has flushed. A
//! failed encode never leaves a partial file where the freshness check would
//! find it, and two writers never share a temp file.

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_within;
use super::params::{EncodeParams, OutputFormat, Quality, ThumbnailParams, WEBP_METHOD};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{self, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, e: image::ImageError) -> BackendError {
    BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
}

/// Load and decode an image from disk, optionally applying EXIF orientation.
fn load_image(path: &Path, auto_orient: bool) -> Result<DynamicImage, BackendError> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| decode_error(path, e))?;
    let orientation = if auto_orient {
        decoder.orientation().ok()
    } else {
        None
    };
    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;
    if let Some(orientation) = orientation {
        img.apply_orientation(orientation);
    }
    Ok(img)
}

/// Encode into a fresh temp file beside `output`, then persist over it.
///
/// The temp file is removed on drop if encoding fails.
fn save_image(img: &DynamicImage, output: &Path, format: OutputFormat) -> Result<(), BackendError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode_image(img, format, &mut writer)?;
        writer.flush()?;
    }
    tmp.persist(output).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

fn encode_webp<W: Write>(
    img: &DynamicImage,
    quality: Quality,
    mut writer: W,
) -> Result<(), BackendError> {
    let encode_error =
        |msg: String| BackendError::ProcessingFailed(format!("WebP encode failed: {msg}"));

    let mut config = webp::WebPConfig::new()
        .map_err(|_| encode_error("libwebp config init".to_string()))?;
    config.lossless = 0;
    config.quality = quality.value() as f32;
    config.method = WEBP_METHOD;

    let (width, height) = (img.width(), img.height());
    let memory = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_advanced(&config)
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_advanced(&config)
    }
    .map_err(|e| encode_error(format!("{e:?}")))?;

    writer.write_all(&memory)?;
    Ok(())
}

fn encode_image<W: Write>(
    img: &DynamicImage,
    format: OutputFormat,
    writer: W,
) -> Result<(), BackendError> {
    let encode_error = |kind: &str, e: image::ImageError| {
        BackendError::ProcessingFailed(format!("{kind} encode failed: {e}"))
    };

    match format {
        OutputFormat::Jpeg(quality) => {
            // JPEG carries no alpha channel.
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(writer, quality.value() as u8);
            rgb.write_with_encoder(encoder)
                .map_err(|e| encode_error("JPEG", e))
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                writer,
                png::CompressionType::Best,
                png::FilterType::Adaptive,
            );
            match img {
                DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                    DynamicImage::ImageRgba16(img.to_rgba16()).write_with_encoder(encoder)
                }
                _ => img.write_with_encoder(encoder),
            }
            .map_err(|e| encode_error("PNG", e))
        }
        OutputFormat::WebP(quality) => encode_webp(img, quality, writer),
    }
}

impl ImageBackend for RustBackend {
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
        let img = load_image(&params.source, false)?;

        let (w, h) = fit_within(
            (img.width(), img.height()),
            (params.max_width, params.max_height),
        );
        let resized = if (w, h) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(w, h, FilterType::Lanczos3)
        };

        save_image(&resized, &params.output, OutputFormat::Jpeg(params.quality))
    }

    fn encode(&self, params: &EncodeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source, params.auto_orient)?;
        save_image(&img, &params.output, params.format)
    }
}
