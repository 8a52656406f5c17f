//! Image processing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Thumbnail** | [`fit_within`] + `resize_exact` (Lanczos3) → JPEG |
//! | **WebP variant** | lossy libwebp encode via the `webp` crate |
//! | **Optimized variant** | PNG best compression, or JPEG at the configured quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Output layout and planning of backend calls

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::fit_within;
pub use operations::{PlannedOp, ThumbnailConfig, VariantConfig, plan_thumbnail, plan_variants};
pub use params::{EncodeParams, OutputFormat, Quality, ThumbnailParams, WEBP_METHOD};
pub use rust_backend::RustBackend;
