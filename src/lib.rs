//! # Postcard Pipeline
//!
//! The asset build pass for a static postcard gallery. Your filesystem is the
//! data source: top-level folders become categories, and images inside them
//! pair up into postcards by filename.
//!
//! ```text
//! project/
//! ├── postcards.toml          # optional config
//! ├── Birds/
//! │   ├── eagle.jpg           # front
//! │   ├── eagle_001.jpg       # back
//! │   ├── eagle_002.jpg       # alternate-effect imagery (ignored)
//! │   └── owl.png             # front without a back
//! ├── Old_Maps/
//! │   └── harbor.jpg
//! ├── public/                 # publish directory (mirror target)
//! └── src/data/metadata.json  # catalog
//! ```
//!
//! # Architecture: Four Batch Jobs
//!
//! Each job is a single pass over the filesystem with an explicit root path:
//!
//! ```text
//! 1. Copy        root/<category>/   →  public/<category>/
//! 2. Metadata    root/<category>/   →  src/data/metadata.json
//! 3. Thumbnails  public/<category>/ →  public/<category>/thumbs/
//! 4. Optimize    public/<category>/ →  public/<category>/{webp,optimized}/
//! ```
//!
//! `build` runs them in that order. The image jobs skip outputs that are
//! already fresh, so re-running `thumbnails` or `optimize` only transcodes
//! what changed. The copy step replaces each publish category wholesale, so a
//! full `build` regenerates every derived file.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`collect`] | Category discovery with a denylist and hidden-folder rule |
//! | [`naming`] | Front / back / ignored classification of filenames |
//! | [`mirror`] | Wholesale recursive copy of categories into the publish directory |
//! | [`catalog`] | Postcard pairing and the JSON catalog |
//! | [`process`] | Thumbnail and optimize jobs, parallel per category |
//! | [`cache`] | Freshness checks: mtime or content hash |
//! | [`imaging`] | Pure-Rust image operations behind the [`imaging::ImageBackend`] trait |
//! | [`config`] | `postcards.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Filename Convention Over Metadata Files
//!
//! A postcard is whatever the folder says it is: `name.ext` is the front,
//! `name_001.ext` the back, higher numbers are imagery the site uses for
//! effects. Renaming a file is the whole editing workflow. The rule lives in
//! one function, [`naming::classify`], so the catalog and the image jobs can
//! never disagree about what a back is.
//!
//! ## Imaging
//!
//! The [`imaging`] module uses the `image` crate for decoding, Lanczos3
//! resampling and JPEG/PNG encoding, and the `webp` crate (bundled libwebp)
//! for lossy WebP. No ImageMagick, no libvips, no Node toolchain: the binary
//! is self-contained.
//!
//! ## Bounded Parallelism
//!
//! Categories are processed one at a time; images within a category fan out
//! over a rayon pool capped by `[processing].max_processes`, so a large
//! category cannot spawn more concurrent transcodes than the machine has
//! cores.

pub mod cache;
pub mod catalog;
pub mod collect;
pub mod config;
pub mod imaging;
pub mod mirror;
pub mod naming;
pub mod output;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
