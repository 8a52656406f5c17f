//! Shared test utilities for the postcard pipeline test suite.
//!
//! Builds synthetic project trees and provides lookups over a derived
//! [`Catalog`] that panic with a readable message on a miss.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = setup_tree(&["Birds/eagle.jpg", "Birds/eagle_001.jpg"]);
//! let catalog = build_catalog(tmp.path(), DEFAULT_EXCLUDES).unwrap();
//!
//! let birds = find_category(&catalog, "Birds");
//! assert_eq!(postcard_ids(birds), vec!["Birds-eagle"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::catalog::{Catalog, Category, Postcard};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp directory holding the given relative files.
///
/// File contents are the relative path itself, so every file is distinct and
/// non-empty. Parent directories are created as needed.
pub fn setup_tree(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(tmp.path(), files);
    tmp
}

/// Write the given relative files under `root`.
pub fn write_files(root: &Path, files: &[&str]) {
    for rel in files {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, rel.as_bytes()).unwrap();
    }
}

/// Write a small gradient JPEG.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

// =========================================================================
// Catalog lookups: panic with a clear message on miss
// =========================================================================

/// Find a category by folder name. Panics if not found.
pub fn find_category<'a>(catalog: &'a Catalog, folder: &str) -> &'a Category {
    catalog
        .categories
        .iter()
        .find(|c| c.folder == folder)
        .unwrap_or_else(|| {
            let folders = category_folders(catalog);
            panic!("category '{folder}' not found. Available: {folders:?}")
        })
}

/// Find a postcard by id within a category. Panics if not found.
pub fn find_postcard<'a>(category: &'a Category, id: &str) -> &'a Postcard {
    category
        .postcards
        .iter()
        .find(|p| p.id == id)
        .unwrap_or_else(|| {
            let ids = postcard_ids(category);
            panic!(
                "postcard '{id}' not found in '{}'. Available: {ids:?}",
                category.folder
            )
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All category folders in catalog order.
pub fn category_folders(catalog: &Catalog) -> Vec<&str> {
    catalog
        .categories
        .iter()
        .map(|c| c.folder.as_str())
        .collect()
}

/// All postcard ids in category order.
pub fn postcard_ids(category: &Category) -> Vec<&str> {
    category.postcards.iter().map(|p| p.id.as_str()).collect()
}
