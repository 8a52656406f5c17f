//! Metadata catalog derivation.
//!
//! Walks every category folder, pairs front and back images by the naming
//! convention in [`naming`](crate::naming), and assembles the JSON catalog the
//! site build reads:
//!
//! ```json
//! {
//!   "categories": [
//!     {
//!       "name": "Old Maps",
//!       "folder": "Old_Maps",
//!       "postcards": [
//!         { "id": "Old_Maps-harbor", "front": "harbor.jpg", "back": "harbor_001.jpg", "name": "harbor" }
//!       ]
//!     }
//!   ],
//!   "totalPostcards": 1,
//!   "generatedAt": "2026-10-16T09:30:00.123Z"
//! }
//! ```
//!
//! ## Pairing
//!
//! Files are grouped by pairing key. A group becomes a postcard only if it has
//! a front; a missing back falls back to the front. Back-only groups and
//! `_002`/`_003` imagery never produce postcards. When two fronts share a key
//! (`eagle.jpg` and `eagle.png`) the one sorting last by filename wins.
//!
//! ## Ordering
//!
//! Categories keep the collector's sorted folder order. Postcards within a
//! category are sorted by display name, case-insensitively, with a lowercase
//! name ahead of its uppercase twin and the id as the final tie-break, so two
//! runs over the same tree always agree.

use crate::collect::{CollectError, collect_categories};
use crate::naming::{self, FileRole};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("cannot read category {path}: {source}")]
    ReadCategory {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One collectible item: a front image and its back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Postcard {
    pub id: String,
    pub front: String,
    pub back: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub folder: String,
    pub postcards: Vec<Postcard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub total_postcards: usize,
    pub generated_at: String,
}

#[derive(Default)]
struct Pair {
    front: Option<String>,
    back: Option<String>,
}

/// Derive the postcards of a single category folder.
///
/// The postcard id prefix is the folder's own name.
pub fn find_postcard_pairs(category_dir: &Path) -> Result<Vec<Postcard>, CatalogError> {
    let folder = category_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let entries = fs::read_dir(category_dir).map_err(|source| CatalogError::ReadCategory {
        path: category_dir.to_path_buf(),
        source,
    })?;

    let mut filenames: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    filenames.sort();

    let mut groups: BTreeMap<String, Pair> = BTreeMap::new();
    for filename in filenames {
        match naming::classify(&filename) {
            FileRole::Front(key) => groups.entry(key).or_default().front = Some(filename),
            FileRole::Back(key) => groups.entry(key).or_default().back = Some(filename),
            FileRole::Ignored => {
                if naming::is_image_file(&filename) {
                    log::debug!("{folder}: ignoring variant {filename}");
                }
            }
        }
    }

    let mut postcards: Vec<Postcard> = groups
        .into_iter()
        .filter_map(|(key, pair)| {
            let Some(front) = pair.front else {
                if let Some(back) = pair.back {
                    log::warn!("{folder}: back image {back} has no front, skipping");
                }
                return None;
            };
            Some(Postcard {
                id: format!("{folder}-{key}"),
                back: pair.back.unwrap_or_else(|| front.clone()),
                front,
                name: naming::display_name(&key).to_string(),
            })
        })
        .collect();

    postcards.sort_by(|a, b| compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(postcards)
}

/// Case-insensitive name order; lowercase sorts ahead of uppercase on a tie.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| swap_case(a).cmp(&swap_case(b)))
}

fn swap_case(s: &str) -> String {
    s.chars()
        .flat_map(|c| {
            if c.is_uppercase() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                c.to_uppercase().collect::<Vec<_>>()
            }
        })
        .collect()
}

/// Derive the category list for every folder under `root`.
///
/// Categories without a single postcard are omitted.
pub fn derive_categories<S: AsRef<str>>(
    root: &Path,
    exclude: &[S],
) -> Result<Vec<Category>, CatalogError> {
    let mut categories = Vec::new();
    for folder in collect_categories(root, exclude)? {
        let postcards = find_postcard_pairs(&root.join(&folder))?;
        if postcards.is_empty() {
            log::debug!("{folder}: no postcards, omitted");
            continue;
        }
        categories.push(Category {
            name: naming::category_display_name(&folder),
            folder,
            postcards,
        });
    }
    Ok(categories)
}

/// Build the full catalog, stamped with the current UTC time.
pub fn build_catalog<S: AsRef<str>>(root: &Path, exclude: &[S]) -> Result<Catalog, CatalogError> {
    let categories = derive_categories(root, exclude)?;
    let total_postcards = categories.iter().map(|c| c.postcards.len()).sum();
    Ok(Catalog {
        categories,
        total_postcards,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Write the catalog as pretty-printed JSON, creating parent directories.
pub fn write_catalog(catalog: &Catalog, path: &Path) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(catalog)?;
    fs::write(path, json)?;
    Ok(())
}
