//! Category discovery.
//!
//! A category is a top-level folder of the project root. Hidden folders and a
//! fixed denylist (build output, dependencies, version control, site sources,
//! the publish directory, one legacy folder) are skipped:
//!
//! ```text
//! project/
//! ├── .git/              # hidden → skipped
//! ├── node_modules/      # denylisted → skipped
//! ├── public/            # denylisted → skipped (publish directory)
//! ├── src/               # denylisted → skipped
//! ├── Birds/             # category
//! ├── Old_Maps/          # category
//! └── notes.txt          # not a directory → skipped
//! ```
//!
//! The same function enumerates categories of the publish directory for the
//! derived-asset jobs.

use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("cannot read {path}: {source}")]
    ReadRoot {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Folders that are never categories.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    ".astro",
    "public",
    "src",
    ".github",
    "260113",
];

/// List the category folder names directly under `root`, sorted.
///
/// A name is included iff the entry is a directory, does not start with `.`,
/// and is not in `exclude`. Entries whose type cannot be read, and names that
/// are not valid UTF-8, are skipped.
pub fn collect_categories<S: AsRef<str>>(
    root: &Path,
    exclude: &[S],
) -> Result<Vec<String>, CollectError> {
    let entries = fs::read_dir(root).map_err(|source| CollectError::ReadRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut folders: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| is_category_name(name, exclude))
        .collect();

    folders.sort();
    Ok(folders)
}

/// Name-only half of the category rule (no filesystem access).
pub fn is_category_name<S: AsRef<str>>(name: &str, exclude: &[S]) -> bool {
    !name.starts_with('.') && !exclude.iter().any(|e| e.as_ref() == name)
}
