//! Copy category folders into the publish directory.
//!
//! Each run replaces `publish/<folder>` wholesale with a fresh recursive copy
//! of `root/<folder>`. There is no diffing: whatever the publish copy held
//! before (including derived `thumbs/`, `webp/` and `optimized/` folders) is
//! removed first, so derived jobs must run after the mirror.
//!
//! A folder that is, or contains, the publish directory is never mirrored,
//! whatever the exclusion list says.
//!
//! Symlinks are followed, so a linked image lands in the publish tree as a
//! regular file. Any I/O error aborts the run and can leave the category that
//! was being copied removed from the publish tree.

use crate::collect::{CollectError, collect_categories};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("publish directory {0} is the project root")]
    PublishIsRoot(PathBuf),
}

/// One copied category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredCategory {
    pub folder: String,
    /// Regular files copied, at any depth.
    pub files: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub categories: Vec<MirroredCategory>,
}

impl MirrorReport {
    pub fn total_files(&self) -> usize {
        self.categories.iter().map(|c| c.files).sum()
    }
}

/// Mirror every category under `root` into `publish_dir`.
///
/// `exclude` should contain the publish directory's own name when it lives
/// inside `root` (see `PipelineConfig::root_excludes`).
pub fn mirror_categories<S: AsRef<str>>(
    root: &Path,
    publish_dir: &Path,
    exclude: &[S],
) -> Result<MirrorReport, MirrorError> {
    let categories = collect_categories(root, exclude)?;
    fs::create_dir_all(publish_dir)?;

    let publish_canonical = fs::canonicalize(publish_dir)?;
    if fs::canonicalize(root)? == publish_canonical {
        return Err(MirrorError::PublishIsRoot(publish_dir.to_path_buf()));
    }

    let mut report = MirrorReport::default();
    for folder in categories {
        let src = root.join(&folder);
        if publish_canonical.starts_with(fs::canonicalize(&src)?) {
            log::warn!(
                "{folder} holds the publish directory {}, not mirrored",
                publish_dir.display()
            );
            continue;
        }

        let dest = publish_dir.join(&folder);
        if dest.exists() {
            fs::remove_dir_all(&dest)?;
        }
        let files = copy_tree(&src, &dest)?;
        log::info!("mirrored {folder}: {files} files");
        report.categories.push(MirroredCategory { folder, files });
    }
    Ok(report)
}

/// Recursively copy `src` to `dst`, returning the number of files copied.
fn copy_tree(src: &Path, dst: &Path) -> Result<usize, MirrorError> {
    let mut files = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}
