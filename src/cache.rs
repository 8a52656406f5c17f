//! Freshness checks for derived images.
//!
//! Transcoding is the slow part of the pipeline, so both image jobs skip an
//! output that is already up to date with its source. Two policies exist:
//!
//! - **`mtime`** (default): an output is fresh when it exists and its
//!   modification time is not older than the source's. Cheap, but trusts the
//!   clock; a `git checkout` or a copy that resets timestamps forces work.
//!
//! - **`content-hash`**: an output is fresh when it exists and the cache
//!   manifest records the same SHA-256 of the source bytes and the same hash
//!   of the encoding parameters as the current run. Survives timestamp churn
//!   and picks up setting changes (e.g. a new thumbnail size), at the price of
//!   reading every source file once per run.
//!
//! ## Storage
//!
//! The content-hash manifest is a JSON file at
//! `<publish_dir>/.asset-cache.json`, keyed by output path relative to the
//! publish directory. The mtime policy keeps no state at all.
//!
//! ## Bypassing the cache
//!
//! `--no-cache` on `thumbnails`, `optimize` or `build` regenerates every
//! output regardless of policy.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the publish directory.
const MANIFEST_FILENAME: &str = ".asset-cache.json";

/// Version of the cache manifest format. Bump to invalidate existing caches.
const MANIFEST_VERSION: u32 = 1;

/// How the image jobs decide that an output can be skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreshnessMode {
    #[default]
    Mtime,
    ContentHash,
}

/// Whether `output` exists and is at least as new as `source`.
///
/// Any metadata error (missing output, unreadable source, platform without
/// mtimes) counts as stale.
pub fn is_fresh_by_mtime(source: &Path, output: &Path) -> bool {
    let modified = |p: &Path| std::fs::metadata(p).and_then(|m| m.modified());
    match (modified(source), modified(output)) {
        (Ok(src), Ok(out)) => out >= src,
        _ => false,
    }
}

/// A single cached output file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk manifest mapping output paths to the hashes they were built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (first build, or cache disabled).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the publish directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(publish_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(manifest_path(publish_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(m) if m.version == MANIFEST_VERSION => m,
            _ => Self::empty(),
        }
    }

    /// Save to the publish directory.
    pub fn save(&self, publish_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(publish_dir), json)
    }

    /// Whether `output_key` was built from exactly these hashes and the file
    /// is still on disk.
    pub fn is_fresh(
        &self,
        output_key: &str,
        source_hash: &str,
        params_hash: &str,
        publish_dir: &Path,
    ) -> bool {
        self.entries.get(output_key).is_some_and(|entry| {
            entry.source_hash == source_hash && entry.params_hash == params_hash
        }) && publish_dir.join(output_key).exists()
    }

    /// Record the hashes an output was just built from.
    pub fn insert(&mut self, output_key: String, source_hash: String, params_hash: String) {
        self.entries.insert(
            output_key,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }
}

/// Resolve the cache manifest path for a publish directory.
pub fn manifest_path(publish_dir: &Path) -> PathBuf {
    publish_dir.join(MANIFEST_FILENAME)
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 of a parameter description string.
///
/// Callers build the description from every setting that affects the output
/// bytes (see `imaging::params`), so any setting change invalidates it.
pub fn hash_params(description: &str) -> String {
    format!("{:x}", Sha256::digest(description.as_bytes()))
}

/// Summary of one image job.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub fresh: u32,
    pub generated: u32,
    pub failed: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.fresh + self.generated + self.failed
    }

    pub fn merge(&mut self, other: &CacheStats) {
        self.fresh += other.fresh;
        self.generated += other.generated;
        self.failed += other.failed;
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fresh == 0 && self.failed == 0 {
            return write!(f, "{} generated", self.generated);
        }
        write!(
            f,
            "{} fresh, {} generated",
            self.fresh, self.generated
        )?;
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        write!(f, " ({} total)", self.total())
    }
}
