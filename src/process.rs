//! Derived-asset generation: thumbnails and optimized variants.
//!
//! Both jobs read images from the publish directory (after the mirror has
//! copied them there) and write derived files next to them:
//!
//! ```text
//! public/
//! └── Birds/
//!     ├── eagle.jpg
//!     ├── eagle_001.jpg
//!     ├── owl.png
//!     ├── thumbs/
//!     │   ├── thumb_eagle.jpg     # thumbnails job (fronts only)
//!     │   └── thumb_owl.jpg
//!     ├── webp/
//!     │   ├── eagle.webp          # optimize job (every png/jpg/jpeg)
//!     │   ├── eagle_001.webp
//!     │   └── owl.webp
//!     └── optimized/
//!         ├── eagle.jpg
//!         ├── eagle_001.jpg
//!         └── owl.png
//! ```
//!
//! ## Categories
//!
//! - **Thumbnails**: the collector's folders under the project root that also
//!   exist in the publish directory.
//! - **Optimize**: the collector's folders under the publish directory itself,
//!   so a folder that only lives in the publish tree is optimized too.
//!
//! Both apply the same exclusion list.
//!
//! ## Sources
//!
//! - **Thumbnails**: `png`/`jpg`/`jpeg` files that are not postcard backs.
//! - **Optimize**: every `png`/`jpg`/`jpeg` file, backs and alternate-effect
//!   imagery included.
//!
//! WebP sources are never re-derived.
//!
//! Sources sharing a stem (`eagle.jpg`, `eagle.png`) plan the same
//! `thumbs/thumb_eagle.jpg` and `webp/eagle.webp`. Each output path belongs to
//! the last such source in filename order; the others skip it with a warning,
//! so the result never depends on which worker finishes last.
//!
//! ## Parallel Processing
//!
//! Categories run one after another. Within a category every source image is
//! dispatched onto the rayon pool and the job waits for all of them before
//! moving on. The pool size is set once by the binary from
//! `[processing].max_processes`.
//!
//! ## Failure isolation
//!
//! A backend error fails only the output it was producing: it is logged,
//! counted in [`CacheStats::failed`] and reported in the progress event. File
//! system errors outside the backend (unreadable category, output folder that
//! cannot be created, cache manifest that cannot be saved) abort the job.

use crate::cache::{self, CacheManifest, CacheStats, FreshnessMode};
use crate::collect::{CollectError, collect_categories};
use crate::config::PipelineConfig;
use crate::imaging::operations::{
    DERIVABLE_EXTENSIONS, OPTIMIZED_DIR, THUMBS_DIR, WEBP_DIR,
};
use crate::imaging::{
    ImageBackend, PlannedOp, Quality, RustBackend, ThumbnailConfig, VariantConfig, plan_thumbnail,
    plan_variants,
};
use crate::naming::{self, FileRole};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("cannot read category {path}: {source}")]
    ReadCategory {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Which derived-asset job to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetJob {
    Thumbnails,
    Optimize,
}

impl AssetJob {
    /// Output folders this job writes inside each category.
    pub fn output_dirs(self) -> &'static [&'static str] {
        match self {
            AssetJob::Thumbnails => &[THUMBS_DIR],
            AssetJob::Optimize => &[WEBP_DIR, OPTIMIZED_DIR],
        }
    }

    /// Whether `filename` is a source for this job.
    pub fn accepts(self, filename: &str) -> bool {
        if !naming::has_extension(filename, DERIVABLE_EXTENSIONS) {
            return false;
        }
        match self {
            AssetJob::Thumbnails => !matches!(naming::classify(filename), FileRole::Back(_)),
            AssetJob::Optimize => true,
        }
    }

    /// Category folders this job visits, sorted.
    fn categories<S: AsRef<str>>(
        self,
        root: &Path,
        publish_dir: &Path,
        exclude: &[S],
    ) -> Result<Vec<String>, ProcessError> {
        match self {
            AssetJob::Thumbnails => Ok(collect_categories(root, exclude)?),
            AssetJob::Optimize if !publish_dir.is_dir() => {
                log::debug!("{self}: {} does not exist", publish_dir.display());
                Ok(Vec::new())
            }
            AssetJob::Optimize => Ok(collect_categories(publish_dir, exclude)?),
        }
    }

    fn plan(self, category_dir: &Path, filename: &str, options: &ProcessOptions) -> Vec<PlannedOp> {
        match self {
            AssetJob::Thumbnails => vec![plan_thumbnail(category_dir, filename, &options.thumbnail)],
            AssetJob::Optimize => plan_variants(category_dir, filename, &options.variants),
        }
    }
}

impl fmt::Display for AssetJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetJob::Thumbnails => write!(f, "thumbnails"),
            AssetJob::Optimize => write!(f, "optimize"),
        }
    }
}

/// Settings shared by both jobs.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub thumbnail: ThumbnailConfig,
    pub variants: VariantConfig,
    pub freshness: FreshnessMode,
    /// When false every output is regenerated regardless of freshness.
    pub use_cache: bool,
}

impl ProcessOptions {
    pub fn from_config(config: &PipelineConfig, use_cache: bool) -> Self {
        Self {
            thumbnail: ThumbnailConfig {
                max_size: config.thumbnails.max_size,
                quality: Quality::new(config.thumbnails.quality),
            },
            variants: VariantConfig {
                quality: Quality::new(config.optimize.quality),
            },
            freshness: config.cache.freshness,
            use_cache,
        }
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            thumbnail: ThumbnailConfig::default(),
            variants: VariantConfig::default(),
            freshness: FreshnessMode::default(),
            use_cache: true,
        }
    }
}

/// Progress events emitted while a job runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    CategoryStarted {
        job: AssetJob,
        folder: String,
        image_count: usize,
    },
    /// One source image finished. Sent from worker threads, so images within a
    /// category arrive in completion order.
    ImageProcessed {
        folder: String,
        filename: String,
        outputs: Vec<OutputInfo>,
    },
}

/// Outcome for a single derived file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    /// Output path relative to the category, e.g. `thumbs/thumb_eagle.jpg`.
    pub label: String,
    pub status: OutputStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStatus {
    /// Up to date, skipped.
    Fresh,
    Generated,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub job: AssetJob,
    /// Categories with at least one source image.
    pub categories: usize,
    pub stats: CacheStats,
}

/// Generate thumbnails with the production backend.
pub fn generate_thumbnails<S: AsRef<str>>(
    root: &Path,
    publish_dir: &Path,
    exclude: &[S],
    options: &ProcessOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    process_with_backend(
        &RustBackend::new(),
        AssetJob::Thumbnails,
        root,
        publish_dir,
        exclude,
        options,
        progress,
    )
}

/// Generate WebP and optimized variants with the production backend.
pub fn optimize_images<S: AsRef<str>>(
    root: &Path,
    publish_dir: &Path,
    exclude: &[S],
    options: &ProcessOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    process_with_backend(
        &RustBackend::new(),
        AssetJob::Optimize,
        root,
        publish_dir,
        exclude,
        options,
        progress,
    )
}

/// Shared per-run state handed to every worker.
struct JobContext<'a> {
    publish_dir: &'a Path,
    options: &'a ProcessOptions,
    /// Present only in content-hash mode.
    manifest: Option<Mutex<CacheManifest>>,
}

/// Run a job using a specific backend (allows testing with mock).
pub fn process_with_backend<S: AsRef<str>>(
    backend: &impl ImageBackend,
    job: AssetJob,
    root: &Path,
    publish_dir: &Path,
    exclude: &[S],
    options: &ProcessOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let folders = job.categories(root, publish_dir, exclude)?;

    let ctx = JobContext {
        publish_dir,
        options,
        manifest: (options.freshness == FreshnessMode::ContentHash).then(|| {
            Mutex::new(if options.use_cache {
                CacheManifest::load(publish_dir)
            } else {
                CacheManifest::empty()
            })
        }),
    };

    let mut stats = CacheStats::default();
    let mut categories = 0;

    for folder in folders {
        let category_dir = publish_dir.join(&folder);
        if !category_dir.is_dir() {
            log::debug!("{job}: {folder} not in publish directory, skipped");
            continue;
        }

        let sources = list_sources(job, &category_dir)?;
        let plans = plan_category(job, &category_dir, &sources, options);
        if plans.is_empty() {
            continue;
        }
        categories += 1;

        for dir in job.output_dirs() {
            fs::create_dir_all(category_dir.join(dir))?;
        }

        if let Some(tx) = &progress {
            let _ = tx.send(ProcessEvent::CategoryStarted {
                job,
                folder: folder.clone(),
                image_count: plans.len(),
            });
        }

        let results: Vec<Vec<OutputInfo>> = plans
            .par_iter()
            .map(|(filename, ops)| {
                let outputs = process_image(backend, &category_dir, filename, ops, &ctx);
                if let Some(tx) = &progress {
                    let _ = tx.send(ProcessEvent::ImageProcessed {
                        folder: folder.clone(),
                        filename: filename.clone(),
                        outputs: outputs.clone(),
                    });
                }
                outputs
            })
            .collect();

        for info in results.iter().flatten() {
            match info.status {
                OutputStatus::Fresh => stats.fresh += 1,
                OutputStatus::Generated => stats.generated += 1,
                OutputStatus::Failed(_) => stats.failed += 1,
            }
        }
    }

    if let Some(manifest) = ctx.manifest {
        let manifest = manifest.into_inner().unwrap_or_else(|e| e.into_inner());
        manifest.save(publish_dir)?;
    }

    Ok(ProcessResult {
        job,
        categories,
        stats,
    })
}

/// Source filenames for `job` directly inside `category_dir`, sorted.
fn list_sources(job: AssetJob, category_dir: &Path) -> Result<Vec<String>, ProcessError> {
    let entries = fs::read_dir(category_dir).map_err(|source| ProcessError::ReadCategory {
        path: category_dir.to_path_buf(),
        source,
    })?;
    let mut sources: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| job.accepts(name))
        .collect();
    sources.sort();
    Ok(sources)
}

/// Plan every source of a category, giving each output path a single owner.
///
/// The last source in `sources` order keeps a contested output. Sources left
/// with nothing to write are dropped.
fn plan_category(
    job: AssetJob,
    category_dir: &Path,
    sources: &[String],
    options: &ProcessOptions,
) -> Vec<(String, Vec<PlannedOp>)> {
    let mut plans: Vec<(String, Vec<PlannedOp>)> = sources
        .iter()
        .map(|filename| (filename.clone(), job.plan(category_dir, filename, options)))
        .collect();

    let mut owners: HashMap<PathBuf, usize> = HashMap::new();
    for (index, (_, ops)) in plans.iter().enumerate() {
        for op in ops {
            owners.insert(op.output().to_path_buf(), index);
        }
    }

    for (index, (filename, ops)) in plans.iter_mut().enumerate() {
        ops.retain(|op| match owners.get(op.output()) {
            Some(&owner) if owner != index => {
                log::warn!(
                    "{}: {} is written from {} instead",
                    category_dir.join(filename.as_str()).display(),
                    relative_label(op.output(), category_dir),
                    sources[owner]
                );
                false
            }
            _ => true,
        });
    }

    plans.retain(|(_, ops)| !ops.is_empty());
    plans
}

/// Run every planned output for one source, skipping fresh ones.
fn process_image(
    backend: &impl ImageBackend,
    category_dir: &Path,
    filename: &str,
    ops: &[PlannedOp],
    ctx: &JobContext<'_>,
) -> Vec<OutputInfo> {
    // One hash per source, shared by all its outputs.
    let source_hash = ctx.manifest.as_ref().and_then(|_| {
        let source = category_dir.join(filename);
        match cache::hash_file(&source) {
            Ok(hash) => Some(hash),
            Err(e) => {
                log::warn!("cannot hash {}: {e}", source.display());
                None
            }
        }
    });

    ops.iter()
        .map(|op| {
            let label = relative_label(op.output(), category_dir);
            let status = run_op(backend, op, source_hash.as_deref(), ctx);
            OutputInfo { label, status }
        })
        .collect()
}

fn run_op(
    backend: &impl ImageBackend,
    op: &PlannedOp,
    source_hash: Option<&str>,
    ctx: &JobContext<'_>,
) -> OutputStatus {
    let key = relative_label(op.output(), ctx.publish_dir);
    let params_hash = cache::hash_params(&op.cache_key());

    if ctx.options.use_cache && is_fresh(op, &key, source_hash, &params_hash, ctx) {
        log::debug!("fresh: {key}");
        return OutputStatus::Fresh;
    }

    match op.run(backend) {
        Ok(()) => {
            if let (Some(manifest), Some(hash)) = (&ctx.manifest, source_hash) {
                let mut manifest = manifest.lock().unwrap_or_else(|e| e.into_inner());
                manifest.insert(key, hash.to_string(), params_hash);
            }
            OutputStatus::Generated
        }
        Err(e) => {
            log::error!("{}: {e}", op.source().display());
            OutputStatus::Failed(e.to_string())
        }
    }
}

fn is_fresh(
    op: &PlannedOp,
    key: &str,
    source_hash: Option<&str>,
    params_hash: &str,
    ctx: &JobContext<'_>,
) -> bool {
    match ctx.options.freshness {
        FreshnessMode::Mtime => cache::is_fresh_by_mtime(op.source(), op.output()),
        FreshnessMode::ContentHash => match (&ctx.manifest, source_hash) {
            (Some(manifest), Some(hash)) => manifest
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .is_fresh(key, hash, params_hash, ctx.publish_dir),
            _ => false,
        },
    }
}

/// `/`-separated path of `path` below `base`.
fn relative_label(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
