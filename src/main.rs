use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use postcard_pipeline::config::{self, PipelineConfig};
use postcard_pipeline::process::{self, AssetJob, ProcessOptions, ProcessResult};
use postcard_pipeline::{catalog, collect, mirror, output};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::error::Error;
use std::path::PathBuf;

/// Shared flags for commands that process images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable freshness checks and regenerate every derived image
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "postcard-pipeline")]
#[command(about = "Asset build pipeline for a static postcard gallery")]
#[command(long_about = "\
Asset build pipeline for a static postcard gallery

Top-level folders of the project root are categories. Images inside a
category pair up into postcards by filename:

  Birds/
  ├── eagle.jpg          # front
  ├── eagle_001.jpg      # back
  ├── eagle_002.jpg      # alternate-effect imagery (ignored)
  └── owl.png            # front, no back (back falls back to front)

Hidden folders and node_modules, .git, dist, .astro, public, src, .github
and 260113 are never categories.

Outputs:
  public/<category>/                 mirrored sources
  public/<category>/thumbs/          thumb_<name>.jpg, fit inside 300x300
  public/<category>/webp/            <name>.webp
  public/<category>/optimized/       recompressed copy in the source format
  src/data/metadata.json             postcard catalog

Run 'postcard-pipeline gen-config' to generate a documented postcards.toml.")]
#[command(version)]
struct Cli {
    /// Project root containing the category folders
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Publish directory, relative to the root (overrides postcards.toml)
    #[arg(long, global = true)]
    publish_dir: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the category folders
    Collect,
    /// Mirror category folders into the publish directory
    Copy,
    /// Write the postcard catalog JSON
    Metadata,
    /// Generate thumbnails for front images
    Thumbnails(CacheArgs),
    /// Generate WebP and recompressed variants
    Optimize(CacheArgs),
    /// Run the full pipeline: copy → metadata → thumbnails → optimize
    Build(CacheArgs),
    /// Derive the catalog and print it without writing anything
    Check,
    /// Print a stock postcards.toml with all options documented
    GenConfig,
}

/// Resolved configuration for one invocation.
struct Project {
    root: PathBuf,
    config: PipelineConfig,
    publish: PathBuf,
    excludes: Vec<String>,
}

impl Project {
    fn load(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let mut config = config::load_config(&cli.root)?;
        if let Some(dir) = &cli.publish_dir {
            config.publish_dir = dir.clone();
            config.validate()?;
        }
        Ok(Self {
            root: cli.root.clone(),
            publish: config.publish_path(&cli.root),
            excludes: config.root_excludes(&cli.root),
            config,
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::Collect => {
            let project = Project::load(&cli)?;
            let categories = collect::collect_categories(&project.root, &project.excludes)?;
            output::print_collect_output(&categories);
        }
        Command::Copy => {
            let project = Project::load(&cli)?;
            run_copy(&project)?;
        }
        Command::Metadata => {
            let project = Project::load(&cli)?;
            run_metadata(&project)?;
        }
        Command::Thumbnails(cache_args) => {
            let project = Project::load(&cli)?;
            init_thread_pool(&project.config.processing);
            run_job(AssetJob::Thumbnails, &project, !cache_args.no_cache)?;
        }
        Command::Optimize(cache_args) => {
            let project = Project::load(&cli)?;
            init_thread_pool(&project.config.processing);
            run_job(AssetJob::Optimize, &project, !cache_args.no_cache)?;
        }
        Command::Build(cache_args) => {
            let project = Project::load(&cli)?;
            init_thread_pool(&project.config.processing);

            println!("==> Stage 1: Copying categories to {}", project.publish.display());
            run_copy(&project)?;

            println!("==> Stage 2: Generating metadata");
            run_metadata(&project)?;

            println!("==> Stage 3: Generating thumbnails");
            let thumbs = run_job(AssetJob::Thumbnails, &project, !cache_args.no_cache)?;

            println!("==> Stage 4: Optimizing images");
            let optimized = run_job(AssetJob::Optimize, &project, !cache_args.no_cache)?;

            let mut stats = thumbs.stats;
            stats.merge(&optimized.stats);
            if stats.failed > 0 {
                println!("==> Build complete with {} failed outputs", stats.failed);
            } else {
                println!("==> Build complete: {}", project.publish.display());
            }
        }
        Command::Check => {
            let project = Project::load(&cli)?;
            println!("==> Checking {}", project.root.display());
            let catalog = catalog::build_catalog(&project.root, &project.excludes)?;
            output::print_catalog_output(&catalog);
            println!("{}", output::format_catalog_summary(&catalog));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_copy(project: &Project) -> Result<(), Box<dyn Error>> {
    let report = mirror::mirror_categories(&project.root, &project.publish, &project.excludes)?;
    output::print_mirror_output(&report, &project.config.publish_dir);
    Ok(())
}

fn run_metadata(project: &Project) -> Result<(), Box<dyn Error>> {
    let catalog = catalog::build_catalog(&project.root, &project.excludes)?;
    let path = project.config.catalog_file(&project.root);
    catalog::write_catalog(&catalog, &path)?;
    output::print_catalog_written(&catalog, &path);
    Ok(())
}

/// Run one image job with a printer thread draining its progress events.
fn run_job(
    job: AssetJob,
    project: &Project,
    use_cache: bool,
) -> Result<ProcessResult, Box<dyn Error>> {
    let options = ProcessOptions::from_config(&project.config, use_cache);
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });

    let result = run_job_with_progress(job, project, &options, tx);
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    let result = result?;
    output::print_process_result(&result);
    Ok(result)
}

fn run_job_with_progress(
    job: AssetJob,
    project: &Project,
    options: &ProcessOptions,
    tx: std::sync::mpsc::Sender<process::ProcessEvent>,
) -> Result<ProcessResult, process::ProcessError> {
    let (root, publish) = (&project.root, &project.publish);
    match job {
        AssetJob::Thumbnails => {
            process::generate_thumbnails(root, publish, &project.excludes, options, Some(tx))
        }
        AssetJob::Optimize => {
            process::optimize_images(root, publish, &project.excludes, options, Some(tx))
        }
    }
}

/// Terminal logger on stderr so stdout carries only progress output.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto).ok();
}

/// Initialize the global rayon pool from `[processing].max_processes`.
///
/// Capped at the number of available cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
