//! Command-line interface for logcheck.

use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::analysis::{
    language_for_extension, Counting, ExtractOptions, Extractor, LanguageAnalyzer, Scope,
};
use crate::batch::{build_exclusions, collect_files, BatchResult, Runner};
use crate::config::{self, Config, DEFAULT_CONFIG_NAMES, TEMPLATE};
use crate::recommend;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Logging coverage analysis for Python, Java and JavaScript.
///
/// Logcheck walks the syntax tree of each source file, describes every
/// statement block with a fixed-schema feature vector and tells whether the
/// block already logs. The vectors feed logging-prediction models; the
/// recommend command lists exception handlers that never log.
#[derive(Parser)]
#[command(name = "logcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase diagnostic output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract block feature vectors as CSV or JSON
    Extract(ExtractArgs),
    /// List blocks that should log but do not
    Recommend(RecommendArgs),
    /// Create a logcheck.yaml from the template
    Init(InitArgs),
}

/// Options shared by extract and recommend.
#[derive(Args)]
pub struct SourceArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    /// Language of the files: python, java or javascript
    #[arg(short, long)]
    pub language: Option<String>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Blocks to extract: functions (default) or file
    #[arg(long)]
    pub scope: Option<String>,

    /// Number of worker threads (default: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
}

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format: csv or json
    #[arg(short, long, default_value = "csv")]
    pub format: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,

    /// Keep blocks that already log (training data)
    #[arg(short, long)]
    pub training: bool,

    /// Add the serialized context column
    #[arg(long)]
    pub context: bool,

    /// Add the file column
    #[arg(long)]
    pub debug: bool,

    /// Clamp contains_* counters to 0/1
    #[arg(long)]
    pub onehot: bool,
}

/// Arguments for the recommend command.
#[derive(Args)]
pub struct RecommendArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Consider every block, not only exception handlers
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "logcheck.yaml")]
    pub output: PathBuf,

    /// Overwrite the file if it exists
    #[arg(long)]
    pub force: bool,
}

/// Everything a run needs after config and flags are merged.
struct Settings {
    analyzer: &'static dyn LanguageAnalyzer,
    config: Config,
    root: PathBuf,
    files: Vec<PathBuf>,
}

/// Load the config named on the command line or discovered next to the
/// scanned path or in the current directory.
fn load_config(explicit: Option<&Path>, root: &Path) -> anyhow::Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let dir = if root.is_dir() {
                root
            } else {
                root.parent().unwrap_or(Path::new("."))
            };
            Config::discover(dir).or_else(|| Config::discover(Path::new(".")))
        }
    };
    let Some(path) = path else {
        tracing::debug!(
            "no config file found (looked for {})",
            DEFAULT_CONFIG_NAMES.join(", ")
        );
        return Ok(Config::default());
    };

    tracing::debug!(config = %path.display(), "loading config");
    let config = Config::parse_file(&path)?;
    config.validate()?;
    Ok(config)
}

fn parse_scope(value: &str) -> anyhow::Result<Scope> {
    match value {
        "functions" => Ok(Scope::Functions),
        "file" => Ok(Scope::File),
        _ => anyhow::bail!("invalid scope {:?}, must be 'functions' or 'file'", value),
    }
}

/// Merge flags over the config and collect the files to scan.
fn resolve(args: &SourceArgs) -> anyhow::Result<Settings> {
    let root = args
        .path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("cannot access path {:?}: {}", args.path, e))?;

    let mut config = load_config(args.config.as_deref(), &root)?;
    if let Some(scope) = &args.scope {
        config.scope = Some(parse_scope(scope)?);
    }

    let inferred = root
        .extension()
        .and_then(|e| e.to_str())
        .and_then(language_for_extension);
    let language = match (&args.language, &config.language, inferred) {
        (Some(language), _, _) | (None, Some(language), _) => language.clone(),
        (None, None, Some(language)) => language.to_string(),
        (None, None, None) => {
            anyhow::bail!("no language given; use --language or set it in logcheck.yaml")
        }
    };
    config::check_language(&language)?;
    config.language = Some(language.clone());
    let analyzer = config::analyzer_for(&language)?;

    let excluded = build_exclusions(&config.excluded_paths)?;
    let files = collect_files(&root, &language, &excluded)?;
    let base = if root.is_dir() {
        root.clone()
    } else {
        root.parent().map(Path::to_path_buf).unwrap_or_default()
    };

    Ok(Settings {
        analyzer,
        config,
        root: base,
        files,
    })
}

fn run_batch(
    settings: &Settings,
    options: ExtractOptions,
    args: &SourceArgs,
) -> anyhow::Result<BatchResult> {
    let matcher = settings.config.matcher_for(settings.analyzer)?;
    tracing::debug!(
        language = settings.analyzer.language_id(),
        pattern = matcher.pattern(),
        files = settings.files.len(),
        "starting extraction"
    );
    let extractor = Extractor::new(settings.analyzer, matcher, options);
    let mut runner = Runner::new(extractor, &settings.root).progress(args.progress);
    if let Some(jobs) = args.jobs {
        runner = runner.threads(jobs);
    }
    runner.run(&settings.files)
}

/// Open the output file, refusing to overwrite without `force`.
fn open_output(output: Option<&Path>, force: bool) -> anyhow::Result<Box<dyn Write>> {
    match output {
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
        Some(path) => {
            if path.exists() && !force {
                anyhow::bail!(
                    "file already exists: {} (use --force to overwrite)",
                    path.display()
                );
            }
            Ok(Box::new(BufWriter::new(File::create(path)?)))
        }
    }
}

/// Run the extract command.
pub fn run_extract(args: &ExtractArgs) -> anyhow::Result<i32> {
    if args.format != "csv" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'csv' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let settings = match resolve(&args.source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if settings.files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let mut out = match open_output(args.output.as_deref(), args.force) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let config = &settings.config;
    let counting = if args.onehot {
        Counting::OneHot
    } else {
        config.counting.unwrap_or_default()
    };
    let options = ExtractOptions {
        training: args.training,
        context: args.context || config.context.unwrap_or(false),
        debug: args.debug || config.debug.unwrap_or(false),
        counting,
        scope: config.scope.unwrap_or_default(),
    };
    let result = run_batch(&settings, options, &args.source)?;

    match args.format.as_str() {
        "json" => report::write_json(&mut out, settings.analyzer.language_id(), &result)?,
        _ => report::write_csv(&mut out, &result)?,
    }
    out.flush()?;
    report::write_summary(&result);

    Ok(EXIT_SUCCESS)
}

/// Run the recommend command.
pub fn run_recommend(args: &RecommendArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let settings = match resolve(&args.source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if settings.files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    // Logged blocks are kept so the summary can count them.
    let options = ExtractOptions {
        training: true,
        scope: settings.config.scope.unwrap_or_default(),
        ..Default::default()
    };
    let result = run_batch(&settings, options, &args.source)?;
    let recommendations =
        recommend::recommend(&result, settings.analyzer.profile(), args.all);

    let path_str = args.source.path.to_string_lossy().to_string();
    match args.format.as_str() {
        "json" => {
            let mut out = io::stdout().lock();
            report::write_recommendations_json(&mut out, &path_str, &recommendations)?;
        }
        _ => report::write_recommendations_pretty(&path_str, &recommendations),
    }
    report::write_summary(&result);

    if recommendations.is_empty() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FINDINGS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --force to overwrite");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set the language and exclusions in {}", args.output.display());
    println!("  2. Run: logcheck extract . --training --output features.csv");

    Ok(EXIT_SUCCESS)
}
