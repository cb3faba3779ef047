#![warn(missing_docs)]
//! Hypotest CLI Library
//!
//! Command-line front end and HTTP service for hypotest. Use
//! `hypotest::run()` (or `hypotest_cli::run()`) in a binary's `main` to get
//! the full `hypotest` command set.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     hypotest_cli::run()
//! }
//! ```

mod config;
mod server;

pub use config::*;
pub use server::{AppState, UploadLimits, router, serve};

use anyhow::Context;
use clap::{Parser, Subcommand};
use hypotest_core::{AnalysisRecord, Analyzer, Dataset, parse_configuration};
use hypotest_report::{AnalysisResponse, OutputFormat, render_analysis, render_history};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use regex::Regex;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Hypotest CLI arguments
#[derive(Parser, Debug)]
#[command(name = "hypotest")]
#[command(author, version, about = "Hypotest - hypothesis testing over group/value data")]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: human, json, csv
    #[arg(long, default_value = "human", global = true)]
    pub format: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads for batch analysis
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0", global = true)]
    pub threads: usize,

    /// Configuration file (default: discover hypotest.toml upwards)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON result store file; overrides the configured store
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
    },
    /// Analyze one or more `group,value` CSV files
    Analyze {
        /// CSV files with `group` and `value` columns
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Test to run, e.g. t-test-independent, anova, mann-whitney
        #[arg(long, short = 't')]
        test: String,
        /// Confidence level as a fraction, e.g. 0.95
        #[arg(long, short = 'c')]
        confidence: Option<f64>,
    },
    /// List stored analyses, most recent first
    History {
        /// Only show analyses whose filename or test matches this regex
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one stored analysis
    Show {
        /// Analysis id
        id: u64,
    },
    /// Recompute a stored analysis as a new record
    Rerun {
        /// Analysis id
        id: u64,
    },
    /// Delete a stored analysis
    Delete {
        /// Analysis id
        id: u64,
    },
    /// Print a commented default hypotest.toml
    Init,
}

/// Run the Hypotest CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Hypotest CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    if let Commands::Init = cli.command {
        print!("{}", HypotestConfig::default_toml());
        return Ok(());
    }

    // CLI flags override hypotest.toml
    let mut config = match &cli.config {
        Some(path) => HypotestConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => HypotestConfig::discover().unwrap_or_default(),
    };
    if let Some(path) = &cli.store {
        config.store.backend = StoreBackend::Json;
        config.store.path = path.clone();
    }

    let format: OutputFormat = cli.format.parse().unwrap_or_else(|e: String| {
        warn!("{e}; falling back to human output");
        OutputFormat::Human
    });

    let analyzer = build_analyzer(&config)?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve_blocking(&config, analyzer)?;
        }
        Commands::Analyze {
            ref files,
            ref test,
            confidence,
        } => {
            let threads = if cli.threads > 0 {
                cli.threads
            } else {
                config.analysis.threads.unwrap_or(0)
            };
            let confidence = confidence.unwrap_or(config.analysis.default_confidence_level);
            analyze_files(&analyzer, &config, files, test, confidence, threads, format)?;
        }
        Commands::History { ref filter } => {
            show_history(&analyzer, filter.as_deref(), format)?;
        }
        Commands::Show { id } => {
            let record = analyzer.get(id)?;
            emit(&render_analysis(&AnalysisResponse::from(&record), format)?);
        }
        Commands::Rerun { id } => {
            let record = analyzer.rerun(id)?;
            emit(&render_analysis(&AnalysisResponse::from(&record), format)?);
        }
        Commands::Delete { id } => {
            analyzer.delete(id)?;
            println!("Deleted analysis #{id}");
        }
        Commands::Init => {}
    }

    Ok(())
}

/// `hypotest=info` (or `debug` with `--verbose`) unless RUST_LOG is set
fn init_logging(verbose: bool) {
    let default = if verbose {
        "hypotest=debug"
    } else {
        "hypotest=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Analyzer over the configured store and engine options
pub fn build_analyzer(config: &HypotestConfig) -> anyhow::Result<Analyzer> {
    let store = config
        .store
        .open()
        .with_context(|| format!("failed to open result store {}", config.store.path.display()))?;
    Ok(Analyzer::new(store).with_options(config.analysis.engine_options()))
}

fn serve_blocking(config: &HypotestConfig, analyzer: Analyzer) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let state = AppState {
        analyzer,
        limits: UploadLimits {
            max_upload_bytes: config.server.max_upload_bytes,
            max_rows: config.server.max_rows,
        },
        default_confidence_level: config.analysis.default_confidence_level,
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(addr, state))
}

/// Read one CSV file into a dataset, honouring the row limit
pub fn read_dataset(path: &Path, max_rows: usize) -> anyhow::Result<Dataset> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Dataset::from_csv_reader(BufReader::new(file), Some(max_rows))
        .with_context(|| format!("failed to read {}", path.display()))
}

fn analyze_files(
    analyzer: &Analyzer,
    config: &HypotestConfig,
    files: &[PathBuf],
    test: &str,
    confidence: f64,
    threads: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    // Configure Rayon thread pool for batch analysis
    if threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    // Reject a bad test name once rather than per file
    let configuration = parse_configuration(test, confidence)?;
    let max_rows = config.server.max_rows;

    info!(files = files.len(), test = %configuration.kind, "analyzing files");

    let results: Vec<(PathBuf, anyhow::Result<AnalysisRecord>)> = files
        .par_iter()
        .map(|path| {
            let result = read_dataset(path, max_rows).and_then(|dataset| {
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Ok(analyzer.run_analysis(&dataset, configuration, &filename)?)
            });
            (path.clone(), result)
        })
        .collect();

    let mut responses = Vec::new();
    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(record) => responses.push(AnalysisResponse::from(&record)),
            Err(e) => {
                failures += 1;
                eprintln!("✗ {}: {:#}", path.display(), e);
            }
        }
    }

    match format {
        OutputFormat::Csv | OutputFormat::Json if responses.len() != 1 => {
            emit(&render_history(&responses, format)?);
        }
        _ => {
            for response in &responses {
                emit(&render_analysis(response, format)?);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} files failed", files.len());
    }
    Ok(())
}

fn show_history(
    analyzer: &Analyzer,
    filter: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let filter_re = filter
        .map(Regex::new)
        .transpose()
        .context("invalid --filter pattern")?;

    let history: Vec<AnalysisResponse> = analyzer
        .history()?
        .iter()
        .map(AnalysisResponse::from)
        .filter(|response| match &filter_re {
            Some(re) => matches_filter(re, response),
            None => true,
        })
        .collect();

    emit(&render_history(&history, format)?);
    Ok(())
}

/// Whether a history entry's filename or test name matches `re`
pub fn matches_filter(re: &Regex, response: &AnalysisResponse) -> bool {
    re.is_match(&response.filename) || re.is_match(response.test_type.name())
}

fn emit(output: &str) {
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}
