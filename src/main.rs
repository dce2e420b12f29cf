//! SubScout - heuristic check for profiles promoting paid-subscription pages
//!
//! Serves a small HTTP API by default, or runs a single check from the
//! command line with `--check`.
//!
//! Exit codes:
//!   0 - Success (or status below --fail-on)
//!   1 - Runtime error (configuration, bind failure, write failure, etc.)
//!   2 - Status at or above the --fail-on level

mod analysis;
mod cli;
mod config;
mod fetch;
mod links;
mod models;
mod report;
mod search;
mod server;

use analysis::Checker;
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::Status;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("SubScout v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("SubScout failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .subscout.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the target platform, aggregators, and delays.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Serve the API or run one check. Returns the process exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let checker = Checker::from_config(&config)?;

    match args.check.as_deref() {
        Some(raw) => run_check(&args, raw, &checker).await,
        None => {
            server::serve(&config.server, checker).await?;
            Ok(0)
        }
    }
}

/// Run a single check from the command line and emit the report.
async fn run_check(args: &Args, raw_handle: &str, checker: &Checker) -> Result<i32> {
    let handle = server::routes::normalize_handle(raw_handle)?;
    let start_time = Instant::now();

    let spinner = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Checking @{}...", handle));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    let result = checker.check(&handle).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&result)?,
        OutputFormat::Markdown => report::generate_markdown_report(&result),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                println!("✅ Report saved to: {}", path.display());
            }
        }
        None => println!("{}", output),
    }

    info!(
        "Check of @{} finished in {:.1}s: {} ({}/100)",
        handle,
        start_time.elapsed().as_secs_f64(),
        result.status,
        result.confidence_score
    );

    if let Some(level) = args.fail_on {
        let threshold = Status::from(level);
        if result.status >= threshold {
            eprintln!(
                "\n⛔ Status {} is at or above {}. Failing (exit code 2).",
                result.status, threshold
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
