//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Status;
use clap::Parser;
use std::path::PathBuf;

/// SubScout - checks whether a social profile promotes a paid-subscription page
///
/// Scores the profile biography, follows link-in-bio aggregators and runs
/// keyword searches, then combines the signals into a confidence score.
///
/// Examples:
///   subscout                              (serve the HTTP API)
///   subscout --port 8080
///   subscout --check @someone
///   subscout --check someone --format json --output result.json
///   subscout --check someone --fail-on possibly
///   subscout --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Check a single handle and print a report instead of serving the API
    #[arg(long, value_name = "HANDLE")]
    pub check: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .subscout.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the report to a file instead of stdout (with --check)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format (with --check)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Address to bind the API server to
    #[arg(long, value_name = "HOST", env = "SUBSCOUT_HOST")]
    pub host: Option<String>,

    /// Port to bind the API server to
    #[arg(short, long, value_name = "PORT", env = "SUBSCOUT_PORT")]
    pub port: Option<u16>,

    /// Maximum link-in-bio traversal depth
    #[arg(long, value_name = "DEPTH")]
    pub max_depth: Option<usize>,

    /// Number of name variations to search for
    #[arg(long, value_name = "NUM")]
    pub max_variations: Option<usize>,

    /// Timeout for every outbound request, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Disable the pauses between outbound requests
    #[arg(long)]
    pub no_delay: bool,

    /// Exit with code 2 when the status is at or above this level (with --check)
    #[arg(long, value_name = "STATUS")]
    pub fail_on: Option<FailOnLevel>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .subscout.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Status threshold for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    LowConfidence,
    Possibly,
    HighlyLikely,
    Confirmed,
}

impl From<FailOnLevel> for Status {
    fn from(level: FailOnLevel) -> Self {
        match level {
            FailOnLevel::LowConfidence => Status::LowConfidence,
            FailOnLevel::Possibly => Status::Possibly,
            FailOnLevel::HighlyLikely => Status::HighlyLikely,
            FailOnLevel::Confirmed => Status::Confirmed,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.check.is_none() {
            if self.output.is_some() {
                return Err("--output requires --check".to_string());
            }
            if self.fail_on.is_some() {
                return Err("--fail-on requires --check".to_string());
            }
        }

        if let Some(ref handle) = self.check {
            crate::server::routes::normalize_handle(handle).map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
