//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no I/O happens here. Every flag is optional so that
//! unset flags fall through to the environment, the config file and the
//! built-in defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use ndfilter_pipeline::{NonStringPolicy, OutputFormat, OutputOrder};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ndfilter.toml";

/// ndfilter -- filter newline-delimited JSON records by per-field regex.
///
/// Reads one JSON object per line, keeps records whose fields match every
/// filter pattern, optionally projects a subset of fields, and writes the
/// survivors as JSON or CSV.
#[derive(Parser, Debug, Default)]
#[command(name = "ndfilter", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (default: ./ndfilter.toml if present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Filters as a JSON object mapping field name to regex, e.g. '{"status":"^ok$"}'.
    #[arg(short, long)]
    pub filters: Option<String>,

    /// Read filters from a JSON file (merged below --filters).
    #[arg(long, value_name = "PATH")]
    pub filters_file: Option<PathBuf>,

    /// Number of parse/filter workers.
    #[arg(short = 'n', long)]
    pub concurrency: Option<usize>,

    /// Comma-separated list of fields to output (default: all fields).
    #[arg(short, long, value_name = "FIELDS")]
    pub project: Option<String>,

    /// Output format (json, csv).
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Output order (arrival, input).
    #[arg(long)]
    pub order: Option<OutputOrder>,

    /// Handling of non-string JSON values (reject, stringify).
    #[arg(long)]
    pub non_string: Option<NonStringPolicy>,

    /// Capacity of the work and result channels.
    #[arg(long)]
    pub channel_capacity: Option<usize>,

    /// Maximum accepted line length in bytes.
    #[arg(long)]
    pub max_line_bytes: Option<usize>,

    /// Input file ('-' or absent means stdin).
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output file ('-' or absent means stdout).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format written to stderr.
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Resolve and validate the configuration, print it and exit.
    #[arg(long)]
    pub validate: bool,
}

/// Supported log formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Machine-readable JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

/// Whether a path argument names a standard stream.
pub fn is_std_stream(path: Option<&PathBuf>) -> bool {
    path.is_none_or(|p| p.as_os_str() == "-")
}
