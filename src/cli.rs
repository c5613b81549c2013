//! CLI argument parsing for skysnap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the snapshot printed after each pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "skysnap")]
#[command(version)]
#[command(about = "Rolling sensor snapshots from astronomical imaging session logs", long_about = None)]
pub struct Cli {
    /// Session log to parse (mutually exclusive with --dir)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Parse the newest session log in this directory on every pass
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Session log extension used with --dir (default: analyze)
    #[arg(long = "ext", value_name = "EXT")]
    pub extension: Option<String>,

    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the JSON snapshot envelope to this path after each pass
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format printed to stdout
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Keep re-parsing the session log on a fixed interval
    #[arg(short = 'w', long = "watch")]
    pub watch: bool,

    /// Seconds between passes in --watch mode (default: 15)
    #[arg(short = 'i', long = "interval", value_name = "SECS")]
    pub interval: Option<u64>,

    /// Do not log per-category summaries after each pass
    #[arg(long = "no-summary")]
    pub no_summary: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
