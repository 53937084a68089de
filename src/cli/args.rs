//! Command-line argument definitions for the taxi trip tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::app::models::TripSchema;
use crate::constants::{
    DEFAULT_MIN_ROUTE_TRIPS, DEFAULT_PEAK_DAYS, DEFAULT_ROUTE_LIMIT, DEFAULT_TRIP_LIMIT,
};
use crate::utils::time::parse_datetime;
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the taxi trip processor
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taxi-trips",
    version,
    about = "Ingest, clean and analyse taxi trip CSV datasets",
    long_about = "Reads taxi trip CSV files in fixed-size chunks, drops rows that fail \
                  validation, stores the surviving trips and reports trip statistics, \
                  hourly and weekly demand, popular routes and distance distributions."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Ingest a CSV file and print the ingestion statistics
    Ingest(IngestArgs),
    /// Ingest a CSV file and print trip statistics and analytics
    Report(ReportArgs),
}

/// Source file and chunking options shared by every command
#[derive(Debug, Clone, ClapArgs)]
pub struct SourceArgs {
    /// CSV file to ingest
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Rows read and committed per chunk
    ///
    /// Defaults to BATCH_SIZE from the environment, or 1000.
    #[arg(short = 'b', long = "batch-size", value_name = "ROWS")]
    pub batch_size: Option<usize>,

    /// Dataset shape to clean for instead of detecting it per chunk
    #[arg(long = "schema", value_name = "SCHEMA", value_parser = parse_schema)]
    pub schema: Option<TripSchema>,
}

/// Logging and output options shared by every command
#[derive(Debug, Clone, ClapArgs)]
pub struct OutputArgs {
    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors and critical messages. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl OutputArgs {
    /// Log level implied by the verbosity flags
    ///
    /// `None` defers to the configured level.
    pub fn log_level(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}

/// Arguments for the ingest command
#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the report command
#[derive(Debug, Clone, Parser)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only include trips picked up at or after this time
    #[arg(long = "start", value_name = "TIMESTAMP", value_parser = parse_timestamp)]
    pub start: Option<DateTime<Utc>>,

    /// Only include trips picked up at or before this time
    #[arg(long = "end", value_name = "TIMESTAMP", value_parser = parse_timestamp)]
    pub end: Option<DateTime<Utc>>,

    /// Maximum number of trips listed
    #[arg(long = "limit", default_value_t = DEFAULT_TRIP_LIMIT)]
    pub limit: usize,

    /// Number of popular routes listed
    #[arg(long = "routes", default_value_t = DEFAULT_ROUTE_LIMIT)]
    pub routes: usize,

    /// Minimum trips for a route to be ranked
    #[arg(long = "min-trips", default_value_t = DEFAULT_MIN_ROUTE_TRIPS)]
    pub min_trips: usize,

    /// Trailing window for peak hours, in days
    #[arg(long = "days", default_value_t = DEFAULT_PEAK_DAYS)]
    pub days: i64,

    /// Treat this time as "now" for the peak-hour window
    ///
    /// Historical datasets usually need this; the default is the current time.
    #[arg(long = "as-of", value_name = "TIMESTAMP", value_parser = parse_timestamp)]
    pub as_of: Option<DateTime<Utc>>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Text,
    /// JSON format for scripting
    Json,
}

fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_datetime(value).ok_or_else(|| {
        format!(
            "invalid timestamp '{}' (expected YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or RFC 3339)",
            value
        )
    })
}

fn parse_schema(value: &str) -> std::result::Result<TripSchema, String> {
    value.parse().map_err(|e: crate::Error| e.to_string())
}
