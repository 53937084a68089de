//! Command implementations for the taxi trip CLI
//!
//! Each command lives in its own module. Commands are synchronous; the
//! binary runs them on a blocking task so Ctrl+C can abandon a long
//! ingestion.

pub mod ingest;
pub mod report;
pub mod shared;

use crate::cli::args::Commands;
use crate::config::Settings;

/// Dispatch to the subcommand handler
///
/// Logging is initialised here from the command's output flags and the
/// configured level.
pub fn run(command: &Commands, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Commands::Ingest(args) => {
            shared::setup_logging(&args.output, settings);
            ingest::run_ingest(args, settings)?;
        }
        Commands::Report(args) => {
            shared::setup_logging(&args.output, settings);
            report::run_report(args, settings)?;
        }
    }
    Ok(())
}
