//! Ingest command implementation

use crate::app::services::ingestion::IngestionStats;
use crate::app::store::MemoryStore;
use crate::cli::args::{IngestArgs, OutputFormat};
use crate::config::Settings;
use std::sync::Arc;

use super::shared::{ingest_source, print_ingestion_summary};

/// Ingest a file and print its statistics
pub fn run_ingest(args: &IngestArgs, settings: &Settings) -> anyhow::Result<IngestionStats> {
    let store = Arc::new(MemoryStore::new());
    let stats = ingest_source(&args.source, &args.output, settings, store, None)?;

    match args.output.format {
        OutputFormat::Text => {
            if !args.output.quiet {
                print_ingestion_summary(&stats);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }

    Ok(stats)
}
