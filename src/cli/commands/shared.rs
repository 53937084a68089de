//! Shared components for CLI commands
//!
//! Logging setup, progress display and the ingestion step both commands
//! start with.

use crate::app::middleware::metrics::RequestMetrics;
use crate::app::services::ingestion::{IngestionService, IngestionStats};
use crate::app::store::TripStore;
use crate::cli::args::{OutputArgs, SourceArgs};
use crate::config::Settings;
use anyhow::Context;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Set up structured logging on stderr
///
/// `RUST_LOG` wins when set. Otherwise the verbosity flags pick the level,
/// falling back to the configured `LOG_LEVEL`.
pub fn setup_logging(output: &OutputArgs, settings: &Settings) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = output.log_level().unwrap_or(settings.log_level.as_str());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("taxi_trips={}", log_level)));

    // try_init so a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();

    debug!("Logging initialized at level {}", log_level);
}

/// Create a record counter shown while ingesting
pub fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {pos} records {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Ingest the source file into `store`
///
/// Shared by `ingest` and `report`. Only precondition failures (missing
/// file, bad batch size) are errors; chunk failures end up in the stats.
pub fn ingest_source(
    source: &SourceArgs,
    output: &OutputArgs,
    settings: &Settings,
    store: Arc<dyn TripStore>,
    metrics: Option<Arc<RequestMetrics>>,
) -> anyhow::Result<IngestionStats> {
    let batch_size = source.batch_size.unwrap_or(settings.default_batch_size);

    let mut service = IngestionService::new(store);
    if let Some(schema) = source.schema {
        service = service.with_schema(schema);
    }
    if let Some(metrics) = metrics {
        service = service.with_metrics(metrics);
    }

    let progress = output
        .show_progress()
        .then(|| create_progress_bar("ingesting"));

    let stats = service
        .ingest_csv(&source.file, batch_size, progress.as_ref())
        .with_context(|| format!("failed to ingest {}", source.file.display()))?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    info!("{}", stats.summary());
    Ok(stats)
}

/// Print the ingestion statistics as text
pub fn print_ingestion_summary(stats: &IngestionStats) {
    println!("{}", "📥 Ingestion Summary".bright_white().bold());
    println!("{}", "====================".bright_white());
    println!(
        "{} {}",
        "Records read:".bright_white(),
        stats.total_records.to_string().bright_cyan()
    );
    println!(
        "{} {} ({:.1}%)",
        "Records stored:".bright_white(),
        stats.processed_records.to_string().bright_green(),
        stats.success_rate()
    );

    let failed = stats.failed_records.to_string();
    let failed = if stats.failed_records > 0 {
        failed.bright_yellow()
    } else {
        failed.bright_green()
    };
    println!("{} {}", "Records failed:".bright_white(), failed);
    println!(
        "{} {} committed, {} failed",
        "Chunks:".bright_white(),
        stats.chunks_processed,
        stats.chunks_failed
    );

    let cleaning = &stats.cleaning;
    if cleaning.dropped() > 0 || cleaning.ids_normalized > 0 {
        println!();
        println!("{}", "🧹 Cleaning".bright_white().bold());
        println!("  Missing values:    {}", cleaning.missing_values);
        println!("  Zero coordinates:  {}", cleaning.zero_coordinates);
        println!("  Duration outliers: {}", cleaning.duration_outliers);
        println!("  Ids normalized:    {}", cleaning.ids_normalized);
    }

    if !stats.errors.is_empty() {
        println!();
        println!("{}", "⚠️  Chunk errors".bright_yellow().bold());
        for error in &stats.errors {
            println!("  {}", error.yellow());
        }
        let hidden = stats.chunks_failed.saturating_sub(stats.errors.len());
        if hidden > 0 {
            println!("  ... and {} more", hidden);
        }
    }
}

/// Format a duration in seconds as `1h 02m 03s`
pub fn format_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
