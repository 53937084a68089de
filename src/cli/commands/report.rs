//! Report command implementation
//!
//! Ingests the file into an in-memory store, then runs every query and
//! analytics operation through the gateway so the report exercises the same
//! rate limiting, caching and metrics path as any other caller.

use crate::app::gateway::QueryGateway;
use crate::app::middleware::clock::{Clock, ManualClock, SystemClock};
use crate::app::middleware::metrics::{MetricsSnapshot, RequestMetrics};
use crate::app::models::{DistanceBucket, PeakHour, PopularRoute, TripStats};
use crate::app::services::analytics::DurationSummary;
use crate::app::services::ingestion::IngestionStats;
use crate::app::store::MemoryStore;
use crate::cli::args::{OutputFormat, ReportArgs};
use crate::config::Settings;
use anyhow::Context;
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::shared::{format_seconds, ingest_source, print_ingestion_summary};

/// Client name the CLI presents to the rate limiter
const CLI_CLIENT: &str = "cli";

/// Gateway calls one report makes under [`CLI_CLIENT`]
const REPORT_CALLS: u32 = 7;

/// A popular route with its great-circle length
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    #[serde(flatten)]
    pub route: PopularRoute,
    pub distance_km: f64,
}

/// Everything the report command prints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripReport {
    pub ingestion: IngestionStats,
    pub trip_stats: TripStats,
    /// Trips returned by the range query, up to `--limit`
    pub trips_listed: usize,
    pub hourly_distribution: BTreeMap<u32, usize>,
    pub popular_routes: Vec<RouteReport>,
    pub peak_hours: Vec<PeakHour>,
    pub distance_distribution: Vec<DistanceBucket>,
    pub duration_summary: DurationSummary,
    /// Present when metrics are enabled
    pub metrics: Option<MetricsSnapshot>,
}

/// Build the report and print it in the requested format
pub fn run_report(args: &ReportArgs, settings: &Settings) -> anyhow::Result<TripReport> {
    let report = build_report(args, settings)?;

    match args.output.format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(report)
}

/// Ingest the file and collect every query and analytics result
pub fn build_report(args: &ReportArgs, settings: &Settings) -> anyhow::Result<TripReport> {
    let store = Arc::new(MemoryStore::new());
    let metrics = Arc::new(RequestMetrics::new()?);
    let recorded = settings.enable_metrics.then(|| metrics.clone());

    let ingestion = ingest_source(
        &args.source,
        &args.output,
        settings,
        store.clone(),
        recorded,
    )?;

    let clock: Arc<dyn Clock> = match args.as_of {
        Some(as_of) => Arc::new(ManualClock::new(as_of)),
        None => Arc::new(SystemClock),
    };
    // One report must never exhaust its own request budget
    let gateway_settings = settings
        .clone()
        .with_rate_limit(settings.rate_limit_per_minute.max(REPORT_CALLS));
    let gateway = QueryGateway::with_clock(store, &gateway_settings, clock)?
        .with_metrics(metrics.clone());
    let (start, end) = (args.start, args.end);

    let trip_stats = gateway
        .get_trip_stats(CLI_CLIENT, start, end)
        .context("trip statistics")?;
    let trips_listed = gateway
        .get_trips(CLI_CLIENT, start, end, Some(args.limit))
        .context("trip listing")?
        .len();
    let hourly_distribution = gateway
        .get_hourly_distribution(CLI_CLIENT, start, end)
        .context("hourly distribution")?;
    let popular_routes = gateway
        .get_popular_routes(CLI_CLIENT, args.routes, args.min_trips)
        .context("popular routes")?
        .into_iter()
        .map(|route| {
            Ok(RouteReport {
                distance_km: gateway.get_route_distance_km(&route)?,
                route,
            })
        })
        .collect::<crate::Result<Vec<_>>>()
        .context("route distances")?;
    let peak_hours = gateway
        .get_peak_hours(CLI_CLIENT, args.days)
        .context("peak hours")?;
    let distance_distribution = gateway
        .get_distance_distribution(CLI_CLIENT)
        .context("distance distribution")?;
    let duration_summary = gateway
        .get_duration_summary(CLI_CLIENT, start, end)
        .context("duration summary")?;

    info!(
        "Report built: {} trips in range, {} requests served",
        trip_stats.total_trips,
        metrics.snapshot().total_requests()
    );
    if settings.enable_metrics {
        debug!("Request metrics:\n{}", metrics.render()?);
    }

    Ok(TripReport {
        ingestion,
        trip_stats,
        trips_listed,
        hourly_distribution,
        popular_routes,
        peak_hours,
        distance_distribution,
        duration_summary,
        metrics: settings.enable_metrics.then(|| metrics.snapshot()),
    })
}

fn print_report(report: &TripReport) {
    print_ingestion_summary(&report.ingestion);

    println!();
    println!("{}", "🚕 Trip Statistics".bright_white().bold());
    println!("{}", "==================".bright_white());
    println!(
        "{} {}",
        "Trips in range:".bright_white(),
        report.trip_stats.total_trips.to_string().bright_cyan()
    );
    println!(
        "{} {}",
        "Average duration:".bright_white(),
        format_seconds(report.trip_stats.average_duration).bright_cyan()
    );
    println!("{} {}", "Trips listed:".bright_white(), report.trips_listed);

    let durations = &report.duration_summary;
    if durations.stats.count > 0 {
        println!(
            "  Duration min/median/max: {} / {} / {}",
            format_seconds(durations.stats.min),
            format_seconds(durations.stats.median),
            format_seconds(durations.stats.max)
        );
        for (name, value) in &durations.percentiles {
            println!("  {:>4}: {}", name, format_seconds(*value));
        }
    }

    println!();
    println!("{}", "🕐 Hourly Distribution".bright_white().bold());
    let busiest = report.hourly_distribution.values().copied().max().unwrap_or(0);
    for (hour, count) in &report.hourly_distribution {
        println!("  {:02}:00 {:>8} {}", hour, count, bar(*count, busiest));
    }

    println!();
    println!("{}", "🛣️  Popular Routes".bright_white().bold());
    if report.popular_routes.is_empty() {
        println!("  {}", "No route meets the minimum trip count".dimmed());
    }
    for (rank, entry) in report.popular_routes.iter().enumerate() {
        let route = &entry.route;
        let duration = route
            .avg_duration
            .map(format_seconds)
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  {:>2}. ({:.4}, {:.4}) -> ({:.4}, {:.4}) | {} trips | {:.2} km | avg {}",
            rank + 1,
            route.pickup.lat,
            route.pickup.lng,
            route.dropoff.lat,
            route.dropoff.lng,
            route.trip_count,
            entry.distance_km,
            duration
        );
    }

    println!();
    println!("{}", "📈 Peak Hours".bright_white().bold());
    if report.peak_hours.is_empty() {
        println!("  {}", "No trips in the trailing window".dimmed());
    }
    for peak in &report.peak_hours {
        println!(
            "  {} {:02}:00 {:>8}",
            weekday_name(peak.day_of_week),
            peak.hour,
            peak.trip_count
        );
    }

    println!();
    println!("{}", "📏 Distance Distribution".bright_white().bold());
    let busiest = report
        .distance_distribution
        .iter()
        .map(|bucket| bucket.count)
        .max()
        .unwrap_or(0);
    for bucket in &report.distance_distribution {
        println!(
            "  {:>6.1} km {:>8} {}",
            bucket.distance_km,
            bucket.count,
            bar(bucket.count, busiest)
        );
    }

    if let Some(metrics) = &report.metrics {
        println!();
        println!(
            "{} {}",
            "Requests served:".bright_white(),
            metrics.total_requests()
        );
    }
}

fn weekday_name(day_of_week: u32) -> &'static str {
    match day_of_week {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        _ => "???",
    }
}

fn bar(count: usize, max: usize) -> String {
    const WIDTH: usize = 30;
    if max == 0 {
        return String::new();
    }
    "█".repeat((count * WIDTH).div_ceil(max))
}
