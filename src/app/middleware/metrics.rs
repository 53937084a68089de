//! Request-level metrics
//!
//! Prometheus counters and histograms held in a private [`Registry`]:
//! requests per operation by outcome, request latency per operation, and
//! ingested records by status. [`RequestMetrics::snapshot`] reads them back
//! through `gather()`; [`RequestMetrics::render`] produces the text exposition
//! format.

use crate::constants::LATENCY_BUCKETS_SECS;
use crate::{Error, Result};
use prometheus::proto::MetricFamily;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::trace;

const REQUESTS_TOTAL: &str = "requests_total";
const REQUEST_DURATION: &str = "request_duration_seconds";
const INGESTION_RECORDS_TOTAL: &str = "ingestion_records_total";

const STATUS_SUCCESS: &str = "success";
const STATUS_ERROR: &str = "error";

/// Point-in-time view of one operation's metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub success: u64,
    pub error: u64,
    pub latency_count: u64,
    pub latency_sum_secs: f64,
    /// Cumulative counts per latency upper bound, +Inf omitted
    pub latency_buckets: Vec<(f64, u64)>,
}

impl OperationSnapshot {
    fn empty() -> Self {
        Self {
            success: 0,
            error: 0,
            latency_count: 0,
            latency_sum_secs: 0.0,
            latency_buckets: Vec::new(),
        }
    }
}

/// Point-in-time view of all metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests: BTreeMap<String, OperationSnapshot>,
    /// Ingested records keyed by "processed" or "failed"
    pub ingestion_records: BTreeMap<String, u64>,
}

impl MetricsSnapshot {
    pub fn total_requests(&self) -> u64 {
        self.requests.values().map(|op| op.success + op.error).sum()
    }
}

/// Thread-safe metrics registry
#[derive(Clone)]
pub struct RequestMetrics {
    registry: Registry,
    requests: IntCounterVec,
    latency: HistogramVec,
    ingestion_records: IntCounterVec,
}

impl fmt::Debug for RequestMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestMetrics").finish_non_exhaustive()
    }
}

impl RequestMetrics {
    /// Create and register the request and ingestion metrics
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(REQUESTS_TOTAL, "Total requests by operation and outcome"),
            &["operation", "status"],
        )?;
        let latency = HistogramVec::new(
            HistogramOpts::new(REQUEST_DURATION, "Request latency by operation")
                .buckets(LATENCY_BUCKETS_SECS.to_vec()),
            &["operation"],
        )?;
        let ingestion_records = IntCounterVec::new(
            Opts::new(
                INGESTION_RECORDS_TOTAL,
                "Total records handled during ingestion by status",
            ),
            &["status"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(latency.clone()))?;
        registry.register(Box::new(ingestion_records.clone()))?;

        Ok(Self {
            registry,
            requests,
            latency,
            ingestion_records,
        })
    }

    /// Run `f`, recording its outcome and latency under `operation`
    pub fn track<T, F>(&self, operation: &str, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let start = Instant::now();
        let result = f();
        self.record_request(operation, result.is_ok(), start.elapsed());
        result
    }

    pub fn record_request(&self, operation: &str, success: bool, elapsed: Duration) {
        let status = if success { STATUS_SUCCESS } else { STATUS_ERROR };
        self.requests.with_label_values(&[operation, status]).inc();
        self.latency
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
        trace!("{} completed in {:?} (success: {})", operation, elapsed, success);
    }

    /// Add ingestion record counts
    pub fn record_ingestion(&self, processed: usize, failed: usize) {
        self.ingestion_records
            .with_label_values(&["processed"])
            .inc_by(processed as u64);
        self.ingestion_records
            .with_label_values(&["failed"])
            .inc_by(failed as u64);
    }

    /// Read every metric back from the registry
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot::default();

        for family in self.registry.gather() {
            match family.get_name() {
                REQUESTS_TOTAL => collect_requests(&family, &mut snapshot),
                REQUEST_DURATION => collect_latency(&family, &mut snapshot),
                INGESTION_RECORDS_TOTAL => {
                    for metric in family.get_metric() {
                        if let Some(status) = label(metric, "status") {
                            snapshot
                                .ingestion_records
                                .insert(status.to_string(), metric.get_counter().get_value() as u64);
                        }
                    }
                }
                _ => {}
            }
        }

        snapshot
    }

    /// Prometheus text exposition of every metric
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| Error::configuration(format!("Metrics output is not UTF-8: {}", e)))
    }
}

fn label<'a>(metric: &'a prometheus::proto::Metric, name: &str) -> Option<&'a str> {
    metric
        .get_label()
        .iter()
        .find(|pair| pair.get_name() == name)
        .map(|pair| pair.get_value())
}

fn collect_requests(family: &MetricFamily, snapshot: &mut MetricsSnapshot) {
    for metric in family.get_metric() {
        let (Some(operation), Some(status)) = (label(metric, "operation"), label(metric, "status"))
        else {
            continue;
        };
        let count = metric.get_counter().get_value() as u64;
        let entry = snapshot
            .requests
            .entry(operation.to_string())
            .or_insert_with(OperationSnapshot::empty);
        match status {
            STATUS_SUCCESS => entry.success += count,
            _ => entry.error += count,
        }
    }
}

fn collect_latency(family: &MetricFamily, snapshot: &mut MetricsSnapshot) {
    for metric in family.get_metric() {
        let Some(operation) = label(metric, "operation") else {
            continue;
        };
        let histogram = metric.get_histogram();
        let entry = snapshot
            .requests
            .entry(operation.to_string())
            .or_insert_with(OperationSnapshot::empty);
        entry.latency_count = histogram.get_sample_count();
        entry.latency_sum_secs = histogram.get_sample_sum();
        entry.latency_buckets = histogram
            .get_bucket()
            .iter()
            .filter(|bucket| bucket.get_upper_bound().is_finite())
            .map(|bucket| (bucket.get_upper_bound(), bucket.get_cumulative_count()))
            .collect();
    }
}
