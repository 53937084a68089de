//! Ingestion run statistics

use crate::app::services::record_cleaner::CleaningStats;
use crate::constants::MAX_RETAINED_CHUNK_ERRORS;
use serde::{Deserialize, Serialize};

/// Counters for one ingestion run
///
/// `total_records == processed_records + failed_records` holds after every
/// chunk. Records dropped by cleaning count as failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestionStats {
    /// Records read from the source, malformed ones included
    pub total_records: usize,
    /// Records written to the store
    pub processed_records: usize,
    /// Records dropped by cleaning or lost with a failed chunk
    pub failed_records: usize,
    pub chunks_processed: usize,
    pub chunks_failed: usize,
    /// First chunk error messages, oldest first
    pub errors: Vec<String>,
    /// Cleaning counts summed over committed chunks
    pub cleaning: CleaningStats,
}

impl IngestionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a committed chunk
    pub fn record_success(&mut self, chunk_len: usize, written: usize, cleaning: &CleaningStats) {
        let written = written.min(chunk_len);
        self.total_records += chunk_len;
        self.processed_records += written;
        self.failed_records += chunk_len - written;
        self.chunks_processed += 1;
        self.cleaning.merge(cleaning);
    }

    /// Count a rolled-back chunk
    pub fn record_failure(&mut self, chunk_index: usize, chunk_len: usize, message: impl Into<String>) {
        self.total_records += chunk_len;
        self.failed_records += chunk_len;
        self.chunks_failed += 1;
        if self.errors.len() < MAX_RETAINED_CHUNK_ERRORS {
            self.errors
                .push(format!("chunk {}: {}", chunk_index, message.into()));
        }
    }

    /// Percentage of read records that reached the store
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            100.0
        } else {
            (self.processed_records as f64 / self.total_records as f64) * 100.0
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.total_records == self.processed_records + self.failed_records
    }

    /// Get summary of ingestion statistics
    pub fn summary(&self) -> String {
        format!(
            "Ingestion Summary: {} records | Processed: {} ({:.1}%) | Failed: {} | \
             Chunks: {} committed, {} failed",
            self.total_records,
            self.processed_records,
            self.success_rate(),
            self.failed_records,
            self.chunks_processed,
            self.chunks_failed
        )
    }
}
