//! Chunked ingestion pipeline

use crate::app::middleware::metrics::RequestMetrics;
use crate::app::models::TripSchema;
use crate::app::services::csv_reader::{ChunkedCsvReader, RawChunk};
use crate::app::services::record_cleaner::{CleaningStats, RecordCleaner, to_models};
use crate::app::store::{StoreTransaction, TripStore};
use crate::{Error, Result};
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::stats::IngestionStats;

/// Reads trip sources into a store one transaction per chunk
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use std::sync::Arc;
/// use taxi_trips::app::services::csv_reader::ChunkedCsvReader;
/// use taxi_trips::app::services::ingestion::IngestionService;
/// use taxi_trips::app::store::MemoryStore;
///
/// # fn example() -> taxi_trips::Result<()> {
/// let csv = "id,vendor_id,pickup_datetime,passenger_count,pickup_longitude,\
///            pickup_latitude,dropoff_longitude,dropoff_latitude\n\
///            2875421,2,2016-03-14 17:24:55,1,-73.98,40.76,-73.96,40.76\n";
/// let reader = ChunkedCsvReader::from_reader(Cursor::new(csv.as_bytes().to_vec()), 100)?;
///
/// let service = IngestionService::new(Arc::new(MemoryStore::new()));
/// let stats = service.ingest_chunks(reader, None);
/// assert_eq!(stats.processed_records, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct IngestionService {
    store: Arc<dyn TripStore>,
    cleaner: RecordCleaner,
    metrics: Option<Arc<RequestMetrics>>,
}

impl IngestionService {
    /// Create a service that detects the schema from each chunk's header
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self {
            store,
            cleaner: RecordCleaner::new(),
            metrics: None,
        }
    }

    /// Force every chunk to be cleaned as `schema`
    pub fn with_schema(mut self, schema: TripSchema) -> Self {
        self.cleaner = RecordCleaner::for_schema(schema);
        self
    }

    /// Record ingestion counters into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<RequestMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Ingest a CSV file in chunks of `batch_size` rows
    ///
    /// A missing file or a zero batch size fails before any chunk is read.
    /// Past that point the run always completes with statistics, even when
    /// every chunk fails.
    pub fn ingest_csv(
        &self,
        path: &Path,
        batch_size: usize,
        progress: Option<&ProgressBar>,
    ) -> Result<IngestionStats> {
        let reader = ChunkedCsvReader::open(path, batch_size)?;
        info!(
            "Ingesting {} in chunks of {} rows",
            path.display(),
            batch_size
        );

        Ok(self.ingest_chunks(reader, progress))
    }

    /// Ingest an already-open sequence of chunks
    pub fn ingest_chunks<I>(&self, chunks: I, progress: Option<&ProgressBar>) -> IngestionStats
    where
        I: IntoIterator<Item = RawChunk>,
    {
        let mut stats = IngestionStats::new();

        for chunk in chunks {
            let index = chunk.index;
            let chunk_len = chunk.len();

            match self.process_chunk(chunk) {
                Ok((written, cleaning)) => {
                    debug!(
                        "Chunk {} committed: {}/{} records",
                        index, written, chunk_len
                    );
                    stats.record_success(chunk_len, written, &cleaning);
                }
                Err(e) => {
                    warn!("Chunk {} failed ({} records): {}", index, chunk_len, e);
                    stats.record_failure(index, chunk_len, e.to_string());
                }
            }

            if let Some(pb) = progress {
                pb.inc(chunk_len as u64);
                pb.set_message(format!(
                    "{} processed, {} failed",
                    stats.processed_records, stats.failed_records
                ));
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_ingestion(stats.processed_records, stats.failed_records);
        }

        info!("{}", stats.summary());
        stats
    }

    /// Run one chunk inside its own transaction
    ///
    /// Returns the number of records committed and the cleaning counts.
    fn process_chunk(&self, chunk: RawChunk) -> Result<(usize, CleaningStats)> {
        let mut txn = self.store.begin()?;

        let result = self
            .write_chunk(txn.as_mut(), chunk)
            .and_then(|cleaning| Ok((txn.commit()?, cleaning)));

        if result.is_err() {
            if let Err(rollback_error) = txn.rollback() {
                warn!("Rollback failed: {}", rollback_error);
            }
        }
        result
    }

    fn write_chunk(&self, txn: &mut dyn StoreTransaction, chunk: RawChunk) -> Result<CleaningStats> {
        if let Some(first) = chunk.malformed.first() {
            return Err(Error::csv_parsing(
                format!(
                    "{} malformed records, first at record {}: {}",
                    chunk.malformed.len(),
                    first.record,
                    first.message
                ),
                None,
            ));
        }

        let cleaned = self.cleaner.clean(chunk)?;
        let trips = to_models(&cleaned)?;
        txn.bulk_insert(trips)?;
        Ok(cleaned.stats)
    }
}
