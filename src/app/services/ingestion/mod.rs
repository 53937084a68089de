//! Batch ingestion of taxi trip CSV sources
//!
//! A source is read in fixed-size chunks. Each chunk is cleaned, converted
//! and written inside its own store transaction, so a bad chunk is rolled
//! back and counted as failed while the rest of the run continues.
//!
//! # Architecture
//!
//! - [`pipeline`] - Chunk loop and per-chunk transaction handling
//! - [`stats`] - Run counters and retained chunk errors
//! - [`upload`] - Upload boundary taking a file name and raw bytes
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use taxi_trips::app::services::ingestion::IngestionService;
//! use taxi_trips::app::store::MemoryStore;
//!
//! # fn example() -> taxi_trips::Result<()> {
//! let service = IngestionService::new(Arc::new(MemoryStore::new()));
//! let stats = service.ingest_csv(Path::new("train.csv"), 1000, None)?;
//! println!("{}", stats.summary());
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod stats;
pub mod upload;

#[cfg(test)]
pub mod tests;

pub use pipeline::IngestionService;
pub use stats::IngestionStats;
pub use upload::{UploadResponse, upload_trip_data, upload_trip_data_in};
