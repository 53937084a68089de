//! Record cleaning module for raw taxi trip rows
//!
//! This module filters and repairs raw CSV rows before they become domain
//! records. Every row that survives satisfies the trip invariants: no missing
//! cells, no sentinel (0.0) coordinate, and a duration within one day when
//! the schema tracks duration.
//!
//! # Architecture
//!
//! - [`cleaner`] - Rule pipeline over one chunk
//! - [`conversion`] - Cleaned rows to [`TaxiTrip`](crate::app::models::TaxiTrip) records
//! - [`stats`] - Per-rule drop counts
//!
//! # Rule Order
//!
//! 1. Drop rows with any missing cell
//! 2. Strip column-name suffixes after `__`
//! 3. Drop rows with a 0.0 coordinate
//! 4. Detailed schema: drop durations outside (0, 86400]
//! 5. Compact schema: prefix ids with `id` (idempotent)
//!
//! # Example Usage
//!
//! ```rust
//! use taxi_trips::app::services::csv_reader::RawChunk;
//! use taxi_trips::app::services::record_cleaner::{RecordCleaner, to_models};
//!
//! # fn example(chunk: RawChunk) -> taxi_trips::Result<()> {
//! let cleaner = RecordCleaner::new();
//! let cleaned = cleaner.clean(chunk)?;
//! println!("{}", cleaned.stats.summary());
//!
//! let trips = to_models(&cleaned)?;
//! println!("Converted {} trips", trips.len());
//! # Ok(())
//! # }
//! ```

pub mod cleaner;
pub mod conversion;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use cleaner::{
    CleanedChunk, RecordCleaner, has_sentinel_coordinate, normalize_column_name,
    normalize_trip_id,
};
pub use conversion::to_models;
pub use stats::CleaningStats;
