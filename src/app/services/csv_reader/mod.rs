//! Chunked CSV reader for taxi trip source files
//!
//! This module turns a CSV source into a lazy, finite, non-restartable sequence
//! of row batches. Only one batch is held in memory at a time, so peak memory
//! is bounded by the chunk size regardless of source size.
//!
//! ## Architecture
//!
//! - [`reader`] - Chunk iteration over any `Read` source
//! - [`column_mapping`] - Column name to index lookups
//! - [`field_parsers`] - Typed field extraction from raw rows
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taxi_trips::app::services::csv_reader::ChunkedCsvReader;
//!
//! # fn example() -> taxi_trips::Result<()> {
//! let reader = ChunkedCsvReader::open(std::path::Path::new("trips.csv"), 1000)?;
//! for chunk in reader {
//!     println!("chunk {} has {} rows", chunk.index, chunk.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod column_mapping;
pub mod field_parsers;
pub mod reader;

#[cfg(test)]
pub mod tests;

pub use column_mapping::ColumnMapping;
pub use reader::{ChunkedCsvReader, MalformedRecord, RawChunk, RawRow};
