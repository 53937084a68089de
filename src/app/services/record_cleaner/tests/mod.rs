//! Tests for the record cleaner

pub mod conversion_tests;

use crate::app::services::csv_reader::{RawChunk, RawRow};

pub const DETAILED_COLUMNS: &[&str] = &[
    "vendor_id",
    "pickup_datetime",
    "dropoff_datetime",
    "passenger_count",
    "pickup_longitude",
    "pickup_latitude",
    "dropoff_longitude",
    "dropoff_latitude",
    "trip_duration",
];

pub const COMPACT_COLUMNS: &[&str] = &[
    "id",
    "vendor_id",
    "pickup_datetime",
    "passenger_count",
    "pickup_longitude",
    "pickup_latitude",
    "dropoff_longitude",
    "dropoff_latitude",
];

/// Build a raw row; `None` entries are missing cells
pub fn raw_row(cells: &[Option<&str>]) -> RawRow {
    cells.iter().map(|cell| cell.map(str::to_string)).collect()
}

/// A complete detailed row with the given passenger count, pickup longitude
/// and duration
pub fn detailed_row(passengers: Option<&str>, pickup_lon: &str, duration: &str) -> RawRow {
    raw_row(&[
        Some("V1"),
        Some("2023-01-01 10:00:00"),
        Some("2023-01-01 11:00:00"),
        passengers,
        Some(pickup_lon),
        Some("40.7545"),
        Some("-74.0065"),
        Some("40.7406"),
        Some(duration),
    ])
}

pub fn compact_row(id: &str) -> RawRow {
    raw_row(&[
        Some(id),
        Some("2"),
        Some("2016-03-14 17:24:55"),
        Some("1"),
        Some("-73.982155"),
        Some("40.767937"),
        Some("-73.964630"),
        Some("40.765602"),
    ])
}

pub fn chunk(columns: &[&str], rows: Vec<RawRow>) -> RawChunk {
    RawChunk {
        index: 0,
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
        malformed: Vec::new(),
    }
}
