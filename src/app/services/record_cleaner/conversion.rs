//! Conversion of cleaned rows into trip records

use crate::app::models::{CompactTrip, Coordinates, DetailedTrip, TaxiTrip, TripSchema};
use crate::app::services::csv_reader::ColumnMapping;
use crate::app::services::csv_reader::field_parsers::{
    parse_required_datetime, parse_required_f64, parse_required_i32, parse_required_i64,
    parse_required_string,
};
use crate::constants::columns;
use crate::Result;

use super::cleaner::CleanedChunk;

/// Convert every row of a cleaned chunk into a [`TaxiTrip`]
///
/// The first row that fails to parse fails the whole chunk. Detailed trips
/// leave `id` unset for the store to assign.
pub fn to_models(chunk: &CleanedChunk) -> Result<Vec<TaxiTrip>> {
    chunk
        .rows
        .iter()
        .map(|row| match chunk.schema {
            TripSchema::Detailed => detailed_trip(row, &chunk.mapping).map(TaxiTrip::Detailed),
            TripSchema::Compact => compact_trip(row, &chunk.mapping).map(TaxiTrip::Compact),
        })
        .collect()
}

fn detailed_trip(row: &[String], mapping: &ColumnMapping) -> Result<DetailedTrip> {
    Ok(DetailedTrip {
        id: None,
        vendor_id: parse_required_string(row, mapping, columns::VENDOR_ID)?,
        pickup_datetime: parse_required_datetime(row, mapping, columns::PICKUP_DATETIME)?,
        dropoff_datetime: parse_required_datetime(row, mapping, columns::DROPOFF_DATETIME)?,
        passenger_count: parse_required_i32(row, mapping, columns::PASSENGER_COUNT)?,
        coordinates: coordinates(row, mapping)?,
        trip_duration: parse_required_i64(row, mapping, columns::TRIP_DURATION)?,
    })
}

fn compact_trip(row: &[String], mapping: &ColumnMapping) -> Result<CompactTrip> {
    Ok(CompactTrip {
        id: parse_required_string(row, mapping, columns::ID)?,
        vendor_id: parse_required_i64(row, mapping, columns::VENDOR_ID)?,
        pickup_datetime: parse_required_datetime(row, mapping, columns::PICKUP_DATETIME)?,
        passenger_count: parse_required_i32(row, mapping, columns::PASSENGER_COUNT)?,
        coordinates: coordinates(row, mapping)?,
    })
}

fn coordinates(row: &[String], mapping: &ColumnMapping) -> Result<Coordinates> {
    Ok(Coordinates {
        pickup_longitude: parse_required_f64(row, mapping, columns::PICKUP_LONGITUDE)?,
        pickup_latitude: parse_required_f64(row, mapping, columns::PICKUP_LATITUDE)?,
        dropoff_longitude: parse_required_f64(row, mapping, columns::DROPOFF_LONGITUDE)?,
        dropoff_latitude: parse_required_f64(row, mapping, columns::DROPOFF_LATITUDE)?,
    })
}
