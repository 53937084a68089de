//! Tests for the record store and grouped aggregation
//!
//! The trip builders here are shared with the service tests.


use crate::app::models::{CompactTrip, Coordinates, DetailedTrip, TaxiTrip};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Monday 2023-01-02 08:00:00 UTC
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 2, 8, 0, 0).unwrap()
}

pub fn coords(pickup: (f64, f64), dropoff: (f64, f64)) -> Coordinates {
    Coordinates {
        pickup_latitude: pickup.0,
        pickup_longitude: pickup.1,
        dropoff_latitude: dropoff.0,
        dropoff_longitude: dropoff.1,
    }
}

pub fn default_coords() -> Coordinates {
    coords((40.7545, -73.9876), (40.7406, -74.0065))
}

pub fn detailed_at(pickup: DateTime<Utc>, duration: i64) -> TaxiTrip {
    detailed_with(pickup, default_coords(), duration)
}

pub fn detailed_with(pickup: DateTime<Utc>, coordinates: Coordinates, duration: i64) -> TaxiTrip {
    TaxiTrip::Detailed(DetailedTrip {
        id: None,
        vendor_id: "V1".to_string(),
        pickup_datetime: pickup,
        dropoff_datetime: pickup + Duration::seconds(duration),
        passenger_count: 1,
        coordinates,
        trip_duration: duration,
    })
}

pub fn compact_at(id: &str, pickup: DateTime<Utc>) -> TaxiTrip {
    TaxiTrip::Compact(CompactTrip {
        id: id.to_string(),
        vendor_id: 2,
        pickup_datetime: pickup,
        passenger_count: 1,
        coordinates: default_coords(),
    })
}
