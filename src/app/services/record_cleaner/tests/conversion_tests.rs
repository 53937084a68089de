//! Tests for row to record conversion

use super::*;
use crate::app::models::TaxiTrip;
use crate::app::services::record_cleaner::{RecordCleaner, to_models};
use chrono::{TimeZone, Utc};

#[test]
fn test_detailed_rows_convert_without_id() {
    let cleaned = RecordCleaner::new()
        .clean(chunk(
            DETAILED_COLUMNS,
            vec![detailed_row(Some("2.0"), "-73.9876", "3600")],
        ))
        .unwrap();

    let trips = to_models(&cleaned).unwrap();
    assert_eq!(trips.len(), 1);

    match &trips[0] {
        TaxiTrip::Detailed(trip) => {
            assert_eq!(trip.id, None);
            assert_eq!(trip.vendor_id, "V1");
            assert_eq!(trip.passenger_count, 2);
            assert_eq!(trip.trip_duration, 3600);
            assert_eq!(
                trip.pickup_datetime,
                Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap()
            );
            assert_eq!(trip.coordinates.pickup_longitude, -73.9876);
        }
        other => panic!("expected detailed trip, got {:?}", other),
    }
}

#[test]
fn test_compact_rows_keep_prefixed_id() {
    let cleaned = RecordCleaner::new()
        .clean(chunk(COMPACT_COLUMNS, vec![compact_row("2875421")]))
        .unwrap();

    let trips = to_models(&cleaned).unwrap();
    match &trips[0] {
        TaxiTrip::Compact(trip) => {
            assert_eq!(trip.id, "id2875421");
            assert_eq!(trip.vendor_id, 2);
            assert_eq!(trips[0].trip_duration(), None);
        }
        other => panic!("expected compact trip, got {:?}", other),
    }
}

#[test]
fn test_unparseable_timestamp_fails_conversion() {
    let mut row = detailed_row(Some("1"), "-73.9876", "600");
    row[1] = Some("yesterday".to_string());

    let cleaned = RecordCleaner::new()
        .clean(chunk(DETAILED_COLUMNS, vec![row]))
        .unwrap();

    let err = to_models(&cleaned).unwrap_err();
    assert!(err.to_string().contains("pickup_datetime"));
}
