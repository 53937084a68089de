//! Integration tests for queries and analytics behind the gateway
//!
//! A small dataset with known routes, hours and distances is written to disk,
//! ingested, and then queried through `QueryGateway` with an injected clock.

use chrono::{Duration, TimeZone, Utc};
use std::io::Write;
use std::sync::Arc;
use taxi_trips::app::middleware::clock::ManualClock;
use taxi_trips::app::services::ingestion::IngestionService;
use taxi_trips::app::store::MemoryStore;
use taxi_trips::{Error, QueryGateway, Settings};
use tempfile::NamedTempFile;

const HEADER: &str = "vendor_id,pickup_datetime,dropoff_datetime,passenger_count,\
                      pickup_longitude,pickup_latitude,dropoff_longitude,\
                      dropoff_latitude,trip_duration";

/// (pickup lat, pickup lon, dropoff lat, dropoff lon)
type Route = (f64, f64, f64, f64);

/// Times Square to the Empire State Building, planar 1.1 km
const ROUTE_A: Route = (40.7580, -73.9855, 40.7484, -73.9857);
/// Battery Park to Grand Central, planar 6.3 km
const ROUTE_B: Route = (40.7061, -74.0087, 40.7527, -73.9772);
/// Due north, planar 2.2 km
const ROUTE_C: Route = (40.7000, -74.0000, 40.7200, -74.0000);

fn row(route: Route, pickup: &str, duration: i64) -> String {
    let (plat, plon, dlat, dlon) = route;
    format!(
        "2,{},{},1,{},{},{},{},{}",
        pickup, pickup, plon, plat, dlon, dlat, duration
    )
}

/// 6 trips on A Monday 08:xx, 5 on B Monday 17:xx, 2 on C Tuesday 09:xx
fn dataset() -> NamedTempFile {
    let mut rows = Vec::new();
    for minute in 0..6 {
        rows.push(row(ROUTE_A, &format!("2016-03-14 08:{:02}:00", minute * 5), 600));
    }
    for minute in 0..5 {
        rows.push(row(ROUTE_B, &format!("2016-03-14 17:{:02}:00", minute * 5), 1200));
    }
    for minute in 0..2 {
        rows.push(row(ROUTE_C, &format!("2016-03-15 09:{:02}:00", minute * 5), 1800));
    }

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for line in rows {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

fn ingested_gateway(settings: &Settings) -> (Arc<ManualClock>, QueryGateway) {
    let file = dataset();
    let store = Arc::new(MemoryStore::new());
    let stats = IngestionService::new(store.clone())
        .ingest_csv(file.path(), 4, None)
        .unwrap();
    assert_eq!(stats.processed_records, 13);

    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2016, 3, 16, 0, 0, 0).unwrap(),
    ));
    let gateway = QueryGateway::with_clock(store, settings, clock.clone()).unwrap();
    (clock, gateway)
}

/// Every analytics operation against a dataset with known answers
///
/// Purpose: Validate the grouped aggregations end to end from a CSV file
/// Benefit: Ensures cleaning, storage and aggregation agree on the same records
#[test]
fn test_analytics_on_known_dataset() {
    let (_clock, gateway) = ingested_gateway(&Settings::default());

    let stats = gateway.get_trip_stats("analyst", None, None).unwrap();
    assert_eq!(stats.total_trips, 13);
    assert!((stats.average_duration - 13_200.0 / 13.0).abs() < 1e-9);

    let hourly = gateway.get_hourly_distribution("analyst", None, None).unwrap();
    assert_eq!(hourly.into_iter().collect::<Vec<_>>(), vec![(8, 6), (9, 2), (17, 5)]);

    let routes = gateway.get_popular_routes("analyst", 10, 5).unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0].trip_count, 6);
    assert_eq!(routes[0].pickup.lat, ROUTE_A.0);
    assert_eq!(routes[0].dropoff.lng, ROUTE_A.3);
    assert_eq!(routes[0].avg_duration, Some(600.0));
    assert_eq!(routes[1].trip_count, 5);
    assert_eq!(routes[1].pickup.lat, ROUTE_B.0);

    // Great-circle length differs from the planar bucket but is close here
    let route_a_km = gateway.get_route_distance_km(&routes[0]).unwrap();
    assert!((route_a_km - 1.07).abs() < 0.05, "got {}", route_a_km);

    let peaks = gateway.get_peak_hours("analyst", 7).unwrap();
    let peaks: Vec<(u32, u32, usize)> = peaks
        .iter()
        .map(|peak| (peak.day_of_week, peak.hour, peak.trip_count))
        .collect();
    assert_eq!(peaks, vec![(1, 8, 6), (1, 17, 5), (2, 9, 2)]);

    let distances = gateway.get_distance_distribution("analyst").unwrap();
    let distances: Vec<(f64, usize)> = distances
        .iter()
        .map(|bucket| (bucket.distance_km, bucket.count))
        .collect();
    assert_eq!(distances, vec![(1.1, 6), (2.2, 2), (6.3, 5)]);

    let summary = gateway.get_duration_summary("analyst", None, None).unwrap();
    assert_eq!(summary.stats.count, 13);
    assert_eq!(summary.stats.median, 1200.0);
    assert_eq!(summary.stats.min, 600.0);
    assert_eq!(summary.stats.max, 1800.0);
}

/// Range queries and the trailing peak-hour window
#[test]
fn test_range_queries_and_trailing_window() {
    let (clock, gateway) = ingested_gateway(&Settings::default());
    let tuesday = Utc.with_ymd_and_hms(2016, 3, 15, 0, 0, 0).unwrap();

    let trips = gateway
        .get_trips("analyst", Some(tuesday), None, None)
        .unwrap();
    assert_eq!(trips.len(), 2);
    assert!(trips.windows(2).all(|pair| pair[0].pickup_datetime() <= pair[1].pickup_datetime()));

    let limited = gateway.get_trips("analyst", None, None, Some(3)).unwrap();
    assert_eq!(limited.len(), 3);
    assert_eq!(limited[0].pickup_datetime().to_rfc3339(), "2016-03-14T08:00:00+00:00");

    let err = gateway
        .get_trip_stats("analyst", Some(tuesday), Some(tuesday - Duration::days(1)))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidDateRange { .. }));

    // Thirty days later the 7-day window holds nothing
    clock.advance(Duration::days(30));
    assert!(gateway.get_peak_hours("late", 7).unwrap().is_empty());
    assert_eq!(gateway.get_peak_hours("late", 60).unwrap().len(), 3);
}

/// Middleware behaviour observed through the metrics registry
///
/// Purpose: Validate rate limiting, caching and metrics composed together
/// Benefit: Ensures rejected requests never reach the cache or the store
#[test]
fn test_rate_limit_cache_and_metrics() {
    let settings = Settings::default().with_rate_limit(3);
    let (clock, gateway) = ingested_gateway(&settings);

    let first = gateway.get_popular_routes("10.0.0.7", 10, 1).unwrap();
    let second = gateway.get_popular_routes("10.0.0.7", 10, 1).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);

    gateway.get_distance_distribution("10.0.0.7").unwrap();
    let err = gateway.get_distance_distribution("10.0.0.7").unwrap_err();
    assert!(matches!(err, Error::RateLimited { limit: 3, .. }));

    let snapshot = gateway.metrics().snapshot();
    assert_eq!(snapshot.requests["get_popular_routes"].success, 2);
    assert_eq!(snapshot.requests["get_distance_distribution"].success, 1);
    assert_eq!(snapshot.total_requests(), 3);

    clock.advance(Duration::seconds(60));
    assert!(gateway.get_distance_distribution("10.0.0.7").is_ok());
}
