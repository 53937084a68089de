//! Data models for taxi trip processing
//!
//! This module contains the trip record shapes produced by ingestion, the
//! range filter shared by every store query, and the result structures
//! returned by the query and analytics services.

use crate::constants::columns;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Schema Variants
// =============================================================================

/// Dataset shape a source file follows
///
/// The two shapes are genuinely incompatible: the detailed shape carries a
/// dropoff timestamp and duration with a store-assigned integer id, the
/// compact shape carries an externally supplied string id and neither of
/// the timing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripSchema {
    /// Integer id, dropoff timestamp and trip duration
    Detailed,
    /// String id prefixed "id", no dropoff timestamp or duration
    Compact,
}

impl TripSchema {
    /// Detect the schema from normalized column names
    pub fn detect<S: AsRef<str>>(columns: &[S]) -> Self {
        if columns
            .iter()
            .any(|name| name.as_ref() == columns::TRIP_DURATION)
        {
            TripSchema::Detailed
        } else {
            TripSchema::Compact
        }
    }

    /// Columns that must be present for rows of this schema
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            TripSchema::Detailed => columns::DETAILED_REQUIRED,
            TripSchema::Compact => columns::COMPACT_REQUIRED,
        }
    }

    /// Whether records of this schema track a trip duration
    pub fn tracks_duration(&self) -> bool {
        matches!(self, TripSchema::Detailed)
    }
}

impl fmt::Display for TripSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripSchema::Detailed => write!(f, "detailed"),
            TripSchema::Compact => write!(f, "compact"),
        }
    }
}

impl FromStr for TripSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "detailed" => Ok(TripSchema::Detailed),
            "compact" => Ok(TripSchema::Compact),
            other => Err(Error::configuration(format!(
                "unknown trip schema '{}' (expected 'detailed' or 'compact')",
                other
            ))),
        }
    }
}

// =============================================================================
// Trip Records
// =============================================================================

/// Pickup and dropoff positions of a trip in WGS84 decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
}

impl Coordinates {
    /// Pickup position as (latitude, longitude)
    pub fn pickup(&self) -> (f64, f64) {
        (self.pickup_latitude, self.pickup_longitude)
    }

    /// Dropoff position as (latitude, longitude)
    pub fn dropoff(&self) -> (f64, f64) {
        (self.dropoff_latitude, self.dropoff_longitude)
    }
}

/// Trip from the duration-bearing dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedTrip {
    /// Assigned by the store on insert
    pub id: Option<i64>,
    pub vendor_id: String,
    pub pickup_datetime: DateTime<Utc>,
    pub dropoff_datetime: DateTime<Utc>,
    pub passenger_count: i32,
    pub coordinates: Coordinates,
    /// Trip duration in seconds
    pub trip_duration: i64,
}

/// Trip from the string-id dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactTrip {
    /// External identifier, always prefixed "id"
    pub id: String,
    pub vendor_id: i64,
    pub pickup_datetime: DateTime<Utc>,
    pub passenger_count: i32,
    pub coordinates: Coordinates,
}

/// A persisted or about-to-be-persisted taxi trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "lowercase")]
pub enum TaxiTrip {
    Detailed(DetailedTrip),
    Compact(CompactTrip),
}

impl TaxiTrip {
    /// Schema this record belongs to
    pub fn schema(&self) -> TripSchema {
        match self {
            TaxiTrip::Detailed(_) => TripSchema::Detailed,
            TaxiTrip::Compact(_) => TripSchema::Compact,
        }
    }

    pub fn pickup_datetime(&self) -> DateTime<Utc> {
        match self {
            TaxiTrip::Detailed(trip) => trip.pickup_datetime,
            TaxiTrip::Compact(trip) => trip.pickup_datetime,
        }
    }

    pub fn coordinates(&self) -> &Coordinates {
        match self {
            TaxiTrip::Detailed(trip) => &trip.coordinates,
            TaxiTrip::Compact(trip) => &trip.coordinates,
        }
    }

    pub fn passenger_count(&self) -> i32 {
        match self {
            TaxiTrip::Detailed(trip) => trip.passenger_count,
            TaxiTrip::Compact(trip) => trip.passenger_count,
        }
    }

    /// Duration in seconds, when the schema tracks it
    pub fn trip_duration(&self) -> Option<i64> {
        match self {
            TaxiTrip::Detailed(trip) => Some(trip.trip_duration),
            TaxiTrip::Compact(_) => None,
        }
    }

    /// Vendor identifier rendered as text
    pub fn vendor_label(&self) -> String {
        match self {
            TaxiTrip::Detailed(trip) => trip.vendor_id.clone(),
            TaxiTrip::Compact(trip) => trip.vendor_id.to_string(),
        }
    }
}

// =============================================================================
// Query Filter
// =============================================================================

/// Inclusive pickup-time range; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TripFilter {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Filter that matches every trip
    pub fn all() -> Self {
        Self::default()
    }

    /// True when the pickup timestamp falls inside the range
    pub fn matches(&self, pickup: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| pickup >= start) && self.end.is_none_or(|end| pickup <= end)
    }
}

// =============================================================================
// Query Results
// =============================================================================

/// Count and mean duration over a filtered trip set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripStats {
    pub total_trips: usize,
    /// Mean duration in seconds, 0.0 when nothing matches
    pub average_duration: f64,
}

/// A (latitude, longitude) point in a route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A pickup/dropoff pair ranked by how often it occurs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularRoute {
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub trip_count: usize,
    /// None when no trip on the route tracks a duration
    pub avg_duration: Option<f64>,
}

/// Trip count for one (day-of-week, hour) slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakHour {
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u32,
    pub hour: u32,
    pub trip_count: usize,
}

/// Trip count for one rounded planar distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBucket {
    pub distance_km: f64,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_schema_detection() {
        let detailed = ["vendor_id", "pickup_datetime", "trip_duration"];
        let compact = ["id", "vendor_id", "pickup_datetime"];
        assert_eq!(TripSchema::detect(&detailed), TripSchema::Detailed);
        assert_eq!(TripSchema::detect(&compact), TripSchema::Compact);
    }

    #[test]
    fn test_schema_from_str() {
        assert_eq!(
            "Detailed".parse::<TripSchema>().unwrap(),
            TripSchema::Detailed
        );
        assert_eq!(" compact ".parse::<TripSchema>().unwrap(), TripSchema::Compact);
        assert!("wide".parse::<TripSchema>().is_err());
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let filter = TripFilter::new(Some(start), Some(end));

        assert!(filter.matches(start));
        assert!(filter.matches(end));
        assert!(!filter.matches(end + chrono::Duration::seconds(1)));
        assert!(TripFilter::all().matches(start));
    }
}
