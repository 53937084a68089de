//! Application constants for taxi trip processing
//!
//! This module contains default values, column names and thresholds used
//! throughout ingestion, cleaning and analytics.

// =============================================================================
// Ingestion Defaults
// =============================================================================

/// Default number of rows read and committed per chunk
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Maximum number of chunk error messages retained in a run summary
pub const MAX_RETAINED_CHUNK_ERRORS: usize = 20;

/// File extension accepted by the upload boundary
pub const CSV_EXTENSION: &str = "csv";

/// Message returned with a completed upload
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Data ingestion completed successfully";

/// Cell values treated as missing when reading CSV sources
///
/// The pandas `read_csv` default `na_values`, matched exactly after trimming.
pub const MISSING_VALUE_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// =============================================================================
// Cleaning Rules
// =============================================================================

/// Trips longer than this many seconds are discarded as outliers
pub const MAX_TRIP_DURATION_SECS: i64 = 86_400;

/// Coordinate value used by sources to mark a missing GPS fix
pub const SENTINEL_COORDINATE: f64 = 0.0;

/// Separator after which a column-name suffix is stripped
pub const COLUMN_SUFFIX_SEPARATOR: &str = "__";

/// Prefix carried by every identifier in the compact schema
pub const TRIP_ID_PREFIX: &str = "id";

// =============================================================================
// Column Names
// =============================================================================

pub mod columns {
    pub const ID: &str = "id";
    pub const VENDOR_ID: &str = "vendor_id";
    pub const PICKUP_DATETIME: &str = "pickup_datetime";
    pub const DROPOFF_DATETIME: &str = "dropoff_datetime";
    pub const PASSENGER_COUNT: &str = "passenger_count";
    pub const PICKUP_LONGITUDE: &str = "pickup_longitude";
    pub const PICKUP_LATITUDE: &str = "pickup_latitude";
    pub const DROPOFF_LONGITUDE: &str = "dropoff_longitude";
    pub const DROPOFF_LATITUDE: &str = "dropoff_latitude";
    pub const TRIP_DURATION: &str = "trip_duration";

    /// The four coordinate columns checked against the sentinel value
    pub const COORDINATES: &[&str] = &[
        PICKUP_LONGITUDE,
        PICKUP_LATITUDE,
        DROPOFF_LONGITUDE,
        DROPOFF_LATITUDE,
    ];

    /// Columns required by the detailed (duration-bearing) schema
    pub const DETAILED_REQUIRED: &[&str] = &[
        VENDOR_ID,
        PICKUP_DATETIME,
        DROPOFF_DATETIME,
        PASSENGER_COUNT,
        PICKUP_LONGITUDE,
        PICKUP_LATITUDE,
        DROPOFF_LONGITUDE,
        DROPOFF_LATITUDE,
        TRIP_DURATION,
    ];

    /// Columns required by the compact (string id) schema
    pub const COMPACT_REQUIRED: &[&str] = &[
        ID,
        VENDOR_ID,
        PICKUP_DATETIME,
        PASSENGER_COUNT,
        PICKUP_LONGITUDE,
        PICKUP_LATITUDE,
        DROPOFF_LONGITUDE,
        DROPOFF_LATITUDE,
    ];
}

// =============================================================================
// Query and Analytics Defaults
// =============================================================================

/// Default maximum number of trips returned by a range query
pub const DEFAULT_TRIP_LIMIT: usize = 100;

/// Default number of routes returned by the popular-routes ranking
pub const DEFAULT_ROUTE_LIMIT: usize = 10;

/// Default minimum trip count for a route to be ranked
pub const DEFAULT_MIN_ROUTE_TRIPS: usize = 5;

/// Default trailing window for peak-hour analysis
pub const DEFAULT_PEAK_DAYS: i64 = 7;

/// Kilometres per degree used by the planar distance approximation
pub const KM_PER_DEGREE: f64 = 111.32;

/// Mean Earth radius used by the Haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Percentiles reported by duration summaries
pub const DEFAULT_PERCENTILES: &[f64] = &[25.0, 50.0, 75.0, 90.0, 95.0, 99.0];

// =============================================================================
// Middleware Defaults
// =============================================================================

/// Default cache entry lifetime in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Longest accepted cache lifetime (one year)
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 3600;

/// Default per-client request budget per minute
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 100;

/// Length of the rate limiting window in seconds
pub const RATE_LIMIT_WINDOW_SECS: i64 = 60;

/// Latency histogram bucket upper bounds in seconds
pub const LATENCY_BUCKETS_SECS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Prefix used for query cache keys
pub const QUERY_CACHE_PREFIX: &str = "trips";
