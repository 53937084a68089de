//! Range queries over persisted trips

use crate::app::models::{TaxiTrip, TripFilter, TripStats};
use crate::app::store::TripStore;
use crate::constants::DEFAULT_TRIP_LIMIT;
use crate::utils::validation::validate_date_range;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Read-only trip queries
#[derive(Clone)]
pub struct TripQueryService {
    store: Arc<dyn TripStore>,
}

impl TripQueryService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self { store }
    }

    /// Trips with pickup in `[start, end]`, ascending by pickup time
    ///
    /// At most `limit` trips are returned; the default is 100.
    pub fn get_trips(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<TaxiTrip>> {
        validate_date_range(start, end)?;
        let limit = limit.unwrap_or(DEFAULT_TRIP_LIMIT);

        let trips = self
            .store
            .query_trips(&TripFilter::new(start, end), Some(limit))
            .map_err(|e| Error::query_failed("get_trips", e.to_string()))?;

        debug!("get_trips returned {} trips (limit {})", trips.len(), limit);
        Ok(trips)
    }

    /// Count and mean duration of trips with pickup in `[start, end]`
    pub fn get_trip_stats(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<TripStats> {
        validate_date_range(start, end)?;
        let filter = TripFilter::new(start, end);

        let total_trips = self
            .store
            .count(&filter)
            .map_err(|e| Error::query_failed("get_trip_stats", e.to_string()))?;
        let average_duration = self
            .store
            .average_duration(&filter)
            .map_err(|e| Error::query_failed("get_trip_stats", e.to_string()))?
            .unwrap_or(0.0);

        Ok(TripStats {
            total_trips,
            average_duration,
        })
    }
}
