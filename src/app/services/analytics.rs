//! Aggregate analytics over persisted trips
//!
//! Every computation is read-only. Groupings run store-side through
//! [`TripStore::group_aggregate`]; store failures surface as
//! [`Error::QueryFailed`].

use crate::app::middleware::clock::{Clock, SystemClock};
use crate::app::models::{DistanceBucket, GeoPoint, PeakHour, PopularRoute, TripFilter};
use crate::app::store::{GroupKey, GroupOrder, GroupQuery, GroupRow, TripStore};
use crate::constants::DEFAULT_PERCENTILES;
use crate::utils::geo::haversine_distance_km;
use crate::utils::stats::{BasicStats, calculate_basic_stats, calculate_percentiles};
use crate::utils::time::time_window;
use crate::utils::validation::{validate_coordinates, validate_date_range};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Duration statistics over a filtered trip set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationSummary {
    pub stats: BasicStats,
    /// Keyed "p25", "p50", ...
    pub percentiles: BTreeMap<String, f64>,
}

/// Read-only analytics over a trip store
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn TripStore>,
    clock: Arc<dyn Clock>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn TripStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for trailing windows instead of wall-clock time
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn aggregate(&self, operation: &str, query: GroupQuery) -> Result<Vec<GroupRow>> {
        self.store
            .group_aggregate(&query)
            .map_err(|e| Error::query_failed(operation, e.to_string()))
    }

    /// Trip count per pickup hour; hours without trips are absent
    pub fn get_hourly_distribution(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<u32, usize>> {
        validate_date_range(start, end)?;
        let query = GroupQuery::new(GroupKey::Hour).with_filter(TripFilter::new(start, end));

        let rows = self.aggregate("get_hourly_distribution", query)?;
        Ok(rows
            .into_iter()
            .map(|row| (row.key[0].as_i64() as u32, row.count))
            .collect())
    }

    /// Most frequent pickup/dropoff pairs with at least `min_trips` trips
    pub fn get_popular_routes(&self, limit: usize, min_trips: usize) -> Result<Vec<PopularRoute>> {
        let query = GroupQuery::new(GroupKey::Route)
            .with_min_count(min_trips)
            .with_order(GroupOrder::CountDescending)
            .with_limit(limit);

        let rows = self.aggregate("get_popular_routes", query)?;
        debug!(
            "{} routes with at least {} trips (limit {})",
            rows.len(),
            min_trips,
            limit
        );

        Ok(rows
            .into_iter()
            .map(|row| PopularRoute {
                pickup: GeoPoint {
                    lat: row.key[0].as_f64(),
                    lng: row.key[1].as_f64(),
                },
                dropoff: GeoPoint {
                    lat: row.key[2].as_f64(),
                    lng: row.key[3].as_f64(),
                },
                trip_count: row.count,
                avg_duration: row.avg_duration,
            })
            .collect())
    }

    /// Trip count per (day-of-week, hour) over the trailing `days` days
    pub fn get_peak_hours(&self, days: i64) -> Result<Vec<PeakHour>> {
        if days < 0 {
            return Err(Error::configuration(format!(
                "Peak-hour window must not be negative, got {} days",
                days
            )));
        }

        let (start, end) = time_window(self.clock.now(), days)?;
        let query = GroupQuery::new(GroupKey::DayOfWeekHour)
            .with_filter(TripFilter::new(Some(start), Some(end)));

        let rows = self.aggregate("get_peak_hours", query)?;
        Ok(rows
            .into_iter()
            .map(|row| PeakHour {
                day_of_week: row.key[0].as_i64() as u32,
                hour: row.key[1].as_i64() as u32,
                trip_count: row.count,
            })
            .collect())
    }

    /// Trip count per planar distance rounded to 0.1 km, ascending
    pub fn get_distance_distribution(&self) -> Result<Vec<DistanceBucket>> {
        let rows = self.aggregate(
            "get_distance_distribution",
            GroupQuery::new(GroupKey::PlanarDistance),
        )?;

        Ok(rows
            .into_iter()
            .map(|row| DistanceBucket {
                distance_km: row.key[0].as_f64(),
                count: row.count,
            })
            .collect())
    }

    /// Basic statistics and percentiles of trip durations in `[start, end]`
    pub fn get_duration_summary(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DurationSummary> {
        validate_date_range(start, end)?;

        let durations: Vec<f64> = self
            .store
            .query_trips(&TripFilter::new(start, end), None)
            .map_err(|e| Error::query_failed("get_duration_summary", e.to_string()))?
            .iter()
            .filter_map(|trip| trip.trip_duration())
            .map(|duration| duration as f64)
            .collect();

        Ok(DurationSummary {
            stats: calculate_basic_stats(&durations),
            percentiles: calculate_percentiles(&durations, DEFAULT_PERCENTILES),
        })
    }

    /// Great-circle length of a route
    ///
    /// Not the planar figure used by [`get_distance_distribution`](Self::get_distance_distribution).
    /// Endpoints outside the latitude/longitude bounds are rejected.
    pub fn get_route_distance_km(&self, route: &PopularRoute) -> Result<f64> {
        for point in [&route.pickup, &route.dropoff] {
            validate_coordinates(point.lat, point.lng)?;
        }
        Ok(haversine_distance_km(
            (route.pickup.lat, route.pickup.lng),
            (route.dropoff.lat, route.dropoff.lng),
        ))
    }
}
