//! Query gateway
//!
//! Every call is checked against the caller's rate limit, then timed by the
//! request metrics while the result is served from the cache or computed by
//! the query and analytics services. Results are returned as the services
//! produce them.

use crate::app::middleware::cache::{CacheBackend, CacheKey, MemoryCache, cached};
use crate::app::middleware::clock::{Clock, SystemClock};
use crate::app::middleware::metrics::RequestMetrics;
use crate::app::middleware::rate_limit::RateLimiter;
use crate::app::models::{DistanceBucket, PeakHour, PopularRoute, TaxiTrip, TripStats};
use crate::app::services::analytics::{AnalyticsService, DurationSummary};
use crate::app::services::trip_query::TripQueryService;
use crate::app::store::TripStore;
use crate::config::Settings;
use crate::constants::QUERY_CACHE_PREFIX;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Query and analytics operations behind rate limiting, caching and metrics
pub struct QueryGateway {
    queries: TripQueryService,
    analytics: AnalyticsService,
    cache: Arc<dyn CacheBackend>,
    metrics: Arc<RequestMetrics>,
    limiter: RateLimiter,
    cache_ttl: Duration,
}

impl QueryGateway {
    /// Build a gateway on wall-clock time with an in-process cache
    pub fn new(store: Arc<dyn TripStore>, settings: &Settings) -> Result<Self> {
        Self::with_clock(store, settings, Arc::new(SystemClock))
    }

    /// Build a gateway whose cache, rate limiter and analytics share `clock`
    pub fn with_clock(
        store: Arc<dyn TripStore>,
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Ok(Self {
            queries: TripQueryService::new(store.clone()),
            analytics: AnalyticsService::new(store).with_clock(clock.clone()),
            cache: Arc::new(MemoryCache::new(clock.clone())),
            metrics: Arc::new(RequestMetrics::new()?),
            limiter: RateLimiter::new(settings.rate_limit_per_minute, clock),
            cache_ttl: settings.cache_ttl(),
        })
    }

    /// Replace the cache backend
    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = cache;
        self
    }

    /// Share a metrics registry with other components
    pub fn with_metrics(mut self, metrics: Arc<RequestMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<RequestMetrics> {
        &self.metrics
    }

    fn call<T, A, F>(&self, client: &str, operation: &str, args: &A, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        A: Serialize,
        F: FnOnce() -> Result<T>,
    {
        self.limiter.check(client)?;
        self.metrics.track(operation, || {
            let key = CacheKey::new(QUERY_CACHE_PREFIX, operation, args)?;
            cached(self.cache.as_ref(), &key, self.cache_ttl, compute)
        })
    }

    pub fn get_trips(
        &self,
        client: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<TaxiTrip>> {
        self.call(client, "get_trips", &(start, end, limit), || {
            self.queries.get_trips(start, end, limit)
        })
    }

    pub fn get_trip_stats(
        &self,
        client: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<TripStats> {
        self.call(client, "get_trip_stats", &(start, end), || {
            self.queries.get_trip_stats(start, end)
        })
    }

    pub fn get_hourly_distribution(
        &self,
        client: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<u32, usize>> {
        self.call(client, "get_hourly_distribution", &(start, end), || {
            self.analytics.get_hourly_distribution(start, end)
        })
    }

    pub fn get_popular_routes(
        &self,
        client: &str,
        limit: usize,
        min_trips: usize,
    ) -> Result<Vec<PopularRoute>> {
        self.call(client, "get_popular_routes", &(limit, min_trips), || {
            self.analytics.get_popular_routes(limit, min_trips)
        })
    }

    pub fn get_peak_hours(&self, client: &str, days: i64) -> Result<Vec<PeakHour>> {
        self.call(client, "get_peak_hours", &(days,), || {
            self.analytics.get_peak_hours(days)
        })
    }

    pub fn get_distance_distribution(&self, client: &str) -> Result<Vec<DistanceBucket>> {
        self.call(client, "get_distance_distribution", &(), || {
            self.analytics.get_distance_distribution()
        })
    }

    pub fn get_duration_summary(
        &self,
        client: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DurationSummary> {
        self.call(client, "get_duration_summary", &(start, end), || {
            self.analytics.get_duration_summary(start, end)
        })
    }

    /// Great-circle length of a route, computed locally without touching
    /// the store or the middleware
    pub fn get_route_distance_km(&self, route: &PopularRoute) -> Result<f64> {
        self.analytics.get_route_distance_km(route)
    }
}
