//! Configuration management and validation.
//!
//! `Settings` is built once at startup from the environment (with `.env`
//! support) and passed by reference into every component that needs it.

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CACHE_TTL_SECS, DEFAULT_RATE_LIMIT_PER_MINUTE, MAX_CACHE_TTL_SECS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Application settings shared by ingestion, queries and middleware
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Lifetime of cached query results in seconds
    pub cache_ttl_secs: u64,

    /// Requests allowed per client per minute
    pub rate_limit_per_minute: u32,

    /// Default log level when RUST_LOG is not set
    pub log_level: String,

    /// Record request metrics for queries and ingestion
    pub enable_metrics: bool,

    /// Rows per ingestion chunk when the caller does not specify one
    pub default_batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            log_level: "info".to_string(),
            enable_metrics: true,
            default_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Settings {
    /// Build settings from the process environment, loading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build settings from an explicit variable map
    ///
    /// Unset variables keep their defaults; set but unparsable numeric
    /// variables are configuration errors.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(ttl) = vars.get("CACHE_TTL") {
            settings.cache_ttl_secs = parse_var("CACHE_TTL", ttl)?;
        }
        if let Some(limit) = vars.get("RATE_LIMIT_PER_MINUTE") {
            settings.rate_limit_per_minute = parse_var("RATE_LIMIT_PER_MINUTE", limit)?;
        }
        if let Some(level) = vars.get("LOG_LEVEL") {
            settings.log_level = level.to_lowercase();
        }
        if let Some(enabled) = vars.get("ENABLE_METRICS") {
            settings.enable_metrics = parse_var("ENABLE_METRICS", enabled)?;
        }
        if let Some(batch_size) = vars.get("BATCH_SIZE") {
            settings.default_batch_size = parse_var("BATCH_SIZE", batch_size)?;
        }

        settings.validate()?;
        debug!(
            "Settings loaded: cache_ttl={}s rate_limit={}/min batch_size={}",
            settings.cache_ttl_secs, settings.rate_limit_per_minute, settings.default_batch_size
        );
        Ok(settings)
    }

    /// Reject settings no component can work with
    pub fn validate(&self) -> Result<()> {
        if self.default_batch_size == 0 {
            return Err(Error::configuration("batch size must be positive"));
        }
        if self.rate_limit_per_minute == 0 {
            return Err(Error::configuration("rate limit must be positive"));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(Error::configuration(format!(
                "cache TTL must not exceed {}s, got {}s",
                MAX_CACHE_TTL_SECS, self.cache_ttl_secs
            )));
        }
        Ok(())
    }

    /// Cache lifetime as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Set the cache lifetime
    pub fn with_cache_ttl(mut self, ttl_secs: u64) -> Self {
        self.cache_ttl_secs = ttl_secs;
        self
    }

    /// Set the per-client rate limit
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit_per_minute = per_minute;
        self
    }

    /// Set the default ingestion batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.default_batch_size = batch_size;
        self
    }

    /// Disable request metrics
    pub fn without_metrics(mut self) -> Self {
        self.enable_metrics = false;
        self
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        Error::configuration(format!("invalid value for {}: '{}'", name, value))
    })
}
