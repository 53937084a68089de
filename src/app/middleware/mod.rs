//! Middleware composed around query operations
//!
//! - [`clock`] - Injectable time source
//! - [`cache`] - Response cache keyed by a digest of the call
//! - [`metrics`] - Request counters and latency histograms
//! - [`rate_limit`] - Fixed-window per-client request budget

pub mod cache;
pub mod clock;
pub mod metrics;
pub mod rate_limit;

pub use cache::{CacheBackend, CacheKey, MemoryCache, cached};
pub use clock::{Clock, ManualClock, SystemClock};
pub use metrics::{MetricsSnapshot, OperationSnapshot, RequestMetrics};
pub use rate_limit::RateLimiter;
