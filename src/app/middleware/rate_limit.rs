//! Per-client request budget over a fixed window

use super::clock::Clock;
use crate::constants::RATE_LIMIT_WINDOW_SECS;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: DateTime<Utc>,
    count: u32,
}

/// Allows `limit` requests per client in each window
///
/// A client's window starts at its first request and resets once the
/// window length has elapsed. Elapsed windows are dropped on every check,
/// so only clients seen within the last window are tracked.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit,
            window: Duration::seconds(RATE_LIMIT_WINDOW_SECS),
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one request from `client`, failing when the budget is spent
    pub fn check(&self, client: &str) -> Result<()> {
        let now = self.clock.now();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.retain(|_, window| now - window.started < self.window);

        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if window.count >= self.limit {
            warn!("Rate limit exceeded for client '{}'", client);
            return Err(Error::rate_limited(client, self.limit));
        }

        window.count += 1;
        Ok(())
    }

    /// Number of clients with an open window
    pub fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Requests `client` may still make in its current window
    pub fn remaining(&self, client: &str) -> u32 {
        let now = self.clock.now();
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        match windows.get(client) {
            Some(window) if now - window.started < self.window => {
                self.limit.saturating_sub(window.count)
            }
            _ => self.limit,
        }
    }
}
