//! Polling and timeout configuration.
//!
//! # Polling Strategy
//!
//! - **First fetch**: immediately
//! - **Interval**: starts at `delay`, then doubles, kept within
//!   `[min_interval, max_interval]`
//! - **Not-found tolerance**: up to `not_found_checks` consecutive misses while
//!   waiting for an object that should exist
//!
//! Timeouts are per operation class and apply to each wait separately; they
//! are never pooled across a whole lifecycle call.

use std::time::Duration;

/// Default delay before the second fetch (1 second).
const DEFAULT_DELAY_SECS: u64 = 1;

/// Default floor for the interval between fetches (3 seconds).
const DEFAULT_MIN_INTERVAL_SECS: u64 = 3;

/// Default ceiling for the interval between fetches (10 seconds).
const DEFAULT_MAX_INTERVAL_SECS: u64 = 10;

/// Default number of consecutive not-found fetches tolerated.
const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Default pause after a delete, letting the API's cascade propagate (5 seconds).
const DEFAULT_SETTLE_DELAY_SECS: u64 = 5;

/// Default timeout for each operation class (10 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Configuration for convergence polling.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait before the second fetch.
    ///
    /// Default: 1 second.
    pub delay: Duration,

    /// Lower bound for every later interval.
    ///
    /// Default: 3 seconds.
    pub min_interval: Duration,

    /// Upper bound for every later interval.
    ///
    /// Default: 10 seconds.
    pub max_interval: Duration,

    /// Consecutive not-found fetches tolerated when the object is expected to
    /// exist. Irrelevant when waiting for removal.
    ///
    /// Default: 20.
    pub not_found_checks: u32,

    /// Pause at the end of a delete. Configure via `MCAPP_SETTLE_DELAY_SECS`.
    ///
    /// Default: 5 seconds.
    pub settle_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    /// Creates a new `PollConfig` with default values.
    pub fn new() -> Self {
        PollConfig {
            delay: Duration::from_secs(DEFAULT_DELAY_SECS),
            min_interval: Duration::from_secs(DEFAULT_MIN_INTERVAL_SECS),
            max_interval: Duration::from_secs(DEFAULT_MAX_INTERVAL_SECS),
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            settle_delay: Duration::from_secs(DEFAULT_SETTLE_DELAY_SECS),
        }
    }

    /// Creates a `PollConfig` from environment variables.
    ///
    /// Reads `MCAPP_SETTLE_DELAY_SECS` for the settle delay.
    /// Other values use defaults.
    pub fn from_env() -> Self {
        let settle_secs = env_secs("MCAPP_SETTLE_DELAY_SECS").unwrap_or(DEFAULT_SETTLE_DELAY_SECS);

        PollConfig {
            settle_delay: Duration::from_secs(settle_secs),
            ..Self::new()
        }
    }

    /// Returns the interval to use after `previous`.
    ///
    /// # Formula
    ///
    /// `clamp(previous * 2, min_interval, max(min_interval, max_interval))`
    pub fn next_interval(&self, previous: Duration) -> Duration {
        let ceiling = self.max_interval.max(self.min_interval);
        previous
            .saturating_mul(2)
            .clamp(self.min_interval, ceiling)
    }

    /// Returns the sequence of sleeps between fetches, first `count` entries.
    pub fn intervals(&self, count: usize) -> Vec<Duration> {
        let mut out = Vec::with_capacity(count);
        let mut wait = self.delay;
        for _ in 0..count {
            out.push(wait);
            wait = self.next_interval(wait);
        }
        out
    }
}

/// Per-operation-class timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeouts {
    /// Ten minutes for every class.
    pub fn new() -> Self {
        let d = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Timeouts {
            create: d,
            update: d,
            delete: d,
        }
    }

    /// Reads `MCAPP_CREATE_TIMEOUT_SECS`, `MCAPP_UPDATE_TIMEOUT_SECS` and
    /// `MCAPP_DELETE_TIMEOUT_SECS`, defaulting each to ten minutes.
    pub fn from_env() -> Self {
        let defaults = Self::new();
        let read = |name: &str, default: Duration| {
            env_secs(name).map(Duration::from_secs).unwrap_or(default)
        };

        Timeouts {
            create: read("MCAPP_CREATE_TIMEOUT_SECS", defaults.create),
            update: read("MCAPP_UPDATE_TIMEOUT_SECS", defaults.update),
            delete: read("MCAPP_DELETE_TIMEOUT_SECS", defaults.delete),
        }
    }
}

fn env_secs(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok())
}
