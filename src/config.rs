//! Configuration Module
//!
//! Handles loading the two expiry durations from environment variables.

use std::env;
use std::time::Duration;

/// Default maximum lifetime in milliseconds
pub const DEFAULT_MAX_LIFETIME_MS: u64 = 300_000;

/// Default maximum idle lifetime in milliseconds
pub const DEFAULT_MAX_IDLE_LIFETIME_MS: u64 = 60_000;

/// Store configuration parameters.
///
/// Both durations are fixed for the lifetime of a store. No validation is
/// performed: a zero duration makes entries expire almost immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Time after which an entry is evicted regardless of access
    pub max_lifetime: Duration,
    /// Time without a successful read after which an entry is evicted
    pub max_idle_lifetime: Duration,
}

impl Config {
    /// Creates a Config from explicit durations.
    pub fn new(max_lifetime: Duration, max_idle_lifetime: Duration) -> Self {
        Self {
            max_lifetime,
            max_idle_lifetime,
        }
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_LIFETIME_MS` - Maximum lifetime in milliseconds (default: 300000)
    /// - `MAX_IDLE_LIFETIME_MS` - Maximum idle lifetime in milliseconds (default: 60000)
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            max_lifetime: millis_from_env("MAX_LIFETIME_MS", DEFAULT_MAX_LIFETIME_MS),
            max_idle_lifetime: millis_from_env(
                "MAX_IDLE_LIFETIME_MS",
                DEFAULT_MAX_IDLE_LIFETIME_MS,
            ),
        }
    }
}

fn millis_from_env(name: &str, default: u64) -> Duration {
    let millis = env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default);
    Duration::from_millis(millis)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_lifetime: Duration::from_millis(DEFAULT_MAX_LIFETIME_MS),
            max_idle_lifetime: Duration::from_millis(DEFAULT_MAX_IDLE_LIFETIME_MS),
        }
    }
}
