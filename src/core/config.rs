//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the supervisor runtime.
//!
//! Config is applied once, when the supervisor is built:
//! `Supervisor::builder(config).build()`.
//!
//! ## Sentinel values
//! - `grace = 0s` → replaced by the default grace period ([`DEFAULT_GRACE`])

use std::time::Duration;

/// Grace period used when none (or a non-positive one) is configured.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Environment variable read by [`Config::from_env`].
pub const GRACE_ENV: &str = "DAEMONVISOR_GRACE_SECS";

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `grace`: Maximum wait for tasks to stop after the first interrupt
///   (`0s` = use [`DEFAULT_GRACE`])
///
/// ## Notes
/// Fields are public for flexibility. Prefer [`Config::grace_period`] over
/// reading `grace` directly so the sentinel is handled in one place.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for graceful shutdown before forcing exit.
    ///
    /// When the first interrupt-class signal arrives:
    /// - the root scope is cancelled (every task observes it)
    /// - the coordinator waits up to `grace` for tasks to return
    /// - if the timer elapses first, the exit is forced
    pub grace: Duration,
}

impl Config {
    /// Builds a config from a grace period in whole seconds.
    ///
    /// Non-positive values fall back to [`DEFAULT_GRACE`].
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use daemonvisor::Config;
    ///
    /// assert_eq!(Config::with_grace_secs(3).grace_period(), Duration::from_secs(3));
    /// assert_eq!(Config::with_grace_secs(-1).grace_period(), Duration::from_secs(5));
    /// ```
    pub fn with_grace_secs(secs: i64) -> Self {
        let grace = u64::try_from(secs)
            .ok()
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GRACE);
        Self { grace }
    }

    /// Reads the grace period from `DAEMONVISOR_GRACE_SECS`.
    ///
    /// Missing or unparsable values keep the default.
    pub fn from_env() -> Self {
        match std::env::var(GRACE_ENV) {
            Ok(raw) => Self::parse_grace(&raw),
            Err(_) => Self::default(),
        }
    }

    fn parse_grace(raw: &str) -> Self {
        raw.trim()
            .parse::<i64>()
            .map(Self::with_grace_secs)
            .unwrap_or_default()
    }

    /// Returns the effective grace period.
    ///
    /// - `grace == 0s` → [`DEFAULT_GRACE`]
    /// - otherwise → `grace`
    #[inline]
    pub fn grace_period(&self) -> Duration {
        if self.grace == Duration::ZERO {
            DEFAULT_GRACE
        } else {
            self.grace
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            grace: DEFAULT_GRACE,
        }
    }
}
