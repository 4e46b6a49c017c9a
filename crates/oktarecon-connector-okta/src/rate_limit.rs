//! Rate limit handling for the Okta management API.
//!
//! Okta answers a throttled request with `429` and an `x-rate-limit-reset`
//! header holding the epoch second at which the window resets. The limiter
//! waits until one second past that instant (never less than a configured
//! floor) and falls back to exponential backoff with jitter when the header
//! is missing.

use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::{OktaError, OktaResult};

/// Header carrying the epoch second at which the rate limit window resets.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

/// Configuration for rate limit handling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Base delay for exponential backoff in milliseconds (default: 1000ms).
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds (default: 300000ms = 5 minutes).
    pub max_delay_ms: u64,
    /// Jitter factor as a fraction of delay (default: 0.25 = 25%).
    pub jitter_factor: f64,
    /// Maximum retry attempts for rate limited requests (default: 10).
    pub max_retries: u32,
    /// Shortest wait after a 429 carrying a reset header (default: 2000ms).
    pub min_reset_wait_ms: u64,
    /// Retries for 502/503/504 responses (default: 3).
    pub transient_retries: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 300_000,
            jitter_factor: 0.25,
            max_retries: 10,
            min_reset_wait_ms: 2000,
            transient_retries: 3,
        }
    }
}

impl RateLimitConfig {
    /// Creates a configuration optimized for testing (shorter delays).
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            base_delay_ms: 10,
            max_delay_ms: 100,
            jitter_factor: 0.25,
            max_retries: 3,
            min_reset_wait_ms: 10,
            transient_retries: 2,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_delay_ms == 0 {
            return Err("base_delay_ms must be > 0".to_string());
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err("max_delay_ms must be >= base_delay_ms".to_string());
        }
        if self.min_reset_wait_ms > self.max_delay_ms {
            return Err("min_reset_wait_ms must be <= max_delay_ms".to_string());
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err("jitter_factor must be in range [0.0, 1.0]".to_string());
        }
        Ok(())
    }
}

/// Computes and sleeps through retry delays.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Creates a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Parses the `x-rate-limit-reset` header value (epoch seconds).
    #[must_use]
    pub fn parse_reset_header(header_value: &str) -> Option<i64> {
        header_value.trim().parse::<i64>().ok()
    }

    /// Calculates backoff delay with exponential growth.
    #[must_use]
    pub fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.base_delay_ms as f64;
        let max = self.config.max_delay_ms as f64;

        let delay_ms = (base * 2_f64.powi(attempt.min(30) as i32)).min(max);

        Duration::from_millis(delay_ms as u64)
    }

    /// Adds jitter to a delay using the configured factor.
    #[must_use]
    pub fn add_jitter(&self, delay: Duration) -> Duration {
        use rand::Rng;

        let delay_ms = delay.as_millis() as f64;
        let jitter_range = delay_ms * self.config.jitter_factor;
        if jitter_range <= 0.0 {
            return delay;
        }
        let jitter = rand::thread_rng().gen_range(0.0..=jitter_range);

        Duration::from_millis((delay_ms + jitter) as u64)
    }

    /// Wait derived from a reset timestamp: one second past the reset,
    /// clamped to `[min_reset_wait_ms, max_delay_ms]`.
    #[must_use]
    pub fn reset_wait(&self, reset_epoch: i64, now_epoch: i64) -> Duration {
        let until_reset_ms = reset_epoch
            .saturating_sub(now_epoch)
            .saturating_add(1)
            .max(0)
            .unsigned_abs()
            .saturating_mul(1000);

        let wait_ms = until_reset_ms
            .max(self.config.min_reset_wait_ms)
            .min(self.config.max_delay_ms);
        if wait_ms < until_reset_ms {
            warn!(
                "Rate limit reset in {}ms exceeds max, capping at {}ms",
                until_reset_ms, wait_ms
            );
        }
        Duration::from_millis(wait_ms)
    }

    /// Delay before the next attempt after a 429.
    #[must_use]
    pub fn rate_limit_delay(&self, reset_header: Option<&str>, attempt: u32) -> Duration {
        match reset_header.and_then(Self::parse_reset_header) {
            Some(reset) => self.reset_wait(reset, chrono::Utc::now().timestamp()),
            None => self.add_jitter(self.calculate_backoff_delay(attempt)),
        }
    }

    /// Handles a rate limit response (429).
    ///
    /// Sleeps until the request may be retried, or fails once `attempt`
    /// reaches the configured maximum.
    pub async fn handle_rate_limit_response(
        &self,
        reset_header: Option<&str>,
        attempt: u32,
    ) -> OktaResult<()> {
        if attempt >= self.config.max_retries {
            return Err(OktaError::MaxRetriesExceeded { attempts: attempt });
        }

        let delay = self.rate_limit_delay(reset_header, attempt);
        info!("Rate limited, waiting {:?} (attempt {})", delay, attempt + 1);
        tokio::time::sleep(delay).await;
        Ok(())
    }

    /// Whether another retry is allowed for a transient server error.
    #[must_use]
    pub fn can_retry_transient(&self, retries: u32) -> bool {
        retries < self.config.transient_retries
    }

    /// Backoff before retrying a transient server error.
    #[must_use]
    pub fn transient_delay(&self, retries: u32) -> Duration {
        self.add_jitter(self.calculate_backoff_delay(retries))
    }
}
