use std::time::Duration;

use crate::constants::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_BACKOFF_SECS, DEFAULT_REQUESTS_PER_MINUTE, DEFAULT_SCORE_CACHE_CAPACITY,
};

/// Retry, pacing and memoization settings for [`OracleAdapter`](super::OracleAdapter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    /// Attempts per record, including the first. Default: `3`.
    pub max_attempts: u32,
    /// First retry delay; doubles per attempt. Default: 1s.
    pub backoff_base: Duration,
    /// Cap on a computed retry delay. A larger `retry-after` hint still wins.
    pub max_backoff: Duration,
    /// Outbound request budget. Default: `50`.
    pub requests_per_minute: u32,
    /// Per-call timeout. Default: 60s.
    pub call_timeout: Duration,
    pub cache_capacity: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            max_backoff: Duration::from_secs(DEFAULT_MAX_BACKOFF_SECS),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            cache_capacity: DEFAULT_SCORE_CACHE_CAPACITY,
        }
    }
}

impl OracleConfig {
    /// Retry delay before attempt `attempt + 1`, ignoring rate-limit widening:
    /// `backoff_base * 2^(attempt - 1)`, capped at `max_backoff`.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}
