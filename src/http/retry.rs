//! Retry policy
//!
//! Exponential backoff with a fixed attempt budget. The budget counts the
//! first attempt, so `max_attempts = 5` means at most four retries.

use std::time::Duration;

/// Exponential backoff settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound on a single delay
    pub max_backoff: Duration,
    /// Growth factor between consecutive delays
    pub factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
            factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default factor of 2
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
            ..Self::default()
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let multiplier = self.factor.saturating_pow(exponent);
        let delay = self
            .initial_backoff
            .checked_mul(multiplier)
            .unwrap_or(self.max_backoff);
        std::cmp::min(delay, self.max_backoff)
    }

    /// Whether another attempt is allowed after `attempt` attempts were made
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Every delay the policy would sleep through before giving up
    pub fn delays(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|a| self.backoff_after(a)).collect()
    }
}
