//! Rate limiting implementation
//!
//! Wrike allows a fixed number of requests per time window. The limiter keeps
//! the admission times of the last `max_requests` requests; a new request is
//! admitted only once the oldest of them has left the window, so no window of
//! length `period` ever contains more than `max_requests` admissions.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per window
    pub max_requests: u32,
    /// Window length
    pub period: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            period: Duration::from_secs(15),
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(max_requests: u32, period: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            period,
        }
    }
}

/// Window rate limiter shared by every clone
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    admitted: Arc<Mutex<VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            config: config.clone(),
            admitted: Arc::new(Mutex::new(VecDeque::with_capacity(
                config.max_requests as usize,
            ))),
        }
    }

    /// Wait until a request can be made, returning how long the caller blocked
    pub async fn acquire(&self) -> Duration {
        let mut admitted = self.admitted.lock().await;
        let started = Instant::now();
        let cap = self.config.max_requests as usize;

        self.evict_expired(&mut admitted, started);

        if admitted.len() >= cap {
            if let Some(&oldest) = admitted.front() {
                let ready_at = oldest + self.config.period;
                info!(
                    "Rate limit of {} requests per {:?} reached, waiting {:?}",
                    self.config.max_requests,
                    self.config.period,
                    ready_at.saturating_duration_since(started)
                );
                tokio::time::sleep_until(ready_at).await;
                self.evict_expired(&mut admitted, Instant::now());
            }
        }

        admitted.push_back(Instant::now());
        started.elapsed()
    }

    /// Number of admissions still inside the current window
    pub async fn in_window(&self) -> usize {
        let mut admitted = self.admitted.lock().await;
        self.evict_expired(&mut admitted, Instant::now());
        admitted.len()
    }

    /// The limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    fn evict_expired(&self, admitted: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = admitted.front() {
            if now.saturating_duration_since(oldest) >= self.config.period {
                admitted.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimiterConfig::default())
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
