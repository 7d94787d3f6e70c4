//! HTTP fetch module
//!
//! Provides the Wrike fetch client with retry, rate limiting, and backoff.
//!
//! # Features
//!
//! - **Explicit composition**: retry, rate limiting and transport are separate
//!   [`PerformRequest`] layers stacked at construction time
//! - **Rate Limiting**: at most 100 requests per 15 second window
//! - **Backoff**: exponential (factor 2), 5 attempts, 4xx never retried
//! - **Formats**: decoded JSON or forward-only CSV rows

mod client;
mod rate_limit;
mod retry;

pub use client::{
    ApiRequest, ApiResponse, FetchClient, FetchClientConfig, FetchClientConfigBuilder, Fetched,
    HttpTransport, PerformRequest, RateLimitedRequester, RetryingRequester,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::RetryPolicy;

#[cfg(test)]
mod tests;
