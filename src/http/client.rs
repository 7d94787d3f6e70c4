//! Fetch client with retry and rate limiting
//!
//! A request passes through three layers, each implementing
//! [`PerformRequest`]:
//!
//! ```text
//! RetryingRequester      backoff between attempts, gives up on 4xx
//!   RateLimitedRequester waits for a slot in the request window
//!     HttpTransport      auth headers, URL logging, status check
//! ```
//!
//! Because the limiter sits inside the retry loop, every retry also consumes
//! a slot in the window.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::retry::RetryPolicy;
use crate::auth::{AuthConfig, Authenticator};
use crate::decode::CsvRows;
use crate::error::{Error, Result};
use crate::types::{JsonValue, ResponseFormat};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Configuration for the fetch client
#[derive(Debug, Clone)]
pub struct FetchClientConfig {
    /// Base URL endpoints are resolved against
    pub base_url: String,
    /// Bearer token sent with every request
    pub access_token: String,
    /// Transport timeout per attempt
    pub timeout: Duration,
    /// Retry settings
    pub retry: RetryPolicy,
    /// Request window settings
    pub rate_limit: RateLimiterConfig,
    /// User agent string
    pub user_agent: String,
}

impl Default for FetchClientConfig {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_API_URL.to_string(),
            access_token: String::new(),
            timeout: Duration::from_secs(300),
            retry: RetryPolicy::default(),
            rate_limit: RateLimiterConfig::default(),
            user_agent: format!("tap-wrike/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchClientConfig {
    /// Create a new config builder
    pub fn builder() -> FetchClientConfigBuilder {
        FetchClientConfigBuilder::default()
    }
}

/// Builder for fetch client config
#[derive(Default)]
pub struct FetchClientConfigBuilder {
    config: FetchClientConfig,
}

impl FetchClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the bearer token
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = token.into();
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the attempt budget
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = attempts.max(1);
        self
    }

    /// Set backoff bounds
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.retry.initial_backoff = initial;
        self.config.retry.max_backoff = max;
        self
    }

    /// Set the request window
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = config;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> FetchClientConfig {
        self.config
    }
}

/// A fully resolved GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// Target URL including query parameters
    pub url: Url,
}

impl ApiRequest {
    /// Create a request for a URL
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

/// A successful response with its body read into memory
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// URL the response came from
    pub url: String,
    /// Raw response body
    pub body: Bytes,
}

/// Anything that can turn a request into a successful response
#[async_trait]
pub trait PerformRequest: Send + Sync {
    /// Perform the request; non-2xx statuses are errors
    async fn perform(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<P: PerformRequest + ?Sized> PerformRequest for Box<P> {
    async fn perform(&self, request: &ApiRequest) -> Result<ApiResponse> {
        (**self).perform(request).await
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Single HTTP attempt with Wrike's required headers
pub struct HttpTransport {
    client: Client,
    authenticator: Authenticator,
}

impl HttpTransport {
    /// Create a transport sending the given bearer token
    pub fn new(access_token: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        if access_token.trim().is_empty() {
            return Err(Error::AuthConfigMissing);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(Error::Http)?;

        let authenticator = Authenticator::with_client(AuthConfig::bearer(access_token), client.clone());

        Ok(Self {
            client,
            authenticator,
        })
    }
}

#[async_trait]
impl PerformRequest for HttpTransport {
    async fn perform(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let req = self
            .client
            .get(request.url.clone())
            .header(ACCEPT, "application/json");
        let req = self.authenticator.apply(req).await?;

        info!("GET {}", request.url);
        let response = req.send().await?;

        let status = response.status();
        let url = response.url().to_string();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(Error::from_status(
                status.as_u16(),
                url,
                String::from_utf8_lossy(&body),
            ));
        }

        debug!("Request succeeded: {} ({} bytes)", url, body.len());
        Ok(ApiResponse {
            status: status.as_u16(),
            url,
            body,
        })
    }
}

// ============================================================================
// Rate limiting layer
// ============================================================================

/// Admits each request through a shared [`RateLimiter`] before sending it
pub struct RateLimitedRequester<P> {
    inner: P,
    limiter: RateLimiter,
}

impl<P> RateLimitedRequester<P> {
    /// Wrap a requester
    pub fn new(inner: P, limiter: RateLimiter) -> Self {
        Self { inner, limiter }
    }

    /// The limiter in use
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

#[async_trait]
impl<P: PerformRequest> PerformRequest for RateLimitedRequester<P> {
    async fn perform(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.limiter.acquire().await;
        self.inner.perform(request).await
    }
}

// ============================================================================
// Retry layer
// ============================================================================

/// Retries transient failures with exponential backoff
pub struct RetryingRequester<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P> RetryingRequester<P> {
    /// Wrap a requester
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<P: PerformRequest> PerformRequest for RetryingRequester<P> {
    async fn perform(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match self.inner.perform(request).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if !self.policy.allows_retry(attempt) {
                return Err(Error::TransientNetworkFailure {
                    attempts: attempt,
                    message: err.to_string(),
                });
            }

            let delay = self.policy.backoff_after(attempt);
            warn!(
                "Request to {} failed ({}), attempt {}/{}, retrying in {:?}",
                request.url, err, attempt, self.policy.max_attempts, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

// ============================================================================
// Fetch client
// ============================================================================

/// Decoded result of a fetch
#[derive(Debug)]
pub enum Fetched {
    /// Decoded JSON body
    Json(JsonValue),
    /// Forward-only CSV rows
    Csv(CsvRows),
}

/// Authenticated, rate-limited, retrying GET client for the Wrike API
pub struct FetchClient {
    base_url: Url,
    requester: Box<dyn PerformRequest>,
}

impl FetchClient {
    /// Build the standard retry → rate limit → transport chain
    pub fn new(config: FetchClientConfig) -> Result<Self> {
        let limiter = RateLimiter::new(&config.rate_limit);
        Self::with_rate_limiter(config, limiter)
    }

    /// Build the standard chain around an existing (possibly shared) limiter
    pub fn with_rate_limiter(config: FetchClientConfig, limiter: RateLimiter) -> Result<Self> {
        let transport =
            HttpTransport::new(&config.access_token, config.timeout, &config.user_agent)?;
        let requester = RetryingRequester::new(
            RateLimitedRequester::new(transport, limiter),
            config.retry.clone(),
        );
        Self::with_requester(&config.base_url, requester)
    }

    /// Use a custom requester chain
    pub fn with_requester(
        base_url: &str,
        requester: impl PerformRequest + 'static,
    ) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            requester: Box::new(requester),
        })
    }

    /// Base URL endpoints are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint (relative path or absolute URL) plus query params
    pub fn resolve(&self, endpoint: &str, params: &[(String, String)]) -> Result<Url> {
        let mut url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(endpoint)?
        } else {
            self.base_url.join(endpoint.trim_start_matches('/'))?
        };

        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        Ok(url)
    }

    /// Fetch an endpoint and decode it in the requested format
    pub async fn fetch(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        format: ResponseFormat,
    ) -> Result<Fetched> {
        let request = ApiRequest::new(self.resolve(endpoint, params)?);
        let response = self.requester.perform(&request).await?;

        match format {
            ResponseFormat::Json => {
                let value = serde_json::from_slice(&response.body).map_err(|e| {
                    Error::decode(format!("Invalid JSON from {}: {e}", response.url))
                })?;
                Ok(Fetched::Json(value))
            }
            ResponseFormat::Csv => Ok(Fetched::Csv(CsvRows::from_bytes(response.body)?)),
        }
    }

    /// Fetch an endpoint as JSON
    pub async fn fetch_json(&self, endpoint: &str, params: &[(String, String)]) -> Result<JsonValue> {
        match self.fetch(endpoint, params, ResponseFormat::Json).await? {
            Fetched::Json(value) => Ok(value),
            Fetched::Csv(_) => Err(Error::decode("expected a JSON body")),
        }
    }

    /// Fetch an endpoint as CSV rows
    pub async fn fetch_csv(&self, endpoint: &str, params: &[(String, String)]) -> Result<CsvRows> {
        match self.fetch(endpoint, params, ResponseFormat::Csv).await? {
            Fetched::Csv(rows) => Ok(rows),
            Fetched::Json(_) => Err(Error::decode("expected a CSV body")),
        }
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Parse a base URL and make sure relative joins append to its path
fn normalize_base_url(base: &str) -> Result<Url> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };
    Ok(Url::parse(&base)?)
}
