//! Tap configuration
//!
//! The config file is a flat JSON object. It is parsed once at startup into
//! [`TapConfig`], validated, and passed by reference from then on.

use crate::error::{Error, Result};
use crate::http::{FetchClientConfig, RateLimiterConfig};
use crate::types::{OptionStringExt, SyncStrategy};
use crate::warehouse::TableRef;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Wrike REST endpoint
pub const DEFAULT_API_URL: &str = "https://www.wrike.com/api/v4/";

/// Default BigQuery REST endpoint
pub const DEFAULT_BIGQUERY_URL: &str = "https://bigquery.googleapis.com/bigquery/v2/";

/// Complete tap configuration loaded from the `--config` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Wrike permanent access token
    #[serde(default)]
    pub access_token: Option<String>,

    /// Fetch strategy
    #[serde(default)]
    pub mode: SyncStrategy,

    /// Wrike API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// `pageSize` sent on direct requests (omitted when unset)
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Directory of `<stream>.json` schema files (built-in schemas when unset)
    #[serde(default)]
    pub schemas_dir: Option<PathBuf>,

    /// BigQuery project holding the destination dataset
    #[serde(default)]
    pub bq_project: Option<String>,

    /// BigQuery dataset holding the destination tables
    #[serde(default)]
    pub bq_dataset: Option<String>,

    /// Service-account key file for BigQuery
    #[serde(default)]
    pub bq_credentials_path: Option<PathBuf>,

    /// Pre-issued OAuth token for BigQuery (takes precedence over the key file)
    #[serde(default)]
    pub bq_access_token: Option<String>,

    /// BigQuery API base URL
    #[serde(default = "default_bigquery_url")]
    pub bq_api_url: String,

    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound on a single backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Requests admitted per rate-limit window
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: u32,

    /// Rate-limit window length in seconds
    #[serde(default = "default_rate_limit_period_secs")]
    pub rate_limit_period_secs: u64,

    /// Per-request transport timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_bigquery_url() -> String {
    DEFAULT_BIGQUERY_URL.to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    2_000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

fn default_rate_limit_requests() -> u32 {
    100
}

fn default_rate_limit_period_secs() -> u64 {
    15
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            mode: SyncStrategy::default(),
            api_url: default_api_url(),
            page_size: None,
            schemas_dir: None,
            bq_project: None,
            bq_dataset: None,
            bq_credentials_path: None,
            bq_access_token: None,
            bq_api_url: default_bigquery_url(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            rate_limit_requests: default_rate_limit_requests(),
            rate_limit_period_secs: default_rate_limit_period_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl TapConfig {
    /// Parse a config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("Invalid config JSON: {e}")))
    }

    /// Load a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Check the settings the selected strategy needs
    pub fn validate(&self) -> Result<()> {
        self.access_token()?;

        if self.max_attempts == 0 {
            return Err(Error::config("max_attempts must be at least 1"));
        }
        if self.rate_limit_requests == 0 || self.rate_limit_period_secs == 0 {
            return Err(Error::config("rate limit window must admit at least one request"));
        }

        if self.mode == SyncStrategy::BulkExport {
            self.destination_table("validate")?;
        }

        Ok(())
    }

    /// The Wrike bearer token
    pub fn access_token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::AuthConfigMissing)
    }

    /// Destination table for a stream in bulk-export mode
    pub fn destination_table(&self, stream: &str) -> Result<TableRef> {
        let project = self
            .bq_project
            .clone()
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("bq_project"))?;
        let dataset = self
            .bq_dataset
            .clone()
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("bq_dataset"))?;
        Ok(TableRef::new(project, dataset, stream))
    }

    /// Fetch client settings derived from this config
    pub fn fetch_client_config(&self) -> Result<FetchClientConfig> {
        Ok(FetchClientConfig::builder()
            .base_url(&self.api_url)
            .access_token(self.access_token()?)
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .max_attempts(self.max_attempts)
            .backoff(
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            )
            .rate_limit(RateLimiterConfig::new(
                self.rate_limit_requests,
                Duration::from_secs(self.rate_limit_period_secs),
            ))
            .build())
    }
}
