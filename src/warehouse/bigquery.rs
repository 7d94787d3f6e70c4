//! BigQuery table cleanup
//!
//! Uses the `tables.delete` REST call:
//! `DELETE {api}/projects/{project}/datasets/{dataset}/tables/{table}`.
//! A 404 means the table is already gone.

use super::types::TableRef;
use super::Warehouse;
use crate::auth::{AuthConfig, Authenticator, ServiceAccountKey, BIGQUERY_SCOPE};
use crate::config::TapConfig;
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Environment variable naming a service-account key file
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

const DROP_TIMEOUT: Duration = Duration::from_secs(60);

/// BigQuery REST client limited to dropping tables
#[derive(Debug)]
pub struct BigQueryWarehouse {
    api_url: Url,
    auth: Authenticator,
    client: Client,
}

impl BigQueryWarehouse {
    /// Create a client against `api_url` with the given credentials
    pub fn new(api_url: &str, auth: AuthConfig) -> Result<Self> {
        let api_url = if api_url.ends_with('/') {
            Url::parse(api_url)?
        } else {
            Url::parse(&format!("{api_url}/"))?
        };

        let client = Client::builder()
            .timeout(DROP_TIMEOUT)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            api_url,
            auth: Authenticator::with_client(auth, client.clone()),
            client,
        })
    }

    /// Build from the tap config
    ///
    /// `bq_access_token` wins; otherwise a service-account key is read from
    /// `bq_credentials_path` or `GOOGLE_APPLICATION_CREDENTIALS`.
    pub fn from_config(config: &TapConfig) -> Result<Self> {
        let auth = match config.bq_access_token.clone().none_if_empty() {
            Some(token) => AuthConfig::bearer(token),
            None => {
                let path = config
                    .bq_credentials_path
                    .clone()
                    .or_else(|| std::env::var_os(CREDENTIALS_ENV).map(PathBuf::from))
                    .ok_or_else(|| {
                        Error::auth(format!(
                            "BigQuery credentials missing: set bq_access_token, bq_credentials_path or {CREDENTIALS_ENV}"
                        ))
                    })?;
                let key = ServiceAccountKey::from_file(path)?;
                AuthConfig::service_account(key, vec![BIGQUERY_SCOPE.to_string()])
            }
        };

        Self::new(&config.bq_api_url, auth)
    }

    fn table_url(&self, table: &TableRef) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::warehouse(format!("{} cannot be a base URL", self.api_url)))?
            .pop_if_empty()
            .extend([
                "projects",
                table.project.as_str(),
                "datasets",
                table.dataset.as_str(),
                "tables",
                table.table.as_str(),
            ]);
        Ok(url)
    }
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    async fn drop_table_if_exists(&self, table: &TableRef) -> Result<bool> {
        let url = self.table_url(table)?;
        info!("Dropping BigQuery table {table}");
        info!("DELETE {url}");

        let request = self.auth.apply(self.client.delete(url)).await?;
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            info!("Dropped table {table}");
            return Ok(true);
        }
        if status == StatusCode::NOT_FOUND {
            info!("Table {table} does not exist, nothing to drop");
            return Ok(false);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::warehouse(format!(
            "Failed to drop table {table}: HTTP {}: {body}",
            status.as_u16()
        )))
    }
}
