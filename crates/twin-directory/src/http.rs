//! HTTP asset directory client
//!
//! Talks to the asset directory REST API:
//! - `GET {base}/assets?source=..&fields=id` lists a source
//! - `GET {base}/assets?id=..&source=..` fetches one asset
//! - `GET {base}/timeseries/{id}?source=..&measurement=..&limit=1` fetches the latest sample

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::directory::AssetDirectory;
use crate::error::DirectoryError;
use crate::record::{scalar_id, AssetRecord, TimeseriesValue};
use crate::DirectoryResult;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Asset directory connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Bearer token (optional for open directories)
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        DirectoryConfig {
            base_url: std::env::var("TWIN_DIRECTORY_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            token: std::env::var("TWIN_DIRECTORY_TOKEN").ok(),
            timeout_secs: std::env::var("TWIN_DIRECTORY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl DirectoryConfig {
    /// Create a config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific directory
    pub fn new(base_url: &str) -> Self {
        DirectoryConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Asset directory backed by the REST API
pub struct HttpAssetDirectory {
    config: DirectoryConfig,
    http_client: reqwest::Client,
}

impl HttpAssetDirectory {
    /// Create a new client
    pub fn new(config: DirectoryConfig) -> DirectoryResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("twin-directory/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DirectoryError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(HttpAssetDirectory {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> DirectoryResult<Self> {
        Self::new(DirectoryConfig::from_env())
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http_client.get(self.config.endpoint(path));
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn list_request(&self, source: &str) -> DirectoryResult<Request> {
        Ok(self
            .get("assets")
            .query(&[("source", source), ("fields", "id")])
            .build()?)
    }

    fn asset_request(&self, id: &str, source: &str) -> DirectoryResult<Request> {
        Ok(self
            .get("assets")
            .query(&[("id", id), ("source", source)])
            .build()?)
    }

    fn timeseries_request(
        &self,
        id: &str,
        source: &str,
        measurement: Option<&str>,
    ) -> DirectoryResult<Request> {
        let mut query = vec![("source", source), ("limit", "1")];
        if let Some(measurement) = measurement {
            query.push(("measurement", measurement));
        }
        Ok(self
            .get(&format!("timeseries/{}", id))
            .query(&query)
            .build()?)
    }

    /// Execute a request and decode a JSON array body.
    ///
    /// Returns `Ok(None)` for 404 so "no such asset" stays a data condition.
    async fn fetch_array<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> DirectoryResult<Option<Vec<T>>> {
        let url = request.url().to_string();
        let response = self.http_client.execute(request).await?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "Directory response");

        match status {
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DirectoryError::Unauthorized {
                status: status.as_u16(),
                url,
            }),
            s if !s.is_success() => Err(DirectoryError::Http {
                status: s.as_u16(),
                url,
            }),
            _ => {
                let bytes = response.bytes().await?;
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
        }
    }
}

#[async_trait]
impl AssetDirectory for HttpAssetDirectory {
    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    async fn list_ids(&self, source: &str) -> DirectoryResult<Vec<String>> {
        let request = self.list_request(source)?;
        let assets: Vec<Value> = self.fetch_array(request).await?.unwrap_or_default();
        Ok(assets
            .iter()
            .filter_map(|asset| asset.get("id").and_then(scalar_id))
            .collect())
    }

    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    async fn get_asset(&self, id: &str, source: &str) -> DirectoryResult<Option<AssetRecord>> {
        let request = self.asset_request(id, source)?;
        let assets: Option<Vec<AssetRecord>> = self.fetch_array(request).await?;
        Ok(assets.and_then(|a| a.into_iter().next()))
    }

    #[instrument(skip(self), fields(base_url = %self.config.base_url))]
    async fn get_latest_timeseries_value(
        &self,
        id: &str,
        source: &str,
        measurement: Option<&str>,
    ) -> DirectoryResult<Option<TimeseriesValue>> {
        let request = self.timeseries_request(id, source, measurement)?;
        let values: Option<Vec<TimeseriesValue>> = self.fetch_array(request).await?;
        Ok(values.and_then(|v| v.into_iter().next()))
    }
}
