//! Datadog On-Call REST API (v2) as the schedule provider and user directory.

mod schedule;
mod user;
mod wire;

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use rollcall_ports::error::PortError;

use crate::http;

const API_KEY_HEADER: &str = "DD-API-KEY";
const APP_KEY_HEADER: &str = "DD-APPLICATION-KEY";

#[derive(Debug, Clone)]
pub struct DatadogConfig {
    pub api_key: String,
    pub app_key: String,
    /// e.g. `datadoghq.eu`; requests go to `https://api.<site>`.
    pub site: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct DatadogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    app_key: String,
}

impl DatadogClient {
    pub fn new(config: &DatadogConfig) -> Result<Self, PortError> {
        Self::with_base_url(config, format!("https://api.{}", config.site))
    }

    pub fn with_base_url(
        config: &DatadogConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, PortError> {
        Ok(Self {
            http: http::client(config.timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            app_key: config.app_key.clone(),
        })
    }

    /// Checks the API key against `/api/v1/validate`.
    pub async fn validate(&self) -> Result<(), PortError> {
        let _: serde_json::Value = self.get_json("/api/v1/validate", &[]).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, PortError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Datadog request");

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(APP_KEY_HEADER, &self.app_key)
            .query(query)
            .send()
            .await
            .map_err(http::transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PortError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Api(format!("{status}: {body}")));
        }

        response.json::<T>().await.map_err(http::transport_error)
    }
}
