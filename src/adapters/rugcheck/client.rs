//! Rugcheck Client
//!
//! Fetches token risk reports from the rugcheck.xyz public API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::adapters::http::error_body;
use crate::domain::rug_risk::RugcheckReport;
use crate::ports::{RugcheckError, RugcheckPort};

pub const DEFAULT_API_URL: &str = "https://api.rugcheck.xyz/v1";

/// Configuration for the RugcheckClient
#[derive(Debug, Clone)]
pub struct RugcheckConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for RugcheckConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RugcheckConfig {
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct RugcheckClient {
    config: RugcheckConfig,
    http: Client,
}

impl RugcheckClient {
    pub fn new() -> Result<Self, RugcheckError> {
        Self::with_config(RugcheckConfig::default())
    }

    pub fn with_config(config: RugcheckConfig) -> Result<Self, RugcheckError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// `{api_url}/tokens/{mint}/report`
    pub fn report_url(&self, mint: &str) -> Result<String, RugcheckError> {
        let mint = mint.trim();
        if mint.is_empty() || !mint.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RugcheckError::InvalidAddress(mint.to_string()));
        }
        Ok(format!(
            "{}/tokens/{}/report",
            self.config.api_url.trim_end_matches('/'),
            mint
        ))
    }
}

#[async_trait]
impl RugcheckPort for RugcheckClient {
    async fn fetch_report(&self, mint: &str) -> Result<RugcheckReport, RugcheckError> {
        let url = self.report_url(mint)?;
        tracing::debug!("Fetching rugcheck report: {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = error_body(response).await;
            return Err(RugcheckError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<RugcheckReport>()
            .await
            .map_err(|e| RugcheckError::Parse(e.to_string()))
    }
}
