use async_trait::async_trait;
use thiserror::Error;

use crate::domain::rug_risk::RugcheckReport;

/// Rugcheck lookup error type
#[derive(Error, Debug)]
pub enum RugcheckError {
    #[error("Rugcheck API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode rugcheck report: {0}")]
    Parse(String),

    #[error("Invalid token address: {0}")]
    InvalidAddress(String),
}

/// Third-party rug risk lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RugcheckPort: Send + Sync {
    async fn fetch_report(&self, mint: &str) -> Result<RugcheckReport, RugcheckError>;
}
