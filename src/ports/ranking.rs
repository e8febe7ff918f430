use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// GMGN client error type
#[derive(Error, Debug)]
pub enum GmgnError {
    #[error("API Error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parsing error: {0}")]
    Parsing(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GmgnError {
    /// Status codes GMGN's edge answers with when it blocks a client
    pub const BLOCK_STATUSES: [u16; 3] = [403, 429, 503];

    pub fn cloudflare_block(status: u16) -> Self {
        GmgnError::Api {
            status,
            message: "Cloudflare block detected".to_string(),
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, GmgnError::Api { status, .. } if Self::BLOCK_STATUSES.contains(status))
    }
}

/// Source of raw ranking JSON
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// GET `url` with ordered query pairs and return the decoded JSON body
    async fn fetch_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, GmgnError>;
}
