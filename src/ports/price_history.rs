use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::trend::DailyBar;

/// Price history error type
#[derive(Error, Debug)]
pub enum PriceHistoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned code {code}: {message}")]
    Provider { code: i64, message: String },

    #[error("Data parsing error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing API token: set [tushare] token or TUSHARE_TOKEN")]
    MissingToken,
}

/// Daily candles for a ticker
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    /// Bars between `start` and `end` inclusive, in provider order
    async fn daily_bars(
        &self,
        ts_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, PriceHistoryError>;
}
