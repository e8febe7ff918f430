//! Tushare Daily Candles
//!
//! POSTs the `daily` API and decodes the column-oriented `fields`/`items` table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::trend::{DailyBar, TRADE_DATE_FORMAT};
use crate::ports::{PriceHistoryError, PriceHistorySource};

pub const DEFAULT_API_URL: &str = "http://api.tushare.pro";

const DAILY_FIELDS: &str = "ts_code,trade_date,open,high,low,close,vol";

#[derive(Debug, Clone, Serialize)]
struct DailyRequest<'a> {
    api_name: &'a str,
    token: &'a str,
    params: DailyParams<'a>,
    fields: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct DailyParams<'a> {
    ts_code: &'a str,
    start_date: String,
    end_date: String,
}

#[derive(Debug, Deserialize)]
struct TushareResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    data: Option<TushareTable>,
}

/// Column names plus row-major values
#[derive(Debug, Default, Deserialize)]
pub struct TushareTable {
    pub fields: Vec<String>,
    pub items: Vec<Vec<Value>>,
}

impl TushareTable {
    fn column(&self, name: &str) -> Result<usize, PriceHistoryError> {
        self.fields
            .iter()
            .position(|f| f == name)
            .ok_or_else(|| PriceHistoryError::Parse(format!("missing column '{}'", name)))
    }

    /// Convert rows into bars; `vol` is the volume column
    pub fn into_bars(self) -> Result<Vec<DailyBar>, PriceHistoryError> {
        let date = self.column("trade_date")?;
        let open = self.column("open")?;
        let high = self.column("high")?;
        let low = self.column("low")?;
        let close = self.column("close")?;
        let vol = self.column("vol")?;

        self.items
            .iter()
            .enumerate()
            .map(|(row, item)| {
                let number = |idx: usize, name: &str| -> Result<f64, PriceHistoryError> {
                    item.get(idx)
                        .and_then(Value::as_f64)
                        .ok_or_else(|| PriceHistoryError::Parse(format!("row {}: '{}' is not a number", row, name)))
                };
                let raw_date = item
                    .get(date)
                    .and_then(Value::as_str)
                    .ok_or_else(|| PriceHistoryError::Parse(format!("row {}: missing trade_date", row)))?;

                Ok(DailyBar {
                    trade_date: parse_trade_date(raw_date)?,
                    open: number(open, "open")?,
                    high: number(high, "high")?,
                    low: number(low, "low")?,
                    close: number(close, "close")?,
                    volume: number(vol, "vol")?,
                })
            })
            .collect()
    }
}

pub fn parse_trade_date(raw: &str) -> Result<NaiveDate, PriceHistoryError> {
    NaiveDate::parse_from_str(raw.trim(), TRADE_DATE_FORMAT)
        .map_err(|e| PriceHistoryError::Parse(format!("invalid trade_date '{}': {}", raw, e)))
}

#[derive(Debug, Clone)]
pub struct TushareConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for TushareConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TushareClient {
    config: TushareConfig,
    http: Client,
}

impl TushareClient {
    pub fn with_config(config: TushareConfig) -> Result<Self, PriceHistoryError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    fn token(&self) -> Result<&str, PriceHistoryError> {
        self.config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(PriceHistoryError::MissingToken)
    }
}

fn decode_response(response: TushareResponse) -> Result<Vec<DailyBar>, PriceHistoryError> {
    if response.code != 0 {
        return Err(PriceHistoryError::Provider {
            code: response.code,
            message: response.msg.unwrap_or_default(),
        });
    }
    response.data.unwrap_or_default().into_bars()
}

#[async_trait]
impl PriceHistorySource for TushareClient {
    async fn daily_bars(
        &self,
        ts_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, PriceHistoryError> {
        let request = DailyRequest {
            api_name: "daily",
            token: self.token()?,
            params: DailyParams {
                ts_code,
                start_date: start.format(TRADE_DATE_FORMAT).to_string(),
                end_date: end.format(TRADE_DATE_FORMAT).to_string(),
            },
            fields: DAILY_FIELDS,
        };

        tracing::info!("Fetching daily bars for {} from {} to {}", ts_code, start, end);
        let response: TushareResponse = self
            .http
            .post(&self.config.api_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let bars = decode_response(response)?;
        tracing::debug!("Received {} bars for {}", bars.len(), ts_code);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> TushareResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_table() {
        let bars = decode_response(response(json!({
            "code": 0,
            "msg": "",
            "data": {
                "fields": ["ts_code", "trade_date", "open", "high", "low", "close", "vol"],
                "items": [
                    ["600004.SH", "20250102", 9.8, 10.1, 9.7, 10.0, 12345.0],
                    ["600004.SH", "20250101", 9.5, 9.9, 9.4, 9.8, 10000]
                ]
            }
        })))
        .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].trade_date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(bars[1].volume, 10_000.0);
    }

    #[test]
    fn test_provider_error_code() {
        let err = decode_response(response(json!({"code": 40101, "msg": "token invalid", "data": null}))).unwrap_err();
        match err {
            PriceHistoryError::Provider { code, message } => {
                assert_eq!(code, 40101);
                assert_eq!(message, "token invalid");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_and_bad_value() {
        let missing = decode_response(response(json!({
            "code": 0,
            "data": {"fields": ["trade_date", "close"], "items": []}
        })));
        assert!(matches!(missing, Err(PriceHistoryError::Parse(_))));

        let bad = decode_response(response(json!({
            "code": 0,
            "data": {
                "fields": ["trade_date", "open", "high", "low", "close", "vol"],
                "items": [["2025-01-01", 1, 1, 1, 1, 1]]
            }
        })));
        assert!(matches!(bad, Err(PriceHistoryError::Parse(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let request = DailyRequest {
            api_name: "daily",
            token: "abc",
            params: DailyParams {
                ts_code: "600004.SH",
                start_date: "20191201".to_string(),
                end_date: "20250701".to_string(),
            },
            fields: DAILY_FIELDS,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["api_name"], "daily");
        assert_eq!(body["params"]["start_date"], "20191201");
        assert_eq!(body["params"]["ts_code"], "600004.SH");
    }

    #[tokio::test]
    async fn test_missing_token() {
        let client = TushareClient::with_config(TushareConfig::default()).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let err = client.daily_bars("600004.SH", day, day).await.unwrap_err();
        assert!(matches!(err, PriceHistoryError::MissingToken));
    }
}
