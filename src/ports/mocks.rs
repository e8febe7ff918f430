//! Recording stubs for the port traits, usable from integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use super::price_history::{PriceHistoryError, PriceHistorySource};
use super::ranking::{GmgnError, RankingSource};
use super::rugcheck::{RugcheckError, RugcheckPort};
use crate::domain::rug_risk::RugcheckReport;
use crate::domain::trend::DailyBar;

/// One recorded `fetch_json` call
#[derive(Debug, Clone, PartialEq)]
pub struct RankingCall {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl RankingCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Rank payload in the GMGN envelope
pub fn rank_payload(items: Vec<Value>) -> Value {
    json!({"code": 0, "msg": "success", "data": {"rank": items}})
}

/// Ranking source answering by URL suffix and `orderby` value
#[derive(Debug, Default)]
pub struct StubRankingSource {
    calls: Arc<Mutex<Vec<RankingCall>>>,
    responses: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
    failures: Arc<Mutex<HashMap<String, u16>>>,
}

impl StubRankingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any request whose URL ends with `path` (e.g. `sol/swaps/24h`)
    pub fn with_response(self, path: &str, body: Value) -> Self {
        self.responses.lock().unwrap().push((path.to_string(), None, body));
        self
    }

    /// Answer requests for `path` ordered by `orderby`
    pub fn with_ranking(self, path: &str, orderby: &str, body: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((path.to_string(), Some(orderby.to_string()), body));
        self
    }

    /// Fail requests for `path` with an API error
    pub fn with_failure(self, path: &str, status: u16) -> Self {
        self.failures.lock().unwrap().insert(path.to_string(), status);
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<RankingCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RankingSource for StubRankingSource {
    async fn fetch_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, GmgnError> {
        let call = RankingCall {
            url: url.to_string(),
            params: params.to_vec(),
        };
        self.calls.lock().unwrap().push(call.clone());

        if let Some((_, status)) = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(path, _)| url.ends_with(path.as_str()))
        {
            return Err(GmgnError::cloudflare_block(*status));
        }

        let orderby = call.param("orderby");
        let responses = self.responses.lock().unwrap();
        let exact = responses
            .iter()
            .find(|(path, order, _)| url.ends_with(path.as_str()) && order.is_some() && order.as_deref() == orderby);
        let any = responses
            .iter()
            .find(|(path, order, _)| url.ends_with(path.as_str()) && order.is_none());

        exact
            .or(any)
            .map(|(_, _, body)| body.clone())
            .ok_or_else(|| GmgnError::Api {
                status: 404,
                message: format!("No response configured for {}", url),
            })
    }
}

/// Rugcheck stub keyed by mint
#[derive(Debug, Default)]
pub struct StubRugcheck {
    calls: Arc<Mutex<Vec<String>>>,
    reports: Arc<Mutex<HashMap<String, RugcheckReport>>>,
}

impl StubRugcheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the report for a mint
    pub fn with_report(self, mint: &str, report: RugcheckReport) -> Self {
        self.reports.lock().unwrap().insert(mint.to_string(), report);
        self
    }

    /// Report carrying only a normalised score
    pub fn with_normalised(self, mint: &str, score_normalised: f64) -> Self {
        self.with_report(
            mint,
            RugcheckReport {
                mint: mint.to_string(),
                score_normalised: Some(score_normalised),
                ..Default::default()
            },
        )
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RugcheckPort for StubRugcheck {
    async fn fetch_report(&self, mint: &str) -> Result<RugcheckReport, RugcheckError> {
        self.calls.lock().unwrap().push(mint.to_string());
        self.reports
            .lock()
            .unwrap()
            .get(mint)
            .cloned()
            .ok_or_else(|| RugcheckError::Api {
                status: 404,
                message: "Token not found".to_string(),
            })
    }
}

/// Price history stub returning a fixed series
#[derive(Debug, Default)]
pub struct StubPriceHistory {
    calls: Arc<Mutex<Vec<(String, NaiveDate, NaiveDate)>>>,
    bars: Vec<DailyBar>,
}

impl StubPriceHistory {
    pub fn new(bars: Vec<DailyBar>) -> Self {
        Self {
            calls: Arc::default(),
            bars,
        }
    }

    pub fn get_calls(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceHistorySource for StubPriceHistory {
    async fn daily_bars(
        &self,
        ts_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, PriceHistoryError> {
        self.calls.lock().unwrap().push((ts_code.to_string(), start, end));
        Ok(self
            .bars
            .iter()
            .filter(|b| b.trade_date >= start && b.trade_date <= end)
            .cloned()
            .collect())
    }
}
