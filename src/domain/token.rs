//! Token Record
//!
//! Flat token record built from one item of the rank response. Missing
//! keys take defaults; values of the wrong shape reject the whole item.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while building a token from a raw item
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TokenParseError {
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("Field '{field}' has unexpected value {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Structured token data model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Token {
    /// Rank record id, absent on some items
    pub id: Option<i64>,
    pub chain: String,
    pub address: String,
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub liquidity: f64,
    pub market_cap: f64,
    pub holder_count: u64,
    pub swaps: u64,
    /// 24h price change
    pub price_change_percent: f64,
    pub price_change_percent1m: f64,
    pub price_change_percent5m: f64,
    pub price_change_percent1h: f64,
    pub smart_buy_24h: u64,
    pub smart_sell_24h: u64,
    pub is_honeypot: bool,
    pub is_open_source: bool,
    pub renounced: bool,
    pub bluechip_owner_percentage: f64,
    pub logo: Option<String>,
    pub buy_tax: Option<String>,
    pub sell_tax: Option<String>,
    pub total_supply: Option<f64>,
    pub buys: Option<u64>,
    pub sells: Option<u64>,
    pub sniper_count: Option<u64>,
    pub lock_info: Option<Value>,
    /// Pool open time (unix seconds)
    pub open_timestamp: Option<i64>,
}

impl Token {
    /// Create a token from a raw API item
    pub fn from_value(value: &Value) -> Result<Self, TokenParseError> {
        let map = value
            .as_object()
            .ok_or_else(|| TokenParseError::NotAnObject(json_kind(value).to_string()))?;

        Ok(Self {
            id: opt(map, "id", parse_int)?,
            chain: string_field(map, "chain"),
            address: string_field(map, "address"),
            symbol: string_field(map, "symbol"),
            price: float_field(map, "price")?,
            volume: float_field(map, "volume")?,
            liquidity: float_field(map, "liquidity")?,
            market_cap: float_field(map, "market_cap")?,
            holder_count: count_field(map, "holder_count")?,
            swaps: count_field(map, "swaps")?,
            price_change_percent: float_field(map, "price_change_percent")?,
            price_change_percent1m: float_field(map, "price_change_percent1m")?,
            price_change_percent5m: float_field(map, "price_change_percent5m")?,
            price_change_percent1h: float_field(map, "price_change_percent1h")?,
            smart_buy_24h: count_field(map, "smart_buy_24h")?,
            smart_sell_24h: count_field(map, "smart_sell_24h")?,
            is_honeypot: flag_field(map, "is_honeypot")?,
            is_open_source: flag_field(map, "is_open_source")?,
            renounced: flag_field(map, "renounced")?,
            bluechip_owner_percentage: float_field(map, "bluechip_owner_percentage")?,
            logo: opt_string_field(map, "logo"),
            buy_tax: opt_string_field(map, "buy_tax"),
            sell_tax: opt_string_field(map, "sell_tax"),
            total_supply: opt(map, "total_supply", parse_float)?,
            buys: opt(map, "buys", parse_count)?,
            sells: opt(map, "sells", parse_count)?,
            sniper_count: opt(map, "sniper_count", parse_count)?,
            lock_info: map.get("lockInfo").filter(|v| !v.is_null()).cloned(),
            open_timestamp: opt(map, "open_timestamp", parse_int)?,
        })
    }

    /// Pool open time, if the record carries one
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.open_timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    /// Age in fractional days at `now`
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<f64> {
        self.opened_at()
            .map(|opened| (now - opened).num_seconds() as f64 / 86_400.0)
    }
}

/// JSON type name used in parse error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid(field: &'static str, value: &Value) -> TokenParseError {
    TokenParseError::InvalidField {
        field,
        value: value.to_string(),
    }
}

/// Present and not `null`
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn parse_float(field: &'static str, value: &Value) -> Result<f64, TokenParseError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid(field, value)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid(field, value)),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        _ => Err(invalid(field, value)),
    }
}

fn parse_int(field: &'static str, value: &Value) -> Result<i64, TokenParseError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Ok(f.trunc() as i64),
                _ => Err(invalid(field, value)),
            }
        }
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid(field, value)),
        Value::Bool(b) => Ok(*b as i64),
        _ => Err(invalid(field, value)),
    }
}

fn parse_count(field: &'static str, value: &Value) -> Result<u64, TokenParseError> {
    let n = parse_int(field, value)?;
    u64::try_from(n).map_err(|_| invalid(field, value))
}

fn float_field(map: &Map<String, Value>, field: &'static str) -> Result<f64, TokenParseError> {
    present(map, field).map_or(Ok(0.0), |v| parse_float(field, v))
}

fn count_field(map: &Map<String, Value>, field: &'static str) -> Result<u64, TokenParseError> {
    present(map, field).map_or(Ok(0), |v| parse_count(field, v))
}

fn flag_field(map: &Map<String, Value>, field: &'static str) -> Result<bool, TokenParseError> {
    present(map, field).map_or(Ok(false), |v| parse_int(field, v).map(|n| n != 0))
}

fn opt<T>(
    map: &Map<String, Value>,
    field: &'static str,
    parse: fn(&'static str, &Value) -> Result<T, TokenParseError>,
) -> Result<Option<T>, TokenParseError> {
    present(map, field).map(|v| parse(field, v)).transpose()
}

fn string_field(map: &Map<String, Value>, field: &str) -> String {
    opt_string_field(map, field).unwrap_or_default()
}

fn opt_string_field(map: &Map<String, Value>, field: &str) -> Option<String> {
    present(map, field).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_item() {
        let item = json!({
            "id": 42,
            "chain": "sol",
            "address": "So1Addr",
            "symbol": "BONK",
            "price": 0.0000231,
            "volume": "1250000.5",
            "liquidity": 80000,
            "market_cap": 1_500_000.0,
            "holder_count": 1234,
            "swaps": 5000,
            "price_change_percent": 12.5,
            "price_change_percent1h": -3.25,
            "smart_buy_24h": 3,
            "is_honeypot": 0,
            "is_open_source": 1,
            "renounced": true,
            "buy_tax": 0.05,
            "lockInfo": {"isLock": true},
            "open_timestamp": 1_700_000_000
        });

        let token = Token::from_value(&item).unwrap();
        assert_eq!(token.id, Some(42));
        assert_eq!(token.symbol, "BONK");
        assert_eq!(token.volume, 1_250_000.5);
        assert_eq!(token.liquidity, 80_000.0);
        assert_eq!(token.holder_count, 1234);
        assert!(!token.is_honeypot);
        assert!(token.is_open_source);
        assert!(token.renounced);
        assert_eq!(token.buy_tax.as_deref(), Some("0.05"));
        assert!(token.lock_info.is_some());
        assert_eq!(token.open_timestamp, Some(1_700_000_000));
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let token = Token::from_value(&json!({"symbol": "NEW"})).unwrap();
        assert_eq!(token.symbol, "NEW");
        assert!(token.id.is_none());
        assert_eq!(token.price, 0.0);
        assert_eq!(token.holder_count, 0);
        assert!(!token.is_honeypot);
        assert!(token.logo.is_none());
        assert!(token.open_timestamp.is_none());
    }

    #[test]
    fn test_null_treated_as_missing() {
        let token = Token::from_value(&json!({"price": null, "is_honeypot": null, "buys": null})).unwrap();
        assert_eq!(token.price, 0.0);
        assert!(!token.is_honeypot);
        assert!(token.buys.is_none());
    }

    #[test]
    fn test_float_counts_truncate() {
        let token = Token::from_value(&json!({"holder_count": 12.9, "swaps": "7"})).unwrap();
        assert_eq!(token.holder_count, 12);
        assert_eq!(token.swaps, 7);
    }

    #[test]
    fn test_malformed_values_rejected() {
        let err = Token::from_value(&json!({"price": "not-a-number"})).unwrap_err();
        assert!(matches!(err, TokenParseError::InvalidField { field: "price", .. }));

        assert!(Token::from_value(&json!({"volume": {"usd": 1}})).is_err());
        assert!(Token::from_value(&json!({"holder_count": -5})).is_err());
        assert!(Token::from_value(&json!({"swaps": "1.5"})).is_err());
    }

    #[test]
    fn test_not_an_object() {
        let err = Token::from_value(&json!([1, 2])).unwrap_err();
        assert_eq!(err, TokenParseError::NotAnObject("array".to_string()));
    }

    #[test]
    fn test_age_days() {
        let now = Utc.timestamp_opt(1_700_000_000 + 2 * 86_400, 0).unwrap();
        let token = Token {
            open_timestamp: Some(1_700_000_000),
            ..Default::default()
        };
        assert_eq!(token.age_days(now), Some(2.0));
        assert_eq!(Token::default().age_days(now), None);
    }
}
