//! Ranking Query Types
//!
//! Typed enumerations for the GMGN rank endpoint path segments and
//! sort parameters, plus the `QueryParameters` builder that turns them
//! into an ordered query string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::token::Token;

/// Supported blockchain chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    #[serde(rename = "eth")]
    Ethereum,
    #[serde(rename = "bsc")]
    BinanceSmartChain,
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "sol")]
    Solana,
    #[serde(rename = "tron")]
    Tron,
}

impl Chain {
    pub const ALL: [Chain; 5] = [
        Chain::Ethereum,
        Chain::BinanceSmartChain,
        Chain::Base,
        Chain::Solana,
        Chain::Tron,
    ];

    /// Path segment used by the rank endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "eth",
            Chain::BinanceSmartChain => "bsc",
            Chain::Base => "base",
            Chain::Solana => "sol",
            Chain::Tron => "tron",
        }
    }
}

/// Supported ranking windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    TwentyFourHours,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 5] = [
        TimePeriod::OneMinute,
        TimePeriod::FiveMinutes,
        TimePeriod::OneHour,
        TimePeriod::SixHours,
        TimePeriod::TwentyFourHours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::OneMinute => "1m",
            TimePeriod::FiveMinutes => "5m",
            TimePeriod::OneHour => "1h",
            TimePeriod::SixHours => "6h",
            TimePeriod::TwentyFourHours => "24h",
        }
    }
}

/// Supported sorting criteria (the `orderby` query parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriteria {
    /// Age
    OpenTimestamp,
    Liquidity,
    Marketcap,
    BluechipOwnerPercentage,
    HolderCount,
    /// Smart money transactions
    Smartmoney,
    Swaps,
    Volume,
    Price,
    Change1m,
    Change5m,
    Change1h,
}

impl SortCriteria {
    pub const ALL: [SortCriteria; 12] = [
        SortCriteria::OpenTimestamp,
        SortCriteria::Liquidity,
        SortCriteria::Marketcap,
        SortCriteria::BluechipOwnerPercentage,
        SortCriteria::HolderCount,
        SortCriteria::Smartmoney,
        SortCriteria::Swaps,
        SortCriteria::Volume,
        SortCriteria::Price,
        SortCriteria::Change1m,
        SortCriteria::Change5m,
        SortCriteria::Change1h,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriteria::OpenTimestamp => "open_timestamp",
            SortCriteria::Liquidity => "liquidity",
            SortCriteria::Marketcap => "marketcap",
            SortCriteria::BluechipOwnerPercentage => "bluechip_owner_percentage",
            SortCriteria::HolderCount => "holder_count",
            SortCriteria::Smartmoney => "smartmoney",
            SortCriteria::Swaps => "swaps",
            SortCriteria::Volume => "volume",
            SortCriteria::Price => "price",
            SortCriteria::Change1m => "change1m",
            SortCriteria::Change5m => "change5m",
            SortCriteria::Change1h => "change1h",
        }
    }

    /// Token field this criterion ranks on, if the record carries it
    pub fn token_metric(&self, token: &Token) -> Option<f64> {
        match self {
            SortCriteria::Volume => Some(token.volume),
            SortCriteria::Marketcap => Some(token.market_cap),
            SortCriteria::Liquidity => Some(token.liquidity),
            SortCriteria::Price => Some(token.price),
            SortCriteria::HolderCount => Some(token.holder_count as f64),
            SortCriteria::Swaps => Some(token.swaps as f64),
            SortCriteria::Smartmoney => Some(token.smart_buy_24h as f64),
            SortCriteria::Change1m => Some(token.price_change_percent1m),
            SortCriteria::Change5m => Some(token.price_change_percent5m),
            SortCriteria::Change1h => Some(token.price_change_percent1h),
            SortCriteria::BluechipOwnerPercentage => Some(token.bluechip_owner_percentage),
            SortCriteria::OpenTimestamp => None,
        }
    }
}

/// Supported sort directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

macro_rules! wire_enum {
    ($ty:ident, $label:literal, [$($variant:ident),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                $(
                    if $ty::$variant.as_str() == wanted {
                        return Ok($ty::$variant);
                    }
                )+
                let valid: Vec<&str> = vec![$($ty::$variant.as_str()),+];
                Err(format!("invalid {} '{}', expected one of: {}", $label, s, valid.join(", ")))
            }
        }
    };
}

wire_enum!(Chain, "chain", [Ethereum, BinanceSmartChain, Base, Solana, Tron]);
wire_enum!(TimePeriod, "time period", [OneMinute, FiveMinutes, OneHour, SixHours, TwentyFourHours]);
wire_enum!(
    SortCriteria,
    "sort criteria",
    [
        OpenTimestamp,
        Liquidity,
        Marketcap,
        BluechipOwnerPercentage,
        HolderCount,
        Smartmoney,
        Swaps,
        Volume,
        Price,
        Change1m,
        Change5m,
        Change1h,
    ]
);
wire_enum!(SortDirection, "sort direction", [Ascending, Descending]);

/// Parameters for a rank endpoint query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub chain: Chain,
    pub time_period: TimePeriod,
    pub criteria: SortCriteria,
    pub direction: SortDirection,
    /// Server-side `not_honeypot` filter
    pub include_not_honeypot: bool,
    /// Server-side `verified` filter
    pub include_verified: bool,
    /// Server-side `renounced` filter
    pub include_renounced: bool,
}

impl QueryParameters {
    /// Descending query with only the honeypot filter enabled
    pub fn new(chain: Chain, time_period: TimePeriod, criteria: SortCriteria) -> Self {
        Self {
            chain,
            time_period,
            criteria,
            direction: SortDirection::Descending,
            include_not_honeypot: true,
            include_verified: false,
            include_renounced: false,
        }
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Enable all three server-side safety filters
    pub fn with_all_safety_filters(mut self) -> Self {
        self.include_not_honeypot = true;
        self.include_verified = true;
        self.include_renounced = true;
        self
    }

    /// Ordered query pairs. `filters[]` repeats once per enabled filter.
    pub fn to_url_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("orderby".to_string(), self.criteria.as_str().to_string()),
            ("direction".to_string(), self.direction.as_str().to_string()),
        ];

        let filters = [
            (self.include_not_honeypot, "not_honeypot"),
            (self.include_verified, "verified"),
            (self.include_renounced, "renounced"),
        ];
        for (enabled, name) in filters {
            if enabled {
                params.push(("filters[]".to_string(), name.to_string()));
            }
        }

        params
    }

    /// `{base}/{chain}/swaps/{period}`
    pub fn rank_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/swaps/{}",
            base_url.trim_end_matches('/'),
            self.chain.as_str(),
            self.time_period.as_str()
        )
    }
}

/// Price-change criterion matching a ranking window
pub fn gainers_criteria(time_period: TimePeriod) -> SortCriteria {
    match time_period {
        TimePeriod::OneMinute => SortCriteria::Change1m,
        TimePeriod::FiveMinutes => SortCriteria::Change5m,
        _ => SortCriteria::Change1h,
    }
}

/// Volume-sorted query
pub fn volume_query(chain: Chain, time_period: TimePeriod) -> QueryParameters {
    QueryParameters::new(chain, time_period, SortCriteria::Volume)
}

/// Price-change sorted query, biggest gainers first
pub fn gainers_query(chain: Chain, time_period: TimePeriod) -> QueryParameters {
    QueryParameters::new(chain, time_period, gainers_criteria(time_period))
}

/// Price-change sorted query, biggest losers first
pub fn losers_query(chain: Chain, time_period: TimePeriod) -> QueryParameters {
    gainers_query(chain, time_period).with_direction(SortDirection::Ascending)
}
