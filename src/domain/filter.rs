//! Token Filters
//!
//! Threshold predicates over parsed tokens and the composable
//! `TokenFilter` pipeline (criteria, top-N, composite, per-criterion minimums).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::query::SortCriteria;
use super::token::Token;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("Threshold map cannot be empty")]
    EmptyThresholds,
}

/// Criteria for filtering tokens
///
/// Every threshold that is `Some` must hold, including a threshold of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub min_volume: Option<f64>,
    pub max_volume: Option<f64>,
    pub min_market_cap: Option<f64>,
    pub max_market_cap: Option<f64>,
    pub min_liquidity: Option<f64>,
    pub max_liquidity: Option<f64>,
    pub min_holder_count: Option<u64>,
    /// Applies to the 24h price change
    pub min_price_change: Option<f64>,
    pub max_price_change: Option<f64>,
    /// Minimum pool age in days; tokens without an open timestamp pass
    pub min_age_days: Option<f64>,
    pub exclude_honeypots: bool,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_volume: None,
            max_volume: None,
            min_market_cap: None,
            max_market_cap: None,
            min_liquidity: None,
            max_liquidity: None,
            min_holder_count: None,
            min_price_change: None,
            max_price_change: None,
            min_age_days: None,
            exclude_honeypots: true,
        }
    }
}

impl FilterCriteria {
    /// Small-cap preset: MC < 200K, liquidity < 150K, volume < 300K, at least a day old
    pub fn small_cap() -> Self {
        Self {
            max_market_cap: Some(200_000.0),
            max_liquidity: Some(150_000.0),
            max_volume: Some(300_000.0),
            min_age_days: Some(1.0),
            ..Default::default()
        }
    }

    /// Volume floor only
    pub fn min_volume(min_volume: f64) -> Self {
        Self {
            min_volume: Some(min_volume),
            ..Default::default()
        }
    }

    /// High-value preset
    pub fn high_value(min_volume: f64, min_market_cap: f64) -> Self {
        Self {
            min_volume: Some(min_volume),
            min_market_cap: Some(min_market_cap),
            ..Default::default()
        }
    }

    /// Check if token matches filter criteria at the current time
    pub fn matches(&self, token: &Token) -> bool {
        self.matches_at(token, Utc::now())
    }

    pub fn matches_at(&self, token: &Token, now: DateTime<Utc>) -> bool {
        if self.exclude_honeypots && token.is_honeypot {
            return false;
        }

        let checks = [
            (self.min_volume, token.volume, Bound::Min),
            (self.max_volume, token.volume, Bound::Max),
            (self.min_market_cap, token.market_cap, Bound::Min),
            (self.max_market_cap, token.market_cap, Bound::Max),
            (self.min_liquidity, token.liquidity, Bound::Min),
            (self.max_liquidity, token.liquidity, Bound::Max),
            (self.min_holder_count.map(|n| n as f64), token.holder_count as f64, Bound::Min),
            (self.min_price_change, token.price_change_percent, Bound::Min),
            (self.max_price_change, token.price_change_percent, Bound::Max),
        ];
        if !checks.iter().all(|(limit, value, bound)| bound.holds(*limit, *value)) {
            return false;
        }

        if let (Some(min_age), Some(age)) = (self.min_age_days, token.age_days(now)) {
            if age < min_age {
                return false;
            }
        }

        true
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    fn holds(self, limit: Option<f64>, value: f64) -> bool {
        match (self, limit) {
            (_, None) => true,
            (Bound::Min, Some(min)) => value >= min,
            (Bound::Max, Some(max)) => value <= max,
        }
    }
}

/// A step in a token filtering pipeline
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token>;
}

/// Filter tokens based on `FilterCriteria`
#[derive(Debug, Clone)]
pub struct CriteriaFilter {
    criteria: FilterCriteria,
}

impl CriteriaFilter {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self { criteria }
    }
}

impl TokenFilter for CriteriaFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        let now = Utc::now();
        tokens
            .into_iter()
            .filter(|t| self.criteria.matches_at(t, now))
            .collect()
    }
}

/// Keep only the first N tokens
#[derive(Debug, Clone, Copy)]
pub struct TopNFilter {
    n: usize,
}

impl TopNFilter {
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl TokenFilter for TopNFilter {
    fn filter(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        tokens.truncate(self.n);
        tokens
    }
}

/// Apply filters in sequence
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn TokenFilter>>,
}

impl CompositeFilter {
    pub fn new(filters: Vec<Box<dyn TokenFilter>>) -> Self {
        Self { filters }
    }

    /// Criteria filter followed by top-N
    pub fn criteria_then_top(criteria: FilterCriteria, limit: usize) -> Self {
        Self::new(vec![
            Box::new(CriteriaFilter::new(criteria)),
            Box::new(TopNFilter::new(limit)),
        ])
    }

    pub fn then(mut self, filter: impl TokenFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }
}

impl TokenFilter for CompositeFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        self.filters
            .iter()
            .fold(tokens, |acc, f| f.filter(acc))
    }
}

/// Minimum value per sort criterion
#[derive(Debug, Clone)]
pub struct ThresholdFilter {
    thresholds: Vec<(SortCriteria, f64)>,
}

impl ThresholdFilter {
    pub fn new(thresholds: Vec<(SortCriteria, f64)>) -> Result<Self, FilterError> {
        if thresholds.is_empty() {
            return Err(FilterError::EmptyThresholds);
        }
        for (criteria, _) in &thresholds {
            if criteria.token_metric(&Token::default()).is_none() {
                tracing::warn!("No token field for criteria '{}', threshold ignored", criteria);
            }
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &[(SortCriteria, f64)] {
        &self.thresholds
    }

    pub fn passes(&self, token: &Token) -> bool {
        self.thresholds.iter().all(|(criteria, min)| {
            criteria
                .token_metric(token)
                .map_or(true, |value| value >= *min)
        })
    }
}

impl TokenFilter for ThresholdFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        let total = tokens.len();
        let kept: Vec<Token> = tokens.into_iter().filter(|t| self.passes(t)).collect();
        tracing::info!("Filtered to {} tokens from {} total", kept.len(), total);
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token(symbol: &str, volume: f64, market_cap: f64, liquidity: f64) -> Token {
        Token {
            symbol: symbol.to_string(),
            volume,
            market_cap,
            liquidity,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Token> {
        vec![
            token("AAA", 2_000_000.0, 9_000_000.0, 500_000.0),
            token("BBB", 150_000.0, 180_000.0, 60_000.0),
            token("CCC", 600_000.0, 1_200_000.0, 100_000.0),
            token("DDD", 50.0, 1_000.0, 10.0),
        ]
    }

    fn symbols(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.symbol.as_str()).collect()
    }

    #[test]
    fn test_default_excludes_honeypots_only() {
        let mut tokens = sample();
        tokens[1].is_honeypot = true;

        let kept = CriteriaFilter::new(FilterCriteria::default()).filter(tokens);
        assert_eq!(symbols(&kept), vec!["AAA", "CCC", "DDD"]);
    }

    #[test]
    fn test_honeypots_kept_when_allowed() {
        let mut tokens = sample();
        tokens[1].is_honeypot = true;

        let criteria = FilterCriteria {
            exclude_honeypots: false,
            ..Default::default()
        };
        assert_eq!(CriteriaFilter::new(criteria).filter(tokens).len(), 4);
    }

    #[test]
    fn test_high_value() {
        let kept = CriteriaFilter::new(FilterCriteria::high_value(500_000.0, 1_000_000.0)).filter(sample());
        assert_eq!(symbols(&kept), vec!["AAA", "CCC"]);
    }

    #[test]
    fn test_zero_threshold_is_applied() {
        let mut tokens = sample();
        tokens[0].price_change_percent = 5.0;
        tokens[1].price_change_percent = -2.0;
        tokens[2].price_change_percent = 0.0;
        tokens[3].price_change_percent = -0.1;

        let criteria = FilterCriteria {
            min_price_change: Some(0.0),
            ..Default::default()
        };
        let kept = CriteriaFilter::new(criteria).filter(tokens);
        assert_eq!(symbols(&kept), vec!["AAA", "CCC"]);
    }

    #[test]
    fn test_stricter_threshold_never_grows_result() {
        let loose = FilterCriteria {
            min_volume: Some(100.0),
            ..Default::default()
        };
        let steps = [
            FilterCriteria { min_volume: Some(200_000.0), ..loose.clone() },
            FilterCriteria { max_market_cap: Some(5_000_000.0), ..loose.clone() },
            FilterCriteria { min_liquidity: Some(70_000.0), ..loose.clone() },
            FilterCriteria { min_holder_count: Some(1), ..loose.clone() },
        ];

        let base = CriteriaFilter::new(loose).filter(sample());
        for stricter in steps {
            let narrowed = CriteriaFilter::new(stricter).filter(sample());
            assert!(narrowed.len() <= base.len());
            assert!(narrowed.iter().all(|t| base.contains(t)));
        }
    }

    #[test]
    fn test_small_cap_age() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let criteria = FilterCriteria::small_cap();

        let mut young = token("YNG", 1_000.0, 10_000.0, 5_000.0);
        young.open_timestamp = Some(1_700_000_000 - 3_600);
        let mut old = young.clone();
        old.open_timestamp = Some(1_700_000_000 - 3 * 86_400);
        let unknown = token("UNK", 1_000.0, 10_000.0, 5_000.0);

        assert!(!criteria.matches_at(&young, now));
        assert!(criteria.matches_at(&old, now));
        assert!(criteria.matches_at(&unknown, now));
        assert!(!criteria.matches_at(&sample()[0], now));
    }

    #[test]
    fn test_top_n_is_prefix() {
        let input = sample();
        for n in 0..6 {
            let out = TopNFilter::new(n).filter(input.clone());
            assert!(out.len() <= n);
            assert_eq!(out.as_slice(), &input[..out.len()]);
        }
    }

    #[test]
    fn test_composite_applies_in_order() {
        let composite = CompositeFilter::criteria_then_top(
            FilterCriteria {
                min_volume: Some(100_000.0),
                ..Default::default()
            },
            2,
        );
        assert_eq!(symbols(&composite.filter(sample())), vec!["AAA", "BBB"]);

        let reversed = CompositeFilter::new(vec![Box::new(TopNFilter::new(2))])
            .then(CriteriaFilter::new(FilterCriteria {
                min_volume: Some(500_000.0),
                ..Default::default()
            }));
        assert_eq!(symbols(&reversed.filter(sample())), vec!["AAA"]);
    }

    #[test]
    fn test_threshold_filter() {
        assert_eq!(ThresholdFilter::new(vec![]).unwrap_err(), FilterError::EmptyThresholds);

        let filter = ThresholdFilter::new(vec![
            (SortCriteria::Volume, 500_000.0),
            (SortCriteria::Liquidity, 100_000.0),
        ])
        .unwrap();
        assert_eq!(symbols(&filter.filter(sample())), vec!["AAA", "CCC"]);
    }

    #[test]
    fn test_threshold_without_metric_ignored() {
        let filter = ThresholdFilter::new(vec![(SortCriteria::OpenTimestamp, 1e12)]).unwrap();
        assert_eq!(filter.filter(sample()).len(), 4);
    }
}
