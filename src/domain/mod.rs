//! Domain Layer - Core types and logic for the GMGN token scanner
//!
//! Pure types and functions with no I/O. All external interactions
//! happen through the ports layer.
//!
//! - `query`: chains, ranking windows, sort criteria and query parameters
//! - `token`: flat token record parsed from a rank item
//! - `filter`: threshold predicates and composable token filters
//! - `format`: one-line console formatters
//! - `rug_risk`: rugcheck report and risk score extraction
//! - `trend`: least-squares trend over daily candles

pub mod query;
pub mod token;
pub mod filter;
pub mod format;
pub mod rug_risk;
pub mod trend;

pub use query::{
    gainers_criteria, gainers_query, losers_query, volume_query, Chain, QueryParameters, SortCriteria,
    SortDirection, TimePeriod,
};
pub use token::{Token, TokenParseError};
pub use filter::{
    CompositeFilter, CriteriaFilter, FilterCriteria, FilterError, ThresholdFilter, TokenFilter, TopNFilter,
};
pub use format::{
    format_all, FormatterKind, GainersFormatter, GeneralFormatter, MarketCapFormatter, RugcheckFormatter,
    SmallCapFormatter, TokenFormatter, VolumeFormatter,
};
pub use rug_risk::{extract_risk_score, RiskItem, RugcheckOutcome, RugcheckReport, RugcheckSummary};
pub use trend::{fit_close_regression, DailyBar, RegressionLine, Trend, TrendError, TrendReport};
