//! GMGN Token Scanner Library
//!
//! Token rankings from the GMGN.ai rank endpoint, client-side threshold
//! filters, console formatters and rugcheck.xyz risk scores, plus a
//! linear-regression trend tool over daily stock candles.
//!
//! # Modules
//!
//! - `domain`: Core types and logic (Token, QueryParameters, filters, formatters, risk score, trend)
//! - `ports`: Trait abstractions (RankingSource, RugcheckPort, PriceHistorySource)
//! - `adapters`: External implementations (GMGN, rugcheck, Tushare, CSV, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: TokenApi use cases and the demo run

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
