//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - GMGN: rank endpoint client with browser identity rotation
//! - Rugcheck: rugcheck.xyz report client
//! - Price history: Tushare daily candles and local CSV files
//! - CLI: Command-line interface handlers

pub mod gmgn;
pub mod rugcheck;
pub mod price_history;
pub mod cli;

mod http;

pub use gmgn::{GmgnClient, GmgnClientConfig, TokenDataParser};
pub use rugcheck::{RugcheckClient, RugcheckConfig};
pub use price_history::{CsvBarSource, TushareClient, TushareConfig};
pub use cli::CliApp;
