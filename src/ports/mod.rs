//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - GMGN ranking JSON (`RankingSource`)
//! - Rugcheck reports (`RugcheckPort`)
//! - Daily price history for the trend tool (`PriceHistorySource`)

pub mod ranking;
pub mod rugcheck;
pub mod price_history;
pub mod mocks;

// Re-export main traits and types
pub use ranking::{GmgnError, RankingSource};
pub use rugcheck::{RugcheckError, RugcheckPort};
pub use price_history::{PriceHistoryError, PriceHistorySource};
