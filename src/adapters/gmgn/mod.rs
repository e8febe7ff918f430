//! GMGN Rank API Adapter
//!
//! - `identity`: random browser identifiers, User-Agents and headers
//! - `client`: session-holding HTTP client with refresh-on-failure retry
//! - `parser`: rank envelope to `Token` conversion

pub mod identity;
pub mod client;
pub mod parser;

pub use identity::{BrowserFamily, BrowserIdentity, Platform, BROWSER_IDENTIFIERS};
pub use client::{retry_with_refresh, GmgnClient, GmgnClientConfig, Session, DEFAULT_BASE_URL};
pub use parser::TokenDataParser;
