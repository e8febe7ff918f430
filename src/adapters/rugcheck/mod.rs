//! Rugcheck Adapter
//!
//! HTTP implementation of `RugcheckPort` backed by api.rugcheck.xyz.

pub mod client;

pub use client::{RugcheckClient, RugcheckConfig, DEFAULT_API_URL};
