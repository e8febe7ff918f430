//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, GmgnSection, LoggingSection, RugcheckSection, TushareSection, load_config,
    load_or_default, DEFAULT_CONFIG_PATH,
};
