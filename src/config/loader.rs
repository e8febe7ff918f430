//! Configuration Loader
//!
//! Loads and validates the scanner configuration from an optional TOML file.
//! Every section and key has a default, so an empty or absent file is valid.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::gmgn::client::{
    default_user_agents, GmgnClientConfig, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_BASE_URL, DEFAULT_REFERER,
};
use crate::adapters::price_history::tushare::{TushareConfig, DEFAULT_API_URL as TUSHARE_API_URL};
use crate::adapters::rugcheck::{RugcheckConfig, DEFAULT_API_URL as RUGCHECK_API_URL};

/// Default config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gmgn: GmgnSection,
    pub rugcheck: RugcheckSection,
    pub tushare: TushareSection,
    pub logging: LoggingSection,
}

/// GMGN rank API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GmgnSection {
    /// Rank endpoint root
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per request, a session refresh between each
    pub max_retries: u32,
    pub accept_language: String,
    pub referer: String,
    /// Used when a browser identity has no User-Agent template
    pub user_agents: Vec<String>,
}

impl Default for GmgnSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            max_retries: 3,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            user_agents: default_user_agents(),
        }
    }
}

impl GmgnSection {
    /// Get base URL with environment variable override
    /// Checks GMGN_BASE_URL env var first, falls back to config value
    pub fn get_base_url(&self) -> String {
        std::env::var("GMGN_BASE_URL").unwrap_or_else(|_| self.base_url.clone())
    }
}

impl From<&GmgnSection> for GmgnClientConfig {
    fn from(section: &GmgnSection) -> Self {
        Self {
            base_url: section.get_base_url(),
            timeout: Duration::from_secs(section.timeout_secs),
            max_retries: section.max_retries,
            accept_language: section.accept_language.clone(),
            referer: section.referer.clone(),
            user_agents: section.user_agents.clone(),
        }
    }
}

/// Rugcheck API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RugcheckSection {
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for RugcheckSection {
    fn default() -> Self {
        Self {
            api_url: RUGCHECK_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl From<&RugcheckSection> for RugcheckConfig {
    fn from(section: &RugcheckSection) -> Self {
        Self {
            api_url: section.api_url.clone(),
            timeout: Duration::from_secs(section.timeout_secs),
        }
    }
}

/// Tushare price history section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TushareSection {
    pub api_url: String,
    /// Personal API token (prefer TUSHARE_TOKEN in .env)
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TushareSection {
    fn default() -> Self {
        Self {
            api_url: TUSHARE_API_URL.to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl TushareSection {
    /// Get API token with environment variable override
    /// Checks TUSHARE_TOKEN env var first, falls back to config value
    pub fn get_token(&self) -> Option<String> {
        std::env::var("TUSHARE_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.clone())
    }
}

impl From<&TushareSection> for TushareConfig {
    fn from(section: &TushareSection) -> Self {
        Self {
            api_url: section.api_url.clone(),
            token: section.get_token(),
            timeout: Duration::from_secs(section.timeout_secs),
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if given (with `~` expanded), else the default path if it exists, else defaults
pub fn load_or_default(path: Option<&str>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            let expanded = shellexpand::tilde(path).to_string();
            load_config(expanded)
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH),
        None => {
            tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn require_http(name: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must be an http(s) URL, got '{}'",
            name, url
        )))
    }
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate gmgn section
        require_http("gmgn.base_url", &self.gmgn.base_url)?;

        if self.gmgn.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "gmgn.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.gmgn.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "gmgn.max_retries must be > 0".to_string(),
            ));
        }

        // Validate rugcheck section
        require_http("rugcheck.api_url", &self.rugcheck.api_url)?;

        if self.rugcheck.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "rugcheck.timeout_secs must be > 0".to_string(),
            ));
        }

        // Validate tushare section
        require_http("tushare.api_url", &self.tushare.api_url)?;

        if self.tushare.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tushare.timeout_secs must be > 0".to_string(),
            ));
        }

        // Validate logging
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got '{}'",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}
