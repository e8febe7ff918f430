//! GMGN HTTP Client
//!
//! Browser-disguised session against the GMGN rank endpoint. Every failed
//! attempt swaps the browser identity and rebuilds the connection pool and
//! cookie jar before the next one.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;

use super::identity::BrowserIdentity;
use crate::adapters::http::error_body;
use crate::ports::{GmgnError, RankingSource};

pub const DEFAULT_BASE_URL: &str = "https://gmgn.ai/defi/quotation/v1/rank";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const DEFAULT_REFERER: &str = "https://gmgn.ai/?chain=sol";

/// User agents used when an identity has no agent template
pub fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:82.0) Gecko/20100101 Firefox/82.0".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
    ]
}

/// Configuration for the GmgnClient
#[derive(Debug, Clone)]
pub struct GmgnClientConfig {
    /// Rank endpoint root, `{base}/{chain}/swaps/{period}` is appended
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Total attempts per request
    pub max_retries: u32,
    pub accept_language: String,
    pub referer: String,
    pub user_agents: Vec<String>,
}

impl Default for GmgnClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            user_agents: default_user_agents(),
        }
    }
}

impl GmgnClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Identity plus the HTTP client carrying its headers
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: BrowserIdentity,
    http: Client,
}

impl Session {
    pub fn new(config: &GmgnClientConfig) -> Result<Self, GmgnError> {
        let identity = BrowserIdentity::random(&mut rand::thread_rng(), &config.user_agents);
        tracing::debug!("Using browser identifier: {}", identity.identifier);

        let headers = identity.headers(&config.accept_language, &config.referer)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .build()?;

        tracing::debug!("Session initialized with User-Agent: {}", identity.user_agent);
        Ok(Self { identity, http })
    }
}

/// Run `attempt` up to `max_attempts` times, awaiting `refresh` between
/// failures. The last error is returned unchanged.
pub async fn retry_with_refresh<T, A, AF, R, RF>(
    max_attempts: u32,
    mut attempt: A,
    mut refresh: R,
) -> Result<T, GmgnError>
where
    A: FnMut(u32) -> AF,
    AF: Future<Output = Result<T, GmgnError>>,
    R: FnMut() -> RF,
    RF: Future<Output = ()>,
{
    let attempts = max_attempts.max(1);
    let mut last_error = None;

    for n in 1..=attempts {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if n < attempts {
                    tracing::warn!("Attempt {} failed: {}", n, e);
                    refresh().await;
                } else {
                    tracing::error!("All {} attempts failed", attempts);
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| GmgnError::InvalidRequest("no attempt was made".to_string())))
}

/// HTTP client for the GMGN rank API
#[derive(Debug)]
pub struct GmgnClient {
    config: GmgnClientConfig,
    session: Mutex<Session>,
    refreshes: AtomicU32,
}

impl GmgnClient {
    /// Create a new GmgnClient with default configuration
    pub fn new() -> Result<Self, GmgnError> {
        Self::with_config(GmgnClientConfig::default())
    }

    /// Create a new GmgnClient with custom configuration
    pub fn with_config(config: GmgnClientConfig) -> Result<Self, GmgnError> {
        if config.max_retries == 0 {
            return Err(GmgnError::Config("max_retries must be at least 1".to_string()));
        }
        let session = Session::new(&config)?;
        Ok(Self {
            config,
            session: Mutex::new(session),
            refreshes: AtomicU32::new(0),
        })
    }

    pub fn config(&self) -> &GmgnClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Identity of the current session
    pub async fn identity(&self) -> BrowserIdentity {
        self.session.lock().await.identity.clone()
    }

    /// Number of sessions rebuilt since construction
    pub fn refresh_count(&self) -> u32 {
        self.refreshes.load(Ordering::Relaxed)
    }

    /// Replace the session with a freshly randomized one
    pub async fn refresh_session(&self) -> Result<(), GmgnError> {
        tracing::info!("Refreshing session...");
        let fresh = Session::new(&self.config)?;
        *self.session.lock().await = fresh;
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// GET with retry; each failure before the last triggers a session refresh
    pub async fn make_request(&self, url: &str, params: &[(String, String)]) -> Result<Value, GmgnError> {
        retry_with_refresh(
            self.config.max_retries,
            |n| {
                tracing::debug!("Attempt {}: {} with params {:?}", n, url, params);
                self.fetch_once(url, params)
            },
            || async move {
                if let Err(e) = self.refresh_session().await {
                    tracing::warn!("Session refresh failed, keeping previous session: {}", e);
                }
            },
        )
        .await
    }

    async fn fetch_once(&self, url: &str, params: &[(String, String)]) -> Result<Value, GmgnError> {
        let http = self.session.lock().await.http.clone();
        let response = http.get(url).query(params).send().await?;
        let status = response.status();

        if status == StatusCode::OK {
            return response
                .json::<Value>()
                .await
                .map_err(|e| GmgnError::Parsing(format!("Invalid JSON body: {}", e)));
        }

        let code = status.as_u16();
        if GmgnError::BLOCK_STATUSES.contains(&code) {
            return Err(GmgnError::cloudflare_block(code));
        }

        let body = error_body(response).await;
        Err(GmgnError::Api { status: code, message: body })
    }
}

#[async_trait]
impl RankingSource for GmgnClient {
    async fn fetch_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, GmgnError> {
        self.make_request(url, params).await
    }
}
