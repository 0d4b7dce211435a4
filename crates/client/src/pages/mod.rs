//! Article page fetching for term counting.
//!
//! A plain GET with timeout and byte limits. Any failure here is a
//! per-page condition the engine tolerates; it never aborts a whole
//! aggregate.

pub mod text;

pub use text::{count_term, visible_text};

use newsstand_core::AppConfig;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for the page fetch client.
#[derive(Debug, Clone)]
pub struct PageFetchConfig {
    /// User agent string.
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB).
    pub max_bytes: usize,

    /// Request timeout (default: 20s).
    pub timeout: Duration,
}

impl Default for PageFetchConfig {
    fn default() -> Self {
        Self { user_agent: "newsstand/0.1".to_string(), max_bytes: 5 * 1024 * 1024, timeout: Duration::from_millis(20_000) }
    }
}

impl PageFetchConfig {
    /// Derive the fetch configuration from the loaded application config.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), max_bytes: config.max_page_bytes, timeout: config.timeout() }
    }
}

/// Errors from fetching an article page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("response too large: {0} bytes exceeds {1}")]
    TooLarge(usize, usize),

    #[error("request timeout")]
    Timeout,

    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),
}

/// The page-fetch seam the engine talks through.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body as text. Non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> Result<String, PageError>;
}

/// HTTP page fetch client.
pub struct PageClient {
    http: Client,
    config: PageFetchConfig,
}

impl PageClient {
    /// Create a new page client with the given configuration.
    pub fn new(config: PageFetchConfig) -> Result<Self, PageError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| PageError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &PageFetchConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl PageFetcher for PageClient {
    async fn fetch(&self, url_str: &str) -> Result<String, PageError> {
        let start = Instant::now();
        let url = url::Url::parse(url_str).map_err(|e| PageError::InvalidUrl(e.to_string()))?;

        let response = self.http.get(url.clone()).send().await.map_err(
            |e| {
                if e.is_timeout() { PageError::Timeout } else { PageError::Network(Arc::new(e)) }
            },
        )?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::HttpStatus(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(PageError::TooLarge(len as usize, self.config.max_bytes));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PageError::Network(Arc::new(e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(PageError::TooLarge(bytes.len(), self.config.max_bytes));
        }

        tracing::debug!("fetched {} in {:?} ({} bytes)", url, start.elapsed(), bytes.len());

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
