//! News API client (newsapi.org).
//!
//! Provides a client for the upstream search API with rate limiting and
//! response normalization.
//!
//! ### Specification
//!
//! - **Endpoints**: `GET /v2/top-headlines/sources` (publisher listings,
//!   filtered by category/country/language) and `GET /v2/everything`
//!   (article search).
//! - **Authentication**: `Authorization` header carrying the API key.
//! - **Rate Limiting**: the provider is quota-limited; requests are spaced
//!   by a minimum interval.
//! - **Errors**: non-2xx responses carry `code`/`message` fields in the
//!   body, which are passed through verbatim.

pub mod error;
pub mod response;

pub use error::NewsApiError;
pub use response::{ArticlesPage, ArticlesResponse, SourcesResponse};

use newsstand_core::{AppConfig, SearchFilters, SourceFilters, SourceRecord};
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default base URL for the news API.
const DEFAULT_BASE_URL: &str = "https://newsapi.org";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "newsstand/0.1";

/// Minimum interval between upstream requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// News API client configuration.
#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    /// API key sent in the Authorization header.
    pub api_key: String,
    /// Base URL (default: https://newsapi.org).
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl NewsApiConfig {
    /// Derive the client configuration from the loaded application
    /// config, so key/base-url/timeout/user-agent all follow the one
    /// layered source of truth.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NewsApiError> {
        let api_key = config.require_news_api_key().map_err(|_| NewsApiError::MissingApiKey)?.to_string();

        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Rate limiter to enforce request intervals.
#[derive(Debug)]
struct RateLimiter {
    last_request: Mutex<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(Instant::now().checked_sub(min_interval).unwrap_or_else(Instant::now)),
            min_interval,
        }
    }

    /// Acquire permission to make a request, waiting if necessary.
    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.min_interval {
            tokio::time::sleep(self.min_interval - elapsed).await;
        }
        *last = Instant::now();
    }
}

/// The upstream seam the engine talks through, so aggregation and source
/// resolution are testable without a network.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// List publisher sources matching the categorical filters.
    async fn sources(&self, filters: &SourceFilters) -> Result<Vec<SourceRecord>, NewsApiError>;

    /// Fetch one page of articles for the filter set.
    async fn articles(&self, filters: &SearchFilters, page: u32) -> Result<ArticlesPage, NewsApiError>;
}

/// News API client.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    config: NewsApiConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl NewsApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NewsApiConfig) -> Result<Self, NewsApiError> {
        if config.api_key.is_empty() {
            return Err(NewsApiError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| NewsApiError::Network(Arc::new(e)))?;

        Ok(Self { http, config, rate_limiter: Arc::new(RateLimiter::new(MIN_REQUEST_INTERVAL)) })
    }

    /// Create a new client from the loaded application config.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NewsApiError> {
        Self::new(NewsApiConfig::from_app_config(config)?)
    }

    async fn get_json<T, Q>(&self, endpoint: &str, query: &Q) -> Result<T, NewsApiError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        self.rate_limiter.acquire().await;

        let start = Instant::now();
        let url = format!("{}{}", self.config.base_url, endpoint);

        let http_response = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, &self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(
                |e| {
                    if e.is_timeout() { NewsApiError::Timeout } else { NewsApiError::Network(Arc::new(e)) }
                },
            )?;

        let status = http_response.status();
        tracing::debug!("news api {} -> {} in {:?}", endpoint, status, start.elapsed());

        let bytes = http_response
            .bytes()
            .await
            .map_err(|e| NewsApiError::Network(Arc::new(e)))?;

        if !status.is_success() {
            // the provider's error body carries code/message, pass both
            // through verbatim
            let body: response::ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(NewsApiError::Upstream { status: status.as_u16(), code: body.code, message: body.message });
        }

        serde_json::from_slice(&bytes).map_err(|e| NewsApiError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl NewsSource for NewsApiClient {
    async fn sources(&self, filters: &SourceFilters) -> Result<Vec<SourceRecord>, NewsApiError> {
        let response: SourcesResponse = self.get_json("/v2/top-headlines/sources", filters).await?;
        Ok(response.sources)
    }

    async fn articles(&self, filters: &SearchFilters, page: u32) -> Result<ArticlesPage, NewsApiError> {
        let mut filters = filters.clone();
        filters.page = Some(page);

        let response: ArticlesResponse = self.get_json("/v2/everything", &filters).await?;

        tracing::debug!(
            "search page {} for '{}': {} of {} articles",
            page,
            filters.query,
            response.articles.len(),
            response.total_results
        );

        Ok(response.into())
    }
}
