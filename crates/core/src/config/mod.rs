//! Application configuration with layered loading.
//!
//! Loading precedence (highest wins):
//! 1. Environment variables (NEWSSTAND_*)
//! 2. TOML config file (if NEWSSTAND_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// News API key for upstream search/sources calls.
    ///
    /// Set via NEWSSTAND_NEWS_API_KEY. Required only when a request
    /// actually misses the cache.
    #[serde(default)]
    pub news_api_key: Option<String>,

    /// Path to the SQLite cache database.
    ///
    /// Set via NEWSSTAND_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Upstream news API base URL.
    ///
    /// Set via NEWSSTAND_BASE_URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for all HTTP requests.
    ///
    /// Set via NEWSSTAND_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via NEWSSTAND_TIMEOUT_MS.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to read from a scraped article page.
    ///
    /// Set via NEWSSTAND_MAX_PAGE_BYTES.
    #[serde(default = "default_max_page_bytes")]
    pub max_page_bytes: usize,

    /// How far a stored search's time bounds may drift from a probe's,
    /// in minutes, and still count as a cache hit.
    ///
    /// Set via NEWSSTAND_TIME_TOLERANCE_MINUTES.
    #[serde(default = "default_time_tolerance_minutes")]
    pub time_tolerance_minutes: i64,

    /// Maximum aggregate result count; all-pages aggregation beyond this
    /// is abandoned rather than completed.
    ///
    /// Set via NEWSSTAND_RESULT_CEILING.
    #[serde(default = "default_result_ceiling")]
    pub result_ceiling: u32,

    /// How many articles the search envelope includes as a preview.
    ///
    /// Set via NEWSSTAND_PREVIEW_LIMIT.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./newsstand-cache.sqlite")
}

fn default_base_url() -> String {
    "https://newsapi.org".into()
}

fn default_user_agent() -> String {
    "newsstand/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_page_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_time_tolerance_minutes() -> i64 {
    1440
}

fn default_result_ceiling() -> u32 {
    500
}

fn default_preview_limit() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            db_path: default_db_path(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_page_bytes: default_max_page_bytes(),
            time_tolerance_minutes: default_time_tolerance_minutes(),
            result_ceiling: default_result_ceiling(),
            preview_limit: default_preview_limit(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, the environment
    /// cannot be parsed, or validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("NEWSSTAND_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("NEWSSTAND_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that the news API key is available (deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_news_api_key(&self) -> Result<&str, ConfigError> {
        self.news_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "news_api_key".into(),
            hint: "Set NEWSSTAND_NEWS_API_KEY environment variable".into(),
        })
    }
}
