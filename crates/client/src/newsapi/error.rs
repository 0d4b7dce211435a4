//! News API client error types.

use std::sync::Arc;

/// Errors from the news API client.
#[derive(Debug, thiserror::Error)]
pub enum NewsApiError {
    /// No API key in the loaded configuration.
    #[error("missing API key: set NEWSSTAND_NEWS_API_KEY or news_api_key in the config file")]
    MissingApiKey,

    /// The provider returned a non-2xx response; status, code and message
    /// carried verbatim.
    #[error("news api status {status}: {code:?}: {message:?}")]
    Upstream { status: u16, code: Option<String>, message: Option<String> },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for NewsApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { NewsApiError::Timeout } else { NewsApiError::Network(Arc::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NewsApiError::MissingApiKey;
        assert!(err.to_string().contains("API key"));

        let err = NewsApiError::Upstream {
            status: 426,
            code: Some("maximumResultsReached".into()),
            message: Some("You have requested too many results.".into()),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("426"));
        assert!(rendered.contains("maximumResultsReached"));
    }
}
