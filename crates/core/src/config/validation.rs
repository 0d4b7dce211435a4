//! Configuration validation rules.
//!
//! Validation logic for `AppConfig` values after they have been loaded
//! from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_page_bytes` is 0 or exceeds 50MB
    /// - `time_tolerance_minutes` is negative
    /// - `result_ceiling` is 0
    /// - `user_agent` or `base_url` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_page_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_page_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.max_page_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid {
                field: "max_page_bytes".into(),
                reason: "must not exceed 50MB".into(),
            });
        }

        if self.time_tolerance_minutes < 0 {
            return Err(ConfigError::Invalid {
                field: "time_tolerance_minutes".into(),
                reason: "must not be negative".into(),
            });
        }

        if self.result_ceiling == 0 {
            return Err(ConfigError::Invalid {
                field: "result_ceiling".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid { field: "base_url".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }
}
