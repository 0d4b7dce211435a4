//! The JSON response envelope populated by the resolution engine.
//!
//! Every response from the HTTP surface (owned by the front end, which is
//! not part of this workspace) is one of these objects. The engine fills
//! them in; the front end only serializes and ships them.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which side of the system boundary a failure originated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    /// Validation or store failure inside this system.
    Internal,
    /// The upstream news API failed or refused the request.
    External,
}

/// Error block of the envelope. Empty (all `None`) on success.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_source: Option<ErrorSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Echo of the inbound request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    pub url: String,
    pub args: Value,
    pub timestamp: String,
}

/// Result block: a count plus the operation-specific payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsInfo {
    pub num_results: usize,
    pub values: Value,
}

/// The full response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub request: RequestInfo,
    pub succeeded: bool,
    pub results: ResultsInfo,
    pub dev_logs: Vec<String>,
    pub errors: ErrorInfo,
}

impl ResponseEnvelope {
    /// Successful envelope with the given result payload.
    pub fn success(url: &str, args: Value, num_results: usize, values: Value) -> Self {
        Self {
            request: RequestInfo { url: url.to_string(), args, timestamp: Utc::now().to_rfc3339() },
            succeeded: true,
            results: ResultsInfo { num_results, values },
            dev_logs: Vec::new(),
            errors: ErrorInfo::default(),
        }
    }

    /// Failed envelope carrying the given error block.
    pub fn failure(url: &str, args: Value, errors: ErrorInfo) -> Self {
        Self {
            request: RequestInfo { url: url.to_string(), args, timestamp: Utc::now().to_rfc3339() },
            succeeded: false,
            results: ResultsInfo { num_results: 0, values: Value::Object(Default::default()) },
            dev_logs: Vec::new(),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let env = ResponseEnvelope::success(
            "http://localhost/internal/get-articles",
            json!({"q": "election"}),
            2,
            json!({"num_articles": 3, "articles": []}),
        );
        assert!(env.succeeded);
        assert_eq!(env.results.num_results, 2);
        assert!(env.errors.error_source.is_none());

        let serialized = serde_json::to_value(&env).unwrap();
        assert_eq!(serialized["request"]["args"]["q"], "election");
        // error block serializes empty on success
        assert_eq!(serialized["errors"], json!({}));
    }

    #[test]
    fn test_failure_envelope_shape() {
        let errors = ErrorInfo {
            error_source: Some(ErrorSource::External),
            message: Some("boom".into()),
            status_code: Some(426),
        };
        let env = ResponseEnvelope::failure("http://localhost/x", json!({}), errors);
        assert!(!env.succeeded);
        assert_eq!(env.results.num_results, 0);

        let serialized = serde_json::to_value(&env).unwrap();
        assert_eq!(serialized["errors"]["error_source"], "external");
        assert_eq!(serialized["errors"]["status_code"], 426);
    }
}
