//! Envelope assembly for the operations the front end calls.
//!
//! Every operation resolves to a [`ResponseEnvelope`], success or
//! failure; engine errors never escape as raw values.

use newsstand_client::{NewsSource, PageFetcher};
use newsstand_core::{CacheDb, ErrorInfo, ErrorSource, ResponseEnvelope};
use serde_json::{Value, json};

use crate::normalize::RawSearchArgs;
use crate::search::{FetchMode, SearchEngine};

fn args_value(args: &RawSearchArgs) -> Value {
    serde_json::to_value(args).unwrap_or_else(|_| Value::Object(Default::default()))
}

fn value_len(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 0,
    }
}

impl<S, P> SearchEngine<S, P>
where
    S: NewsSource,
    P: PageFetcher,
{
    /// Look up a stored enumeration by name.
    pub async fn enum_values(&self, name: &str) -> Result<Option<Value>, newsstand_core::Error> {
        self.db().get_enum_values(name).await
    }

    /// Resolve a search and wrap it in an envelope. The payload carries
    /// the upstream total plus a preview of the first articles; the full
    /// set stays in the cache for follow-up operations.
    pub async fn articles_response(&self, url: &str, args: &RawSearchArgs, mode: FetchMode) -> ResponseEnvelope {
        match self.search(args, mode).await {
            Ok(outcome) => {
                let preview: Vec<_> = outcome.articles.iter().take(self.preview_limit).collect();
                let values = json!({
                    "num_articles": outcome.total_results,
                    "articles": preview,
                });
                ResponseEnvelope::success(url, args_value(args), 2, values)
            }
            Err(err) => ResponseEnvelope::failure(url, args_value(args), ErrorInfo::from(err)),
        }
    }

    /// Count the search term across the cached search's pages and wrap
    /// the sum in an envelope.
    pub async fn term_occurrences_response(&self, url: &str, args: &RawSearchArgs) -> ResponseEnvelope {
        match self.term_occurrences(args).await {
            Ok(sum) => {
                let values = json!({
                    "num_occurrences": sum.total,
                    "failed_pages": sum.failed_pages,
                });
                ResponseEnvelope::success(url, args_value(args), 1, values)
            }
            Err(err) => ResponseEnvelope::failure(url, args_value(args), ErrorInfo::from(err)),
        }
    }
}

/// Look up a stored enumeration (language, country, category choices for
/// the search form) and wrap it in an envelope.
pub async fn enum_response(db: &CacheDb, url: &str, name: &str) -> ResponseEnvelope {
    let empty_args = Value::Object(Default::default());
    match db.get_enum_values(name).await {
        Ok(Some(values)) => {
            let num_results = value_len(&values);
            ResponseEnvelope::success(url, empty_args, num_results, values)
        }
        Ok(None) => ResponseEnvelope::failure(
            url,
            empty_args,
            ErrorInfo {
                error_source: Some(ErrorSource::Internal),
                message: Some(format!("error retrieving {name} values")),
                status_code: Some(404),
            },
        ),
        Err(err) => ResponseEnvelope::failure(url, empty_args, ErrorInfo::from(err)),
    }
}
