//! Source resolution.
//!
//! Categorical filters (`category`, `country`) are not understood by the
//! article search endpoint, so they are resolved into a concrete domain
//! list through the source directory, with the directory responses cached
//! under the exact filter combination that produced them.

use newsstand_core::{CacheDb, Error, SourceFilters, SourceRecord};
use newsstand_client::{NewsApiError, NewsSource};
use tracing::{debug, warn};

use crate::normalize::registrable_domain;

pub(crate) fn upstream_error(err: NewsApiError) -> Error {
    match err {
        NewsApiError::Upstream { status, code, message } => Error::Upstream { status, code, message },
        NewsApiError::Timeout => {
            Error::Upstream { status: 504, code: None, message: Some("upstream request timed out".into()) }
        }
        NewsApiError::MissingApiKey => {
            Error::Upstream { status: 500, code: None, message: Some("news api key not configured".into()) }
        }
        NewsApiError::Network(e) => Error::Upstream { status: 502, code: None, message: Some(e.to_string()) },
        NewsApiError::Parse(msg) => Error::Upstream { status: 502, code: None, message: Some(msg) },
    }
}

/// Look up the sources matching a categorical filter set, serving from
/// the cache when the exact combination was seen before. Returns the
/// records and whether they came from the cache.
pub async fn resolve_sources<S>(
    db: &CacheDb,
    client: &S,
    filters: &SourceFilters,
) -> Result<(Vec<SourceRecord>, bool), Error>
where
    S: NewsSource + ?Sized,
{
    if let Some(cached) = db.find_sources(filters).await? {
        debug!(?filters, count = cached.len(), "sources served from cache");
        return Ok((cached, true));
    }

    let records = client.sources(filters).await.map_err(upstream_error)?;

    // a store failure must not fail the request that fetched the data
    if let Err(e) = db.insert_sources(filters, &records).await {
        warn!(error = %e, "failed to cache source records");
    }

    Ok((records, false))
}

/// Comma-joined registrable domains for a source list, deduplicated in
/// first-seen order. `None` when no source yields a usable domain.
pub fn domains_for(records: &[SourceRecord]) -> Option<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        let Some(url) = record.url.as_deref() else { continue };
        let Some(domain) = registrable_domain(url) else { continue };
        if !seen.contains(&domain) {
            seen.push(domain);
        }
    }

    if seen.is_empty() { None } else { Some(seen.join(",")) }
}
