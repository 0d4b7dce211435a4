//! Cached search lookup and insertion.
//!
//! The matching rule is the core of the system: a stored search matches a
//! probe only when its *defined field set* equals the probe's exactly.
//! Every present filter must equal the stored value and every absent
//! filter's column must be NULL, so a historical `{query, language}` search
//! is invisible to a probe for `{query}` alone and vice versa. Time bounds
//! are the one exception: when present they match by range within a
//! configurable tolerance instead of equality.

use super::connection::CacheDb;
use crate::Error;
use crate::filters::SearchFilters;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use tracing::debug;

/// A stored search result set: the upstream total plus the ordered article
/// URLs. Article bodies live in the articles table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSearch {
    pub total_results: u32,
    pub article_urls: Vec<String>,
    pub fetched_at: String,
}

/// Fixed-width UTC timestamp formatting so that string comparison in SQL
/// is chronological comparison.
fn fmt_ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `[requested - tolerance, requested + tolerance]` bounds for a time
/// filter, or `(None, None)` when the filter is absent.
fn tolerance_bounds(dt: Option<&DateTime<Utc>>, tolerance_minutes: i64) -> (Option<String>, Option<String>) {
    match dt {
        Some(dt) => {
            let delta = Duration::minutes(tolerance_minutes);
            (Some(fmt_ts(&(*dt - delta))), Some(fmt_ts(&(*dt + delta))))
        }
        None => (None, None),
    }
}

impl CacheDb {
    /// Find a stored search whose defined field set matches `filters`
    /// exactly, with `from`/`to` within `tolerance_minutes` of the probe.
    ///
    /// Returns the first matching row (uniqueness of filter shapes is
    /// assumed, not enforced), or None on a cache miss.
    pub async fn find_search(
        &self, filters: &SearchFilters, tolerance_minutes: i64,
    ) -> Result<Option<CachedSearch>, Error> {
        let query = filters.query.clone();
        let search_in = filters.search_in.clone();
        let sources = filters.sources.clone();
        let domains = filters.domains.clone();
        let exclude_domains = filters.exclude_domains.clone();
        let (from_lo, from_hi) = tolerance_bounds(filters.from_time.as_ref(), tolerance_minutes);
        let (to_lo, to_hi) = tolerance_bounds(filters.to_time.as_ref(), tolerance_minutes);
        let language = filters.language.clone();
        let sort_by = filters.sort_by.clone();
        let page_size = filters.page_size.map(i64::from);
        let page = filters.page.map(i64::from);

        let found = self
            .conn
            .call(move |conn| -> Result<Option<CachedSearch>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT total_results, article_urls, fetched_at FROM searches
                    WHERE query = ?1
                    AND ((?2 IS NULL AND search_in IS NULL) OR search_in = ?2)
                    AND ((?3 IS NULL AND sources IS NULL) OR sources = ?3)
                    AND ((?4 IS NULL AND domains IS NULL) OR domains = ?4)
                    AND ((?5 IS NULL AND exclude_domains IS NULL) OR exclude_domains = ?5)
                    AND ((?6 IS NULL AND from_time IS NULL)
                         OR (from_time >= ?6 AND from_time <= ?7))
                    AND ((?8 IS NULL AND to_time IS NULL)
                         OR (to_time >= ?8 AND to_time <= ?9))
                    AND ((?10 IS NULL AND language IS NULL) OR language = ?10)
                    AND ((?11 IS NULL AND sort_by IS NULL) OR sort_by = ?11)
                    AND ((?12 IS NULL AND page_size IS NULL) OR page_size = ?12)
                    AND ((?13 IS NULL AND page IS NULL) OR page = ?13)
                    ORDER BY id LIMIT 1",
                )?;

                let result = stmt.query_row(
                    params![
                        query,
                        search_in,
                        sources,
                        domains,
                        exclude_domains,
                        from_lo,
                        from_hi,
                        to_lo,
                        to_hi,
                        language,
                        sort_by,
                        page_size,
                        page
                    ],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    },
                );

                match result {
                    Ok((total_results, urls_json, fetched_at)) => {
                        let article_urls: Vec<String> = serde_json::from_str(&urls_json)
                            .map_err(|e| Error::CorruptEntry(format!("article_urls: {e}")))?;
                        Ok(Some(CachedSearch { total_results: total_results as u32, article_urls, fetched_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match &found {
            Some(hit) => {
                debug!(query = %filters.query, total_results = hit.total_results, "search cache hit");
            }
            None => debug!(query = %filters.query, "search cache miss"),
        }
        Ok(found)
    }

    /// Insert a new cached search.
    ///
    /// Always a plain INSERT: a new filter shape gets a new row, existing
    /// rows are never mutated, and duplicates from racing identical misses
    /// are tolerated.
    pub async fn insert_search(
        &self, filters: &SearchFilters, total_results: u32, article_urls: &[String],
    ) -> Result<(), Error> {
        let query = filters.query.clone();
        let search_in = filters.search_in.clone();
        let sources = filters.sources.clone();
        let domains = filters.domains.clone();
        let exclude_domains = filters.exclude_domains.clone();
        let from_time = filters.from_time.as_ref().map(fmt_ts);
        let to_time = filters.to_time.as_ref().map(fmt_ts);
        let language = filters.language.clone();
        let sort_by = filters.sort_by.clone();
        let page_size = filters.page_size.map(i64::from);
        let page = filters.page.map(i64::from);
        let urls_json = serde_json::to_string(article_urls)
            .map_err(|e| Error::InvalidInput(format!("unserializable article urls: {e}")))?;
        let fetched_at = Utc::now().to_rfc3339();
        let total = i64::from(total_results);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO searches (
                        query, search_in, sources, domains, exclude_domains,
                        from_time, to_time, language, sort_by, page_size, page,
                        total_results, article_urls, fetched_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                    params![
                        query,
                        search_in,
                        sources,
                        domains,
                        exclude_domains,
                        from_time,
                        to_time,
                        language,
                        sort_by,
                        page_size,
                        page,
                        total,
                        urls_json,
                        fetched_at
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
