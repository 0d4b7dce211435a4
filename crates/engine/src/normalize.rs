//! Filter normalization.
//!
//! Canonicalizes raw query arguments into the stable filter shape used as
//! the cache key: lower-cased query, absolute UTC time window, and
//! categorical filters split off for source resolution. Normalizing an
//! already-normalized argument set (past dates, lower-cased query) yields
//! the same filter set, so repeat requests land on the same cache entry.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use newsstand_core::{Error, SearchFilters, SourceFilters};
use serde::{Deserialize, Serialize};

/// Default search window when no `from` bound is given.
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Raw search arguments as the front end hands them over: everything a
/// string, times as ISO timestamps that may carry an offset or be naive
/// (naive is read as UTC).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSearchArgs {
    #[serde(default, rename = "q", skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(default, rename = "searchIn", skip_serializing_if = "Option::is_none")]
    pub search_in: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<String>,

    #[serde(default, rename = "excludeDomains", skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<String>,

    #[serde(default, rename = "from", skip_serializing_if = "Option::is_none")]
    pub from_time: Option<String>,

    #[serde(default, rename = "to", skip_serializing_if = "Option::is_none")]
    pub to_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, rename = "sortBy", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    #[serde(default, rename = "pageSize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl RawSearchArgs {
    /// Arguments with only a query term.
    pub fn for_query(query: impl Into<String>) -> Self {
        Self { query: Some(query.into()), ..Default::default() }
    }
}

/// Parse an ISO timestamp that may be offset-aware, naive, or a bare date.
/// Naive inputs are read as UTC.
fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>, Error> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc().fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc().fixed_offset());
    }
    Err(Error::InvalidInput(format!("unparseable timestamp: '{input}'")))
}

/// 00:00:00 of the timestamp's day, in its own offset.
fn floor_to_midnight(dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let midnight = dt.date_naive().and_hms_opt(0, 0, 0).unwrap_or_else(|| dt.naive_local());
    // a fixed offset is never ambiguous
    dt.offset().from_local_datetime(&midnight).single().unwrap_or(dt)
}

/// 23:59:59 of the timestamp's day, in its own offset.
fn ceil_to_day_end(dt: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let day_end = dt.date_naive().and_hms_opt(23, 59, 59).unwrap_or_else(|| dt.naive_local());
    dt.offset().from_local_datetime(&day_end).single().unwrap_or(dt)
}

/// Resolve the `from` bound: default to thirty days back, then floor to
/// the start of the day in the input's own offset, and return as UTC.
pub fn resolve_from(input: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
    let from = match input {
        Some(s) => parse_timestamp(s)?,
        None => (now - Duration::days(DEFAULT_WINDOW_DAYS)).fixed_offset(),
    };
    Ok(floor_to_midnight(from).with_timezone(&Utc))
}

/// Resolve the `to` bound: default to now; a date that is today-or-later
/// in its own offset becomes "now" (same-day searches capture the most
/// recent articles), anything earlier is ceiled to the end of its day.
/// Returned as UTC.
pub fn resolve_to(input: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>, Error> {
    let Some(s) = input else {
        return Ok(now);
    };

    let to = parse_timestamp(s)?;
    let now_local = now.with_timezone(to.offset());
    let resolved = if to.date_naive() >= now_local.date_naive() { now_local } else { ceil_to_day_end(to) };
    Ok(resolved.with_timezone(&Utc))
}

/// Canonicalize raw arguments into a filter set plus the categorical
/// filters that still need source resolution.
///
/// The returned `SearchFilters` never contains `category`/`country`; when
/// either was present the second return value carries them for the source
/// resolver, whose domain list then lands in `filters.domains`. `language`
/// is natively supported by the articles endpoint and stays in the filter
/// set.
pub fn canonicalize(args: &RawSearchArgs, now: DateTime<Utc>) -> Result<(SearchFilters, Option<SourceFilters>), Error> {
    let query = args
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| Error::InvalidInput("invalid parameters provided: missing parameter 'q'".into()))?;

    let filters = SearchFilters {
        query: query.to_lowercase(),
        search_in: args.search_in.clone(),
        sources: args.sources.clone(),
        domains: args.domains.clone(),
        exclude_domains: args.exclude_domains.clone(),
        from_time: Some(resolve_from(args.from_time.as_deref(), now)?),
        to_time: Some(resolve_to(args.to_time.as_deref(), now)?),
        language: args.language.clone(),
        sort_by: args.sort_by.clone(),
        page_size: args.page_size,
        page: args.page,
    };

    let categorical = SourceFilters { category: args.category.clone(), country: args.country.clone(), language: None };
    let categorical = if categorical.is_empty() { None } else { Some(categorical) };

    Ok((filters, categorical))
}

/// Extract the registrable domain (`example.com`) from a full source URL
/// by dropping subdomains and paths.
pub fn registrable_domain(source_url: &str) -> Option<String> {
    let parsed = url::Url::parse(source_url).ok()?;
    let host = parsed.host_str()?;
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() >= 2 {
        Some(labels[labels.len() - 2..].join("."))
    } else {
        Some(host.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 45).unwrap()
    }

    #[test]
    fn test_from_defaults_to_thirty_days_back() {
        let from = resolve_from(None, fixed_now()).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 5, 16, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_from_floored_to_midnight_utc() {
        let from = resolve_from(Some("2024-06-01T15:42:07Z"), fixed_now()).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_from_floored_in_own_offset() {
        // midnight at -05:00 is 05:00 UTC
        let from = resolve_from(Some("2024-06-01T15:42:07-05:00"), fixed_now()).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 6, 1, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_from_naive_read_as_utc() {
        let from = resolve_from(Some("2024-06-01T15:42:07"), fixed_now()).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_from_bare_date() {
        let from = resolve_from(Some("2024-06-01"), fixed_now()).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_from_invalid() {
        assert!(resolve_from(Some("junk"), fixed_now()).is_err());
    }

    #[test]
    fn test_to_defaults_to_now() {
        let to = resolve_to(None, fixed_now()).unwrap();
        assert_eq!(to, fixed_now());
    }

    #[test]
    fn test_to_past_date_ceiled_to_day_end() {
        let to = resolve_to(Some("2024-06-01T09:00:00Z"), fixed_now()).unwrap();
        assert_eq!(to, Utc.with_ymd_and_hms(2024, 6, 1, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_to_past_date_ceiled_in_own_offset() {
        // 23:59:59 at +02:00 is 21:59:59 UTC
        let to = resolve_to(Some("2024-06-01T09:00:00+02:00"), fixed_now()).unwrap();
        assert_eq!(to, Utc.with_ymd_and_hms(2024, 6, 1, 21, 59, 59).unwrap());
    }

    #[test]
    fn test_to_today_becomes_now() {
        let to = resolve_to(Some("2024-06-15T01:00:00Z"), fixed_now()).unwrap();
        assert_eq!(to, fixed_now());
    }

    #[test]
    fn test_to_future_date_becomes_now() {
        let to = resolve_to(Some("2024-07-01T00:00:00Z"), fixed_now()).unwrap();
        assert_eq!(to, fixed_now());
    }

    #[test]
    fn test_canonicalize_lowercases_query() {
        let args = RawSearchArgs::for_query("BREAKING News");
        let (filters, _) = canonicalize(&args, fixed_now()).unwrap();
        assert_eq!(filters.query, "breaking news");
    }

    #[test]
    fn test_canonicalize_requires_query() {
        let args = RawSearchArgs::default();
        assert!(canonicalize(&args, fixed_now()).is_err());

        let args = RawSearchArgs::for_query("   ");
        assert!(canonicalize(&args, fixed_now()).is_err());
    }

    #[test]
    fn test_canonicalize_splits_categorical_filters() {
        let args = RawSearchArgs {
            category: Some("technology".into()),
            language: Some("en".into()),
            ..RawSearchArgs::for_query("rust")
        };
        let (filters, categorical) = canonicalize(&args, fixed_now()).unwrap();

        // category/country leave the filter set; language stays, since the
        // articles endpoint supports it natively
        let categorical = categorical.unwrap();
        assert_eq!(categorical.category.as_deref(), Some("technology"));
        assert!(categorical.language.is_none());
        assert_eq!(filters.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_canonicalize_without_categorical_filters() {
        let args = RawSearchArgs::for_query("rust");
        let (_, categorical) = canonicalize(&args, fixed_now()).unwrap();
        assert!(categorical.is_none());
    }

    #[test]
    fn test_canonicalize_idempotent_for_resolved_args() {
        // already-resolved args: lower-cased query, past dates
        let args = RawSearchArgs {
            from_time: Some("2024-06-01T00:00:00+00:00".into()),
            to_time: Some("2024-06-10T23:59:59+00:00".into()),
            ..RawSearchArgs::for_query("election")
        };
        let (first, _) = canonicalize(&args, fixed_now()).unwrap();

        let again = RawSearchArgs {
            query: Some(first.query.clone()),
            from_time: first.from_time.map(|t| t.to_rfc3339()),
            to_time: first.to_time.map(|t| t.to_rfc3339()),
            ..Default::default()
        };
        let (second, _) = canonicalize(&again, fixed_now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_to_resolution_is_stable_within_a_day() {
        // flooring/ceiling twice lands on the same instants
        let from = resolve_from(Some("2024-06-01T00:00:00Z"), fixed_now()).unwrap();
        assert_eq!(from.hour(), 0);
        let again = resolve_from(Some(&from.to_rfc3339()), fixed_now()).unwrap();
        assert_eq!(from, again);
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("https://techcrunch.com/a/b").as_deref(), Some("techcrunch.com"));
        assert_eq!(registrable_domain("https://www.news.example.com/x").as_deref(), Some("example.com"));
        assert_eq!(registrable_domain("http://localhost").as_deref(), Some("localhost"));
        assert_eq!(registrable_domain("not a url"), None);
    }
}
