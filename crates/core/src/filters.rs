//! The presence-discriminated filter model and stored record types.
//!
//! A filter set is the cache key for a search: which fields are *present*
//! matters as much as their values. A set with only `query` is a different
//! key than one with `query` and `language`, even when the shared values
//! are identical. Absence is therefore represented explicitly as `None`,
//! never as a default value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter set for a news article search.
///
/// `query` is the one required field; everything else is present or absent.
/// Serializes to the upstream parameter names with absent fields omitted,
/// so the same struct doubles as the upstream request and the stored/echoed
/// argument shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(rename = "q")]
    pub query: String,

    #[serde(rename = "searchIn", skip_serializing_if = "Option::is_none")]
    pub search_in: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<String>,

    #[serde(rename = "excludeDomains", skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<String>,

    #[serde(rename = "from", skip_serializing_if = "Option::is_none")]
    pub from_time: Option<DateTime<Utc>>,

    #[serde(rename = "to", skip_serializing_if = "Option::is_none")]
    pub to_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(rename = "sortBy", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    #[serde(rename = "pageSize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl SearchFilters {
    /// Bare filter set with only the (lower-cased) query term.
    pub fn for_query(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Default::default() }
    }
}

/// Categorical filters keying a cached sources entry.
///
/// Between one and three of these are present; the exact present set is the
/// cache key, with the same presence-discrimination rule as search filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl SourceFilters {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.country.is_none() && self.language.is_none()
    }
}

/// A publisher source record as returned by the upstream sources endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// A stored news article, keyed by URL.
///
/// Metadata fields are merged on every observation from any search result.
/// Term counts are stored separately (see `cache::articles`) so overlapping
/// searches share previously computed counts and a metadata merge can never
/// clobber them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "urlToImage", skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
