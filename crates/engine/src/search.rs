//! Search resolution.
//!
//! A search runs through normalization, an exact-shape cache probe, and
//! only on a miss the upstream aggregation loop. Full multi-page result
//! sets are written through to the cache; single-page fetches are served
//! without being recorded, since a partial result set under a filter key
//! would later be mistaken for the complete one.

use chrono::Utc;
use newsstand_core::{AppConfig, Article, CacheDb, Error, SearchFilters};
use newsstand_client::{NewsSource, PageFetcher};
use tracing::{debug, info, warn};

use crate::normalize::{self, RawSearchArgs};
use crate::sources::{self, upstream_error};

/// How much of the result set a search should collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Only the first page of results. Served but never cached.
    FirstPage,
    /// Every page, up to the result ceiling. Cached on full success.
    AllPages,
}

/// A resolved search: the articles, the upstream total, and whether the
/// answer came from the cache.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub articles: Vec<Article>,
    pub total_results: u32,
    pub from_cache: bool,
}

/// Resolves searches against the cache and the upstream news API.
pub struct SearchEngine<S, P> {
    db: CacheDb,
    news: S,
    pages: P,
    tolerance_minutes: i64,
    result_ceiling: u32,
    pub preview_limit: usize,
}

impl<S, P> SearchEngine<S, P>
where
    S: NewsSource,
    P: PageFetcher,
{
    pub fn new(db: CacheDb, news: S, pages: P, config: &AppConfig) -> Self {
        Self {
            db,
            news,
            pages,
            tolerance_minutes: config.time_tolerance_minutes,
            result_ceiling: config.result_ceiling,
            preview_limit: config.preview_limit,
        }
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub(crate) fn pages(&self) -> &P {
        &self.pages
    }

    pub(crate) fn tolerance_minutes(&self) -> i64 {
        self.tolerance_minutes
    }

    /// Resolve raw arguments into the canonical filter set, running
    /// source resolution when categorical filters are present.
    pub(crate) async fn resolve_filters(&self, args: &RawSearchArgs) -> Result<SearchFilters, Error> {
        let (mut filters, categorical) = normalize::canonicalize(args, Utc::now())?;

        if let Some(categorical) = categorical {
            let (records, from_cache) = sources::resolve_sources(&self.db, &self.news, &categorical).await?;
            debug!(count = records.len(), from_cache, "resolved sources for categorical filters");
            filters.domains = Some(sources::domains_for(&records).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "no sources match category={:?} country={:?}",
                    categorical.category, categorical.country
                ))
            })?);
        }

        Ok(filters)
    }

    /// Run a search. Cache hits are hydrated from stored articles;
    /// misses go upstream, and in [`FetchMode::AllPages`] a fully
    /// collected result set is written through.
    pub async fn search(&self, args: &RawSearchArgs, mode: FetchMode) -> Result<SearchOutcome, Error> {
        let filters = self.resolve_filters(args).await?;

        if let Some(cached) = self.db.find_search(&filters, self.tolerance_minutes).await? {
            let articles = self.hydrate(&cached.article_urls).await?;
            info!(query = %filters.query, count = articles.len(), "search served from cache");
            return Ok(SearchOutcome { articles, total_results: cached.total_results, from_cache: true });
        }

        let outcome = self.fetch_upstream(&filters, mode).await?;

        if mode == FetchMode::AllPages {
            self.write_through(&filters, &outcome).await;
        }

        Ok(outcome)
    }

    /// Load the stored article rows behind a cached URL list. A URL with
    /// no surviving row is skipped rather than failing the hit.
    async fn hydrate(&self, urls: &[String]) -> Result<Vec<Article>, Error> {
        let mut articles = Vec::with_capacity(urls.len());
        for url in urls {
            match self.db.get_article(url).await? {
                Some(article) => articles.push(article),
                None => warn!(%url, "cached search references a missing article row"),
            }
        }
        Ok(articles)
    }

    /// Pull pages from the upstream API. The ceiling is checked before
    /// anything is written, so an oversized search leaves no partial
    /// cache state behind.
    async fn fetch_upstream(&self, filters: &SearchFilters, mode: FetchMode) -> Result<SearchOutcome, Error> {
        let first = self.news.articles(filters, 1).await.map_err(upstream_error)?;
        let total_results = first.total_results;

        if mode == FetchMode::AllPages && total_results >= self.result_ceiling {
            return Err(Error::TooManyResults { total_results, ceiling: self.result_ceiling });
        }

        let mut articles = first.articles;

        if mode == FetchMode::AllPages {
            let mut page = 2;
            while (articles.len() as u32) < total_results {
                let next = self.news.articles(filters, page).await.map_err(upstream_error)?;
                if next.articles.is_empty() {
                    warn!(page, collected = articles.len(), total_results, "upstream returned an empty page early");
                    break;
                }
                articles.extend(next.articles);
                page += 1;
            }
        }

        info!(query = %filters.query, count = articles.len(), total_results, "search fetched upstream");
        Ok(SearchOutcome { articles, total_results, from_cache: false })
    }

    /// Record a fully collected search. Store failures are logged, not
    /// surfaced; the caller already holds the articles.
    async fn write_through(&self, filters: &SearchFilters, outcome: &SearchOutcome) {
        let mut urls = Vec::with_capacity(outcome.articles.len());
        for article in &outcome.articles {
            if article.url.is_empty() {
                warn!(title = ?article.title, "skipping article without a url");
                continue;
            }
            if let Err(e) = self.db.upsert_article(article).await {
                warn!(url = %article.url, error = %e, "failed to cache article");
                return;
            }
            urls.push(article.url.clone());
        }

        if let Err(e) = self.db.insert_search(filters, outcome.total_results, &urls).await {
            warn!(query = %filters.query, error = %e, "failed to cache search");
        }
    }
}
