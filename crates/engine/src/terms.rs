//! Term occurrence counting.
//!
//! Counts how often the search term appears in the visible text of the
//! articles' own web pages. Counts are memoized per (url, term) so a
//! page is fetched at most once for a given term; a page that cannot be
//! fetched is reported as failed instead of poisoning the sum.

use newsstand_client::{NewsSource, PageFetcher};
use newsstand_client::{count_term, visible_text};
use newsstand_core::Error;
use tracing::{debug, warn};

use crate::normalize::RawSearchArgs;
use crate::search::SearchEngine;

/// Outcome of counting a term on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTermCount {
    Counted(i64),
    /// The page could not be fetched. Never memoized, so a later call
    /// retries the fetch.
    Failed,
}

/// Term occurrences summed over a set of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceSum {
    pub total: i64,
    pub failed_pages: usize,
}

impl<S, P> SearchEngine<S, P>
where
    S: NewsSource,
    P: PageFetcher,
{
    /// Count one term on one page, serving a memoized count when the
    /// pair was seen before.
    pub async fn count_on_page(&self, url: &str, term: &str) -> Result<PageTermCount, Error> {
        let term = term.to_lowercase();

        if let Some(count) = self.db().get_term_count(url, &term).await? {
            debug!(%url, %term, count, "term count served from cache");
            return Ok(PageTermCount::Counted(count));
        }

        let html = match self.pages().fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(%url, error = %e, "failed to fetch page for term counting");
                return Ok(PageTermCount::Failed);
            }
        };

        let count = count_term(&visible_text(&html), &term) as i64;
        if let Err(e) = self.db().put_term_count(url, &term, count).await {
            warn!(%url, %term, error = %e, "failed to memoize term count");
        }

        Ok(PageTermCount::Counted(count))
    }

    /// Sum a term's occurrences over a list of pages, tracking how many
    /// pages could not be counted.
    pub async fn sum_occurrences(&self, urls: &[String], term: &str) -> Result<OccurrenceSum, Error> {
        let mut total = 0;
        let mut failed_pages = 0;
        for url in urls {
            match self.count_on_page(url, term).await? {
                PageTermCount::Counted(count) => total += count,
                PageTermCount::Failed => failed_pages += 1,
            }
        }
        Ok(OccurrenceSum { total, failed_pages })
    }

    /// Count the search term across the pages of an already-cached
    /// search. The search must have been resolved (and written through)
    /// first; there is no fallback to the upstream API here.
    pub async fn term_occurrences(&self, args: &RawSearchArgs) -> Result<OccurrenceSum, Error> {
        let filters = self.resolve_filters(args).await?;

        let cached = self
            .db()
            .find_search(&filters, self.tolerance_minutes())
            .await?
            .ok_or_else(|| Error::CacheMiss(format!("no stored article urls for query '{}'", filters.query)))?;

        self.sum_occurrences(&cached.article_urls, &filters.query).await
    }
}
