//! In-process stand-ins for the news API and page fetcher, with call
//! counters so tests can assert how often the network would have been
//! touched.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use newsstand_client::{ArticlesPage, NewsApiError, NewsSource, PageError, PageFetcher};
use newsstand_core::{Article, SearchFilters, SourceFilters, SourceRecord};

/// News API stand-in serving canned pages.
#[derive(Default)]
pub struct StubNews {
    total_results: u32,
    pages: Vec<Vec<Article>>,
    source_records: Vec<SourceRecord>,
    failure: Option<(u16, String)>,
    article_calls: AtomicUsize,
    source_calls: AtomicUsize,
    last_filters: Mutex<Option<SearchFilters>>,
}

impl StubNews {
    /// A single page of results, returned for every page number.
    pub fn with_articles(total_results: u32, articles: Vec<Article>) -> Self {
        Self { total_results, pages: vec![articles], ..Default::default() }
    }

    /// Distinct pages, served by page number; pages beyond the list are
    /// empty.
    pub fn with_pages(total_results: u32, pages: Vec<Vec<Article>>) -> Self {
        Self { total_results, pages, ..Default::default() }
    }

    /// Every article request fails with this upstream status and code.
    pub fn failing(status: u16, code: &str) -> Self {
        Self { failure: Some((status, code.to_string())), ..Default::default() }
    }

    pub fn with_sources(mut self, records: Vec<SourceRecord>) -> Self {
        self.source_records = records;
        self
    }

    pub fn article_calls(&self) -> usize {
        self.article_calls.load(Ordering::SeqCst)
    }

    pub fn source_calls(&self) -> usize {
        self.source_calls.load(Ordering::SeqCst)
    }

    /// The filter set of the most recent article request.
    pub fn last_filters(&self) -> Option<SearchFilters> {
        self.last_filters.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl NewsSource for StubNews {
    async fn sources(&self, _filters: &SourceFilters) -> Result<Vec<SourceRecord>, NewsApiError> {
        self.source_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.source_records.clone())
    }

    async fn articles(&self, filters: &SearchFilters, page: u32) -> Result<ArticlesPage, NewsApiError> {
        self.article_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_filters.lock() {
            *guard = Some(filters.clone());
        }

        if let Some((status, code)) = &self.failure {
            return Err(NewsApiError::Upstream {
                status: *status,
                code: Some(code.clone()),
                message: Some("stubbed failure".into()),
            });
        }

        let articles = if self.pages.len() == 1 {
            self.pages[0].clone()
        } else {
            self.pages.get(page.saturating_sub(1) as usize).cloned().unwrap_or_default()
        };
        Ok(ArticlesPage { total_results: self.total_results, articles })
    }
}

/// Page fetcher stand-in serving canned bodies; unknown URLs fail like a
/// dead link.
#[derive(Default)]
pub struct StubPages {
    bodies: HashMap<String, String>,
    fetch_calls: AtomicUsize,
}

impl StubPages {
    pub fn with_page(url: &str, body: &str) -> Self {
        Self::default().page(url, body)
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StubPages {
    async fn fetch(&self, url: &str) -> Result<String, PageError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.get(url).cloned().ok_or(PageError::HttpStatus(404))
    }
}
