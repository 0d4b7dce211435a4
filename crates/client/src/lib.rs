//! Client code for newsstand.
//!
//! This crate provides the upstream news API client and the article page
//! fetch/scan pipeline consumed by the resolution engine.

pub mod newsapi;
pub mod pages;

pub use newsapi::{ArticlesPage, NewsApiClient, NewsApiConfig, NewsApiError, NewsSource};
pub use pages::{PageClient, PageError, PageFetchConfig, PageFetcher, count_term, visible_text};
