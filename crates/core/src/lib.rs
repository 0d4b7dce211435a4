//! Core types and shared functionality for newsstand.
//!
//! This crate provides:
//! - The SQLite-backed search/article/source cache
//! - The presence-discriminated filter model
//! - Unified error types and the JSON response envelope
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod filters;

pub use cache::CacheDb;
pub use cache::searches::CachedSearch;
pub use config::AppConfig;
pub use envelope::{ErrorInfo, ErrorSource, ResponseEnvelope};
pub use error::Error;
pub use filters::{Article, SearchFilters, SourceFilters, SourceRecord};
