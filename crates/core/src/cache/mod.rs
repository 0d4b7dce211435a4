//! SQLite-backed persistent cache for searches, articles and sources.
//!
//! This module provides a read-through/write-through cache over the one
//! query shape the system serves, with async access via tokio-rusqlite.
//! It supports:
//!
//! - Exact-shape (presence-discriminated) lookup of cached searches
//! - Per-URL article storage shared across overlapping searches
//! - Per-URL, per-term memoized occurrence counts
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//!
//! There is no eviction: entries are created on first fetch and never
//! deleted.

pub mod articles;
pub mod connection;
pub mod enums;
pub mod migrations;
pub mod searches;
pub mod sources;

pub use crate::Error;

pub use connection::CacheDb;
pub use searches::CachedSearch;
