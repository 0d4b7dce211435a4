//! The query-to-cache resolution engine.
//!
//! Answers "find news articles/sources matching filter set F" by first
//! consulting the persistent cache and, on miss, querying the upstream
//! search API and back-filling the cache. Also maintains the per-URL
//! term-occurrence side cache shared across overlapping searches.

pub mod normalize;
pub mod respond;
pub mod search;
pub mod sources;
pub mod terms;

#[cfg(test)]
mod testing;

pub use normalize::RawSearchArgs;
pub use respond::enum_response;
pub use search::{FetchMode, SearchEngine, SearchOutcome};
pub use terms::{OccurrenceSum, PageTermCount};
