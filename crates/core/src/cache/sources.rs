//! Cached upstream sources listings.
//!
//! Keyed by the exact set of categorical filters present, with the same
//! presence-discrimination rule as searches: an entry stored for
//! `{category}` alone must not satisfy a `{category, language}` probe,
//! since the narrower entry holds fewer sources.

use super::connection::CacheDb;
use crate::Error;
use crate::filters::{SourceFilters, SourceRecord};
use chrono::Utc;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use tracing::debug;

impl CacheDb {
    /// Find a stored sources entry whose defined filter set matches
    /// `filters` exactly.
    pub async fn find_sources(&self, filters: &SourceFilters) -> Result<Option<Vec<SourceRecord>>, Error> {
        let category = filters.category.clone();
        let country = filters.country.clone();
        let language = filters.language.clone();

        let found = self
            .conn
            .call(move |conn| -> Result<Option<Vec<SourceRecord>>, Error> {
                let result = conn.query_row(
                    "SELECT sources FROM sources_cache
                    WHERE ((?1 IS NULL AND category IS NULL) OR category = ?1)
                    AND ((?2 IS NULL AND country IS NULL) OR country = ?2)
                    AND ((?3 IS NULL AND language IS NULL) OR language = ?3)
                    ORDER BY id LIMIT 1",
                    params![category, country, language],
                    |row| row.get::<_, String>(0),
                );

                match result {
                    Ok(json) => {
                        let sources: Vec<SourceRecord> =
                            serde_json::from_str(&json).map_err(|e| Error::CorruptEntry(format!("sources: {e}")))?;
                        Ok(Some(sources))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match &found {
            Some(records) => debug!(?filters, count = records.len(), "sources cache hit"),
            None => debug!(?filters, "sources cache miss"),
        }
        Ok(found)
    }

    /// Insert a new sources entry for the given filter shape.
    pub async fn insert_sources(&self, filters: &SourceFilters, sources: &[SourceRecord]) -> Result<(), Error> {
        let category = filters.category.clone();
        let country = filters.country.clone();
        let language = filters.language.clone();
        let json = serde_json::to_string(sources)
            .map_err(|e| Error::InvalidInput(format!("unserializable sources: {e}")))?;
        let fetched_at = Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO sources_cache (category, country, language, sources, fetched_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![category, country, language, json, fetched_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
