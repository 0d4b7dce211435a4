//! Article storage and the per-URL term-count side cache.
//!
//! Articles are keyed by URL and shared by every cached search that
//! references them. Term counts live in their own table, appended one row
//! per distinct term ever counted against a URL, so a metadata upsert can
//! never lose previously computed counts.

use super::connection::CacheDb;
use crate::Error;
use crate::filters::Article;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use tracing::debug;

impl CacheDb {
    /// Insert or update an article observed in a search result.
    ///
    /// Uses UPSERT semantics: inserts if the URL is new, overwrites the
    /// metadata fields if it exists. Term counts are untouched.
    pub async fn upsert_article(&self, article: &Article) -> Result<(), Error> {
        let article = article.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO articles (
                        url, source_id, source_name, author, title,
                        description, url_to_image, published_at, content
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(url) DO UPDATE SET
                        source_id = excluded.source_id,
                        source_name = excluded.source_name,
                        author = excluded.author,
                        title = excluded.title,
                        description = excluded.description,
                        url_to_image = excluded.url_to_image,
                        published_at = excluded.published_at,
                        content = excluded.content",
                    params![
                        &article.url,
                        &article.source_id,
                        &article.source_name,
                        &article.author,
                        &article.title,
                        &article.description,
                        &article.url_to_image,
                        &article.published_at,
                        &article.content,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an article by URL.
    ///
    /// Returns None if the URL has never been observed.
    pub async fn get_article(&self, url: &str) -> Result<Option<Article>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Article>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, source_id, source_name, author, title,
                            description, url_to_image, published_at, content
                    FROM articles WHERE url = ?1",
                )?;

                let result = stmt.query_row(params![url], |row| {
                    Ok(Article {
                        url: row.get(0)?,
                        source_id: row.get(1)?,
                        source_name: row.get(2)?,
                        author: row.get(3)?,
                        title: row.get(4)?,
                        description: row.get(5)?,
                        url_to_image: row.get(6)?,
                        published_at: row.get(7)?,
                        content: row.get(8)?,
                    })
                });

                match result {
                    Ok(a) => Ok(Some(a)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Get the memoized occurrence count of `term` on `url`.
    ///
    /// Returns None if this exact term has never been counted for the URL.
    pub async fn get_term_count(&self, url: &str, term: &str) -> Result<Option<i64>, Error> {
        let url_param = url.to_string();
        let term_param = term.to_string();
        let found = self
            .conn
            .call(move |conn| -> Result<Option<i64>, Error> {
                let result = conn.query_row(
                    "SELECT count FROM term_counts WHERE url = ?1 AND term = ?2",
                    params![url_param, term_param],
                    |row| row.get(0),
                );

                match result {
                    Ok(count) => Ok(Some(count)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match found {
            Some(count) => debug!(%url, %term, count, "term count cache hit"),
            None => debug!(%url, %term, "term count cache miss"),
        }
        Ok(found)
    }

    /// Record the occurrence count of `term` on `url`.
    ///
    /// Creates a bare article row if the URL was never observed in a search
    /// (a count can be requested against any URL). Both statements run on
    /// the same connection call; there is no cross-row transaction beyond
    /// that.
    pub async fn put_term_count(&self, url: &str, term: &str, count: i64) -> Result<(), Error> {
        let url = url.to_string();
        let term = term.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("INSERT OR IGNORE INTO articles (url) VALUES (?1)", params![url])?;
                conn.execute(
                    "INSERT INTO term_counts (url, term, count) VALUES (?1, ?2, ?3)
                    ON CONFLICT(url, term) DO UPDATE SET count = excluded.count",
                    params![url, term, count],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_article(url: &str) -> Article {
        Article {
            url: url.to_string(),
            source_id: Some("test-source".into()),
            source_name: Some("Test Source".into()),
            author: Some("Someone".into()),
            title: Some("Title".into()),
            description: Some("Description".into()),
            url_to_image: None,
            published_at: Some("2024-06-01T12:00:00Z".into()),
            content: Some("Body".into()),
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let article = make_article("https://example.com/a");
        db.upsert_article(&article).await.unwrap();

        let retrieved = db.get_article("https://example.com/a").await.unwrap().unwrap();
        assert_eq!(retrieved, article);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_article("https://nowhere").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_overwrites_metadata() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut article = make_article("https://example.com/a");
        db.upsert_article(&article).await.unwrap();

        article.title = Some("Updated title".into());
        db.upsert_article(&article).await.unwrap();

        let retrieved = db.get_article("https://example.com/a").await.unwrap().unwrap();
        assert_eq!(retrieved.title.as_deref(), Some("Updated title"));
    }

    #[tokio::test]
    async fn test_upsert_preserves_term_counts() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let article = make_article("https://example.com/a");
        db.upsert_article(&article).await.unwrap();
        db.put_term_count("https://example.com/a", "election", 4).await.unwrap();

        // re-observing the article must not lose the count
        db.upsert_article(&article).await.unwrap();
        let count = db.get_term_count("https://example.com/a", "election").await.unwrap();
        assert_eq!(count, Some(4));
    }

    #[tokio::test]
    async fn test_term_count_missing_term() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_term_count("https://example.com/a", "election", 4).await.unwrap();

        assert!(db.get_term_count("https://example.com/a", "vote").await.unwrap().is_none());
        assert!(db.get_term_count("https://example.com/b", "election").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_term_count_for_unobserved_url() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_term_count("https://example.com/new", "term", 1).await.unwrap();

        // a bare article row is created as a side effect
        let article = db.get_article("https://example.com/new").await.unwrap().unwrap();
        assert_eq!(article.url, "https://example.com/new");
        assert!(article.title.is_none());
    }
}
