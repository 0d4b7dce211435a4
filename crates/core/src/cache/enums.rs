//! Filter vocabulary storage.
//!
//! The front end builds its language/country/category controls from these
//! stored value lists.

use super::connection::CacheDb;
use crate::Error;
use serde_json::Value;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl CacheDb {
    /// Get the stored values for a named vocabulary (e.g. "language").
    pub async fn get_enum_values(&self, name: &str) -> Result<Option<Value>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Value>, Error> {
                let result = conn.query_row("SELECT vals FROM enums WHERE name = ?1", params![name], |row| {
                    row.get::<_, String>(0)
                });

                match result {
                    Ok(json) => {
                        let values =
                            serde_json::from_str(&json).map_err(|e| Error::CorruptEntry(format!("enums: {e}")))?;
                        Ok(Some(values))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace a named vocabulary.
    pub async fn put_enum_values(&self, name: &str, values: &Value) -> Result<(), Error> {
        let name = name.to_string();
        let json = values.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO enums (name, vals) VALUES (?1, ?2)
                    ON CONFLICT(name) DO UPDATE SET vals = excluded.vals",
                    params![name, json],
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
    use serde_json::json;

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let values = json!(["business", "technology", "sports"]);
        db.put_enum_values("category", &values).await.unwrap();

        let retrieved = db.get_enum_values("category").await.unwrap().unwrap();
        assert_eq!(retrieved, values);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_enum_values("country").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_enum_values("language", &json!(["en"])).await.unwrap();
        db.put_enum_values("language", &json!(["en", "es"])).await.unwrap();

        let retrieved = db.get_enum_values("language").await.unwrap().unwrap();
        assert_eq!(retrieved, json!(["en", "es"]));
    }
}
