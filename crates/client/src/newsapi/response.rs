//! News API response types and normalization.

use newsstand_core::{Article, SourceRecord};
use serde::Deserialize;

/// Raw response from `GET /v2/everything`.
#[derive(Debug, Deserialize)]
pub struct ArticlesResponse {
    #[serde(default, rename = "totalResults")]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<ApiArticle>,
}

/// Raw response from `GET /v2/top-headlines/sources`.
#[derive(Debug, Deserialize)]
pub struct SourcesResponse {
    #[serde(default)]
    pub sources: Vec<SourceRecord>,
}

/// Error body carried by non-2xx provider responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// An article as the provider ships it (nested source object).
#[derive(Debug, Deserialize)]
pub struct ApiArticle {
    #[serde(default)]
    pub source: ApiSourceRef,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSourceRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One normalized page of search results.
#[derive(Debug, Clone)]
pub struct ArticlesPage {
    pub total_results: u32,
    pub articles: Vec<Article>,
}

impl From<ApiArticle> for Article {
    fn from(raw: ApiArticle) -> Self {
        Article {
            url: raw.url,
            source_id: raw.source.id,
            source_name: raw.source.name,
            author: raw.author,
            title: raw.title,
            description: raw.description,
            url_to_image: raw.url_to_image,
            published_at: raw.published_at,
            content: raw.content,
        }
    }
}

impl From<ArticlesResponse> for ArticlesPage {
    fn from(raw: ArticlesResponse) -> Self {
        ArticlesPage {
            total_results: raw.total_results,
            articles: raw.articles.into_iter().map(Article::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_JSON: &str = r#"{
        "status": "ok",
        "totalResults": 2,
        "articles": [
            {
                "source": {"id": "techcrunch", "name": "TechCrunch"},
                "author": "A. Writer",
                "title": "Example headline",
                "description": "Something happened",
                "url": "https://techcrunch.com/a",
                "urlToImage": "https://techcrunch.com/a.jpg",
                "publishedAt": "2024-06-01T12:00:00Z",
                "content": "Body text"
            },
            {
                "source": {"id": null, "name": "Other"},
                "author": null,
                "title": "Second",
                "description": null,
                "url": "https://other.com/b",
                "urlToImage": null,
                "publishedAt": "2024-06-02T08:30:00Z",
                "content": null
            }
        ]
    }"#;

    #[test]
    fn test_deserialize_articles_response() {
        let response: ArticlesResponse = serde_json::from_str(FIXTURE_JSON).unwrap();
        assert_eq!(response.total_results, 2);
        assert_eq!(response.articles.len(), 2);
        assert_eq!(response.articles[0].source.id.as_deref(), Some("techcrunch"));
    }

    #[test]
    fn test_normalize_to_page() {
        let raw: ArticlesResponse = serde_json::from_str(FIXTURE_JSON).unwrap();
        let page: ArticlesPage = raw.into();

        assert_eq!(page.total_results, 2);
        let first = &page.articles[0];
        assert_eq!(first.url, "https://techcrunch.com/a");
        assert_eq!(first.source_name.as_deref(), Some("TechCrunch"));
        assert_eq!(first.published_at.as_deref(), Some("2024-06-01T12:00:00Z"));

        let second = &page.articles[1];
        assert!(second.source_id.is_none());
        assert!(second.author.is_none());
    }

    #[test]
    fn test_empty_results() {
        let json = r#"{"status": "ok", "totalResults": 0, "articles": []}"#;
        let page: ArticlesPage = serde_json::from_str::<ArticlesResponse>(json).unwrap().into();
        assert_eq!(page.total_results, 0);
        assert!(page.articles.is_empty());
    }

    #[test]
    fn test_deserialize_sources_response() {
        let json = r#"{
            "status": "ok",
            "sources": [
                {"id": "techcrunch", "name": "TechCrunch", "url": "https://techcrunch.com",
                 "category": "technology", "language": "en", "country": "us"}
            ]
        }"#;
        let response: SourcesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].url.as_deref(), Some("https://techcrunch.com"));
    }

    #[test]
    fn test_deserialize_error_body() {
        let json = r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid"}"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.code.as_deref(), Some("apiKeyInvalid"));
        assert_eq!(body.message.as_deref(), Some("Your API key is invalid"));
    }
}
