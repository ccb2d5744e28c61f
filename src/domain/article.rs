use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decoded provider payload. Immutable once constructed; cached copies are
/// shared snapshots and are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    #[serde(default)]
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "urlToImage", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_provider_payload() {
        let payload = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {
                    "source": {"id": "bbc-news", "name": "BBC News"},
                    "author": "Jane Roe",
                    "title": "Quantum breakthrough",
                    "description": "A new record",
                    "url": "https://example.com/quantum",
                    "urlToImage": "https://example.com/quantum.jpg",
                    "publishedAt": "2024-03-01T08:30:00Z",
                    "content": "Full text..."
                },
                {
                    "title": "Markets rally",
                    "url": "https://example.com/markets"
                }
            ]
        }"#;

        let response: NewsResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.status, "ok");
        assert_eq!(response.total_results, 2);
        assert_eq!(response.articles.len(), 2);

        let first = &response.articles[0];
        assert_eq!(first.title, "Quantum breakthrough");
        assert_eq!(first.image_url.as_deref(), Some("https://example.com/quantum.jpg"));
        assert_eq!(first.author.as_deref(), Some("Jane Roe"));
        assert!(first.published_at.is_some());

        let second = &response.articles[1];
        assert_eq!(second.description, None);
        assert_eq!(second.image_url, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let response: NewsResponse = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
        assert_eq!(response.total_results, 0);
        assert!(response.articles.is_empty());
    }

    #[test]
    fn test_display_title_falls_back_when_empty() {
        let article: Article = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert_eq!(article.display_title(), "(Untitled)");
    }
}
