use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{NewsError, Result};
use crate::domain::NewsResponse;
use crate::upstream::NewsFetch;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const API_KEY_HEADER: &str = "X-Api-Key";

pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent("kiosk/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl NewsFetch for NewsApiClient {
    async fn fetch(&self, path_and_query: &str) -> Result<NewsResponse> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Upstream {
                status: status.as_u16(),
                message: status_message(status.as_u16(), &body),
            });
        }

        let body = response.bytes().await?;
        decode_response(&body)
    }
}

/// Decode a provider payload. Failures are tagged with status 0 and a
/// decoding-specific message, distinct from HTTP-level errors.
fn decode_response(body: &[u8]) -> Result<NewsResponse> {
    serde_json::from_slice(body).map_err(|e| NewsError::Upstream {
        status: 0,
        message: format!("failed to decode provider response: {}", e),
    })
}

fn status_message(status: u16, body: &str) -> String {
    let snippet: String = body.chars().take(200).collect();
    let snippet = snippet.trim();
    if snippet.is_empty() {
        format!("provider returned HTTP {}", status)
    } else {
        format!("provider returned HTTP {}: {}", status, snippet)
    }
}
