pub mod client;

pub use client::NewsApiClient;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::NewsResponse;

/// Seam between the engine and the provider. Tests substitute scripted
/// implementations for the HTTP client.
#[async_trait]
pub trait NewsFetch {
    /// Issue one GET for a built path-and-query such as
    /// `/top-headlines?country=us` and decode the response.
    async fn fetch(&self, path_and_query: &str) -> Result<NewsResponse>;
}
