//! Query orchestration: canonicalize the filters, consult the cache, fetch
//! upstream on a miss.
//!
//! Every public operation follows the same shape. The built path-and-query
//! string is the cache key, so provider-ignored parameters (countries when
//! sources are set, categories on search) never split one logical query
//! into several entries. Errors from the query builder and the upstream
//! client pass through unchanged; the operation name only appears in logs.

use std::sync::Arc;

use tracing::debug;

use crate::app::Result;
use crate::cache::{CacheKey, NewsCache};
use crate::domain::{FilterSet, NewsResponse, UserId};
use crate::prefs::PreferenceResolver;
use crate::query;
use crate::upstream::NewsFetch;

pub struct NewsEngine {
    fetch: Arc<dyn NewsFetch + Send + Sync>,
    cache: Arc<NewsCache>,
    prefs: Arc<dyn PreferenceResolver + Send + Sync>,
}

impl NewsEngine {
    pub fn new(
        fetch: Arc<dyn NewsFetch + Send + Sync>,
        cache: Arc<NewsCache>,
        prefs: Arc<dyn PreferenceResolver + Send + Sync>,
    ) -> Self {
        Self {
            fetch,
            cache,
            prefs,
        }
    }

    /// Headlines for the user's saved filters, falling back to the
    /// unfiltered default when the user has no preference record.
    ///
    /// Delegates to [`top_headlines`](Self::top_headlines), so a user feed
    /// and an equivalent explicit query share one cache entry.
    pub async fn news_for_user(&self, user: &UserId) -> Result<Arc<NewsResponse>> {
        let filter = match self.prefs.resolve(user).await {
            Some(filter) => filter,
            None => {
                debug!(user = user.as_str(), "no preference record, using default");
                FilterSet::new()
            }
        };
        self.top_headlines(&filter).await
    }

    pub async fn top_headlines(&self, filter: &FilterSet) -> Result<Arc<NewsResponse>> {
        let query = query::top_headlines(filter);
        self.resolve("top_headlines", query).await
    }

    /// Keyword search. Fails with `InvalidArgument` before any upstream
    /// involvement when the keyword is empty; category and country filters
    /// are accepted for symmetry but have no effect on this endpoint.
    pub async fn search(&self, keyword: &str, filter: &FilterSet) -> Result<Arc<NewsResponse>> {
        let filter = filter.clone().with_keyword(keyword);
        let query = query::search(&filter)?;
        self.resolve("search", query).await
    }

    pub async fn all_sources(&self) -> Result<Arc<NewsResponse>> {
        self.resolve("sources", query::SOURCES_PATH.to_string()).await
    }

    async fn resolve(&self, operation: &'static str, query: String) -> Result<Arc<NewsResponse>> {
        let key = CacheKey::from(query);
        let fetch = Arc::clone(&self.fetch);
        let path = key.as_str().to_string();

        let result = self
            .cache
            .get_or_fetch(&key, || {
                let fetch = Arc::clone(&fetch);
                let path = path.clone();
                async move { fetch.fetch(&path).await }
            })
            .await;

        match &result {
            Ok(response) => debug!(
                operation,
                key = key.as_str(),
                articles = response.articles.len(),
                "query resolved"
            ),
            Err(e) => debug!(operation, key = key.as_str(), error = %e, "query failed"),
        }
        result
    }
}
