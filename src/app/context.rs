use std::sync::Arc;
use std::time::Duration;

use crate::app::error::{NewsError, Result};
use crate::cache::NewsCache;
use crate::config::Config;
use crate::domain::UserId;
use crate::engine::NewsEngine;
use crate::prefs::{InMemoryPreferences, PreferenceResolver};
use crate::upstream::{NewsApiClient, NewsFetch};

pub struct AppContext {
    pub cache: Arc<NewsCache>,
    pub fetch: Arc<dyn NewsFetch + Send + Sync>,
    pub prefs: Arc<dyn PreferenceResolver + Send + Sync>,
    pub engine: Arc<NewsEngine>,
}

impl AppContext {
    /// Wire the real provider client and the config-seeded preference
    /// store.
    pub fn new(config: &Config) -> Result<Self> {
        if config.upstream.api_key.is_empty() {
            return Err(NewsError::Config(
                "no API key configured; set upstream.api_key or NEWSAPI_KEY".to_string(),
            ));
        }

        let fetch: Arc<dyn NewsFetch + Send + Sync> = Arc::new(NewsApiClient::new(
            &config.upstream.base_url,
            &config.upstream.api_key,
            Duration::from_secs(config.upstream.timeout_secs),
        ));

        let prefs: Arc<dyn PreferenceResolver + Send + Sync> = Arc::new(
            config
                .preference_sets()
                .map(|(user, filter)| (UserId::from(user), filter))
                .collect::<InMemoryPreferences>(),
        );

        Ok(Self::with_parts(fetch, prefs))
    }

    /// Assemble from explicit parts; tests and demos inject mocks here.
    pub fn with_parts(
        fetch: Arc<dyn NewsFetch + Send + Sync>,
        prefs: Arc<dyn PreferenceResolver + Send + Sync>,
    ) -> Self {
        let cache = Arc::new(NewsCache::new());
        let engine = Arc::new(NewsEngine::new(fetch.clone(), cache.clone(), prefs.clone()));

        Self {
            cache,
            fetch,
            prefs,
            engine,
        }
    }
}
