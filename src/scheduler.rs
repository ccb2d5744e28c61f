//! Background refresh for the response cache.
//!
//! Drives two periodic tasks: an hourly warm refresh that clears the cache
//! and repopulates a fixed set of popular queries, and a ten-minute
//! reachability probe. Every per-item failure is logged and skipped; the
//! scheduler itself never stops on an upstream error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Notify;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheKey, NewsCache};
use crate::domain::FilterSet;
use crate::engine::NewsEngine;
use crate::query;

/// Categories repopulated on every warm pass.
pub const WARM_CATEGORIES: [&str; 5] = ["technology", "business", "science", "health", "sports"];

/// Countries repopulated on every warm pass.
pub const WARM_COUNTRIES: [&str; 4] = ["us", "gb", "ca", "au"];

/// Country used for the reachability probe.
pub const PROBE_COUNTRY: &str = "us";

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between full clear-and-repopulate passes (default: 3600 = 1 hour)
    pub warm_interval_secs: u64,
    /// Seconds between reachability probes (default: 600 = 10 minutes)
    pub probe_interval_secs: u64,
    /// Whether to run a warm pass immediately on start
    pub warm_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            warm_interval_secs: 3600, // 1 hour
            probe_interval_secs: 600, // 10 minutes
            warm_on_start: true,
        }
    }
}

impl SchedulerConfig {
    /// Parse interval string like "1h", "30m", "6h", "1d"
    pub fn parse_interval(s: &str) -> Result<u64, String> {
        let s = s.trim().to_lowercase();

        if let Some(hours) = s.strip_suffix('h') {
            hours
                .parse::<u64>()
                .map(|h| h * 3600)
                .map_err(|_| format!("Invalid hours: {}", hours))
        } else if let Some(minutes) = s.strip_suffix('m') {
            minutes
                .parse::<u64>()
                .map(|m| m * 60)
                .map_err(|_| format!("Invalid minutes: {}", minutes))
        } else if let Some(days) = s.strip_suffix('d') {
            days.parse::<u64>()
                .map(|d| d * 86400)
                .map_err(|_| format!("Invalid days: {}", days))
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map_err(|_| format!("Invalid seconds: {}", secs))
        } else {
            // Try parsing as raw seconds
            s.parse::<u64>()
                .map_err(|_| format!("Invalid interval: {}. Use format like '1h', '30m', '1d'", s))
        }
    }

    /// Format interval for display
    pub fn format_interval(secs: u64) -> String {
        if secs >= 86400 && secs.is_multiple_of(86400) {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs.is_multiple_of(3600) {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs.is_multiple_of(60) {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}

/// Scheduler runner
pub struct RefreshScheduler {
    engine: Arc<NewsEngine>,
    cache: Arc<NewsCache>,
    config: SchedulerConfig,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl RefreshScheduler {
    pub fn new(engine: Arc<NewsEngine>, cache: Arc<NewsCache>, config: SchedulerConfig) -> Self {
        Self {
            engine,
            cache,
            config,
            running: Arc::new(AtomicBool::new(true)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Run both periodic tasks until a shutdown signal arrives.
    pub async fn run(&self) {
        let running = self.running.clone();
        let shutdown = self.shutdown.clone();

        #[cfg(unix)]
        {
            let running = running.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                let mut sigterm =
                    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                        .expect("Failed to set up SIGTERM handler");
                let mut sigint =
                    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
                        .expect("Failed to set up SIGINT handler");

                tokio::select! {
                    _ = sigterm.recv() => {},
                    _ = sigint.recv() => {},
                }
                running.store(false, Ordering::SeqCst);
                shutdown.notify_one();
            });
        }

        #[cfg(windows)]
        {
            let running = running.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                running.store(false, Ordering::SeqCst);
                shutdown.notify_one();
            });
        }

        info!(
            warm_interval = %SchedulerConfig::format_interval(self.config.warm_interval_secs),
            probe_interval = %SchedulerConfig::format_interval(self.config.probe_interval_secs),
            "refresh scheduler started"
        );

        if self.config.warm_on_start {
            self.warm_refresh().await;
        }

        let mut warm_timer = interval(Duration::from_secs(self.config.warm_interval_secs));
        let mut probe_timer = interval(Duration::from_secs(self.config.probe_interval_secs));
        // Skip the first immediate tick of each timer
        warm_timer.tick().await;
        probe_timer.tick().await;

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = warm_timer.tick() => self.warm_refresh().await,
                _ = probe_timer.tick() => self.probe().await,
                _ = self.shutdown.notified() => break,
            }
        }

        info!("refresh scheduler stopped");
    }

    /// One warm pass: clear everything, then repopulate the popular
    /// queries. Each item failure is logged and skipped so the pass always
    /// runs to the end.
    pub async fn warm_refresh(&self) {
        let start = Utc::now();
        self.cache.clear();

        let mut refreshed = 0usize;
        let mut errors = 0usize;

        for category in WARM_CATEGORIES {
            let filter = FilterSet::new().with_categories([category]);
            match self.engine.top_headlines(&filter).await {
                Ok(_) => refreshed += 1,
                Err(e) => {
                    errors += 1;
                    error!(category, error = %e, "warm refresh query failed");
                }
            }
        }

        for country in WARM_COUNTRIES {
            let filter = FilterSet::new().with_countries([country]);
            match self.engine.top_headlines(&filter).await {
                Ok(_) => refreshed += 1,
                Err(e) => {
                    errors += 1;
                    error!(country, error = %e, "warm refresh query failed");
                }
            }
        }

        match self.engine.all_sources().await {
            Ok(_) => refreshed += 1,
            Err(e) => {
                errors += 1;
                error!(error = %e, "warm refresh sources listing failed");
            }
        }

        let elapsed = Utc::now().signed_duration_since(start);
        info!(
            refreshed,
            errors,
            entries = self.cache.len(),
            elapsed_ms = elapsed.num_milliseconds(),
            "warm refresh complete"
        );
    }

    /// Minimal reachability check. Evicts its own entry first so the query
    /// reaches the provider instead of the cache. Failure is logged at a
    /// lower severity and never escalated.
    pub async fn probe(&self) {
        let filter = FilterSet::new().with_countries([PROBE_COUNTRY]);
        let key = CacheKey::from(query::top_headlines(&filter));
        self.cache.evict(&key);

        match self.engine.top_headlines(&filter).await {
            Ok(response) => {
                debug!(articles = response.articles.len(), "upstream probe ok");
            }
            Err(e) => {
                warn!(error = %e, "upstream probe failed");
            }
        }
    }

    /// Stop the scheduler (called externally)
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::app::{NewsError, Result};
    use crate::domain::NewsResponse;
    use crate::prefs::InMemoryPreferences;
    use crate::upstream::NewsFetch;

    struct ScriptedFetch {
        calls: AtomicUsize,
        paths: Mutex<Vec<String>>,
        fail_when_contains: Option<&'static str>,
    }

    impl ScriptedFetch {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                paths: Mutex::new(Vec::new()),
                fail_when_contains: None,
            }
        }

        fn failing_on(needle: &'static str) -> Self {
            Self {
                fail_when_contains: Some(needle),
                ..Self::new()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn paths(&self) -> Vec<String> {
            self.paths.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NewsFetch for ScriptedFetch {
        async fn fetch(&self, path_and_query: &str) -> Result<NewsResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.paths.lock().unwrap().push(path_and_query.to_string());

            if let Some(needle) = self.fail_when_contains {
                if path_and_query.contains(needle) {
                    return Err(NewsError::Upstream {
                        status: 503,
                        message: "scripted failure".to_string(),
                    });
                }
            }

            Ok(NewsResponse {
                status: "ok".to_string(),
                total_results: 1,
                articles: Vec::new(),
            })
        }
    }

    fn scheduler_with(mock: Arc<ScriptedFetch>) -> (RefreshScheduler, Arc<NewsCache>) {
        let cache = Arc::new(NewsCache::new());
        let engine = Arc::new(NewsEngine::new(
            mock,
            cache.clone(),
            Arc::new(InMemoryPreferences::new()),
        ));
        (
            RefreshScheduler::new(engine, cache.clone(), SchedulerConfig::default()),
            cache,
        )
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(SchedulerConfig::parse_interval("1h").unwrap(), 3600);
        assert_eq!(SchedulerConfig::parse_interval("30m").unwrap(), 1800);
        assert_eq!(SchedulerConfig::parse_interval("1d").unwrap(), 86400);
        assert_eq!(SchedulerConfig::parse_interval("60s").unwrap(), 60);
        assert_eq!(SchedulerConfig::parse_interval("3600").unwrap(), 3600);
        assert_eq!(SchedulerConfig::parse_interval("10m").unwrap(), 600);
        assert!(SchedulerConfig::parse_interval("invalid").is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(SchedulerConfig::format_interval(3600), "1h");
        assert_eq!(SchedulerConfig::format_interval(600), "10m");
        assert_eq!(SchedulerConfig::format_interval(86400), "1d");
        assert_eq!(SchedulerConfig::format_interval(90), "90s");
        assert_eq!(SchedulerConfig::format_interval(7200), "2h");
    }

    #[tokio::test]
    async fn test_warm_refresh_populates_all_fixed_queries() {
        let mock = Arc::new(ScriptedFetch::new());
        let (scheduler, cache) = scheduler_with(mock.clone());

        scheduler.warm_refresh().await;

        // 5 categories + 4 countries + the sources listing.
        assert_eq!(mock.calls(), 10);
        assert_eq!(cache.len(), 10);

        let paths = mock.paths();
        for category in WARM_CATEGORIES {
            assert!(paths.iter().any(|p| p.contains(&format!("category={}", category))));
        }
        for country in WARM_COUNTRIES {
            assert!(paths.iter().any(|p| p.contains(&format!("country={}", country))));
        }
        assert!(paths.iter().any(|p| p == "/sources"));
    }

    #[tokio::test]
    async fn test_warm_refresh_continues_past_failures() {
        let mock = Arc::new(ScriptedFetch::failing_on("category=science"));
        let (scheduler, cache) = scheduler_with(mock.clone());

        scheduler.warm_refresh().await;

        // The failing category was attempted and skipped; everything else
        // still ran.
        assert_eq!(mock.calls(), 10);
        assert_eq!(cache.len(), 9);
    }

    #[tokio::test]
    async fn test_warm_refresh_clears_stale_entries() {
        let mock = Arc::new(ScriptedFetch::new());
        let (scheduler, cache) = scheduler_with(mock.clone());

        let stale = FilterSet::new().with_countries(["de"]);
        scheduler.engine.top_headlines(&stale).await.unwrap();
        let stale_key = CacheKey::from(query::top_headlines(&stale));
        assert!(cache.get(&stale_key).is_some());

        scheduler.warm_refresh().await;

        assert!(cache.get(&stale_key).is_none());
        assert_eq!(cache.len(), 10);
    }

    #[tokio::test]
    async fn test_probe_goes_upstream_even_when_cached() {
        let mock = Arc::new(ScriptedFetch::new());
        let (scheduler, _cache) = scheduler_with(mock.clone());

        let filter = FilterSet::new().with_countries([PROBE_COUNTRY]);
        scheduler.engine.top_headlines(&filter).await.unwrap();
        assert_eq!(mock.calls(), 1);

        scheduler.probe().await;

        // The probe evicted the entry and re-fetched it.
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_probe_failure_is_contained() {
        let mock = Arc::new(ScriptedFetch::failing_on("country=us"));
        let (scheduler, cache) = scheduler_with(mock.clone());

        scheduler.probe().await;

        assert_eq!(mock.calls(), 1);
        assert!(cache.is_empty());
    }
}
