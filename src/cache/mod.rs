//! Concurrent response cache with single-flight population.
//!
//! Entries have no TTL; they live until [`NewsCache::clear`] or
//! [`NewsCache::evict`] removes them. For a given key at most one upstream
//! fetch is in flight at a time: the first caller for a missing key runs
//! the fetch, every concurrent caller for the same key awaits that flight
//! and shares its outcome. Successful responses are stored; failures are
//! handed to every waiter but never cached, so the next caller retries.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::watch;

use crate::app::Result;
use crate::domain::NewsResponse;

/// Canonical identity of one upstream query shape: the built
/// path-and-query string, deterministic for a logical query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Broadcast slot for one flight: `None` until the leader publishes.
type Outcome = Option<Result<Arc<NewsResponse>>>;

enum Flight {
    Leader(watch::Sender<Outcome>),
    Follower(watch::Receiver<Outcome>),
}

#[derive(Default)]
pub struct NewsCache {
    entries: RwLock<HashMap<CacheKey, Arc<NewsResponse>>>,
    inflight: Mutex<HashMap<CacheKey, watch::Receiver<Outcome>>>,
}

/// Removes the in-flight marker when the leader finishes or is dropped
/// mid-fetch, so the key can always be fetched again later.
struct FlightGuard<'a> {
    cache: &'a NewsCache,
    key: &'a CacheKey,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.cache.inflight.lock().unwrap().remove(self.key);
    }
}

impl NewsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking lookup.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<NewsResponse>> {
        self.entries.read().unwrap().get(key).cloned()
    }

    /// Returns the cached entry, or resolves it through `fetch` with
    /// single-flight semantics. The closure is only invoked by the one
    /// caller elected leader; everyone else awaits the leader's outcome.
    pub async fn get_or_fetch<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<Arc<NewsResponse>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<NewsResponse>>,
    {
        loop {
            if let Some(entry) = self.get(key) {
                return Ok(entry);
            }

            let flight = {
                let mut inflight = self.inflight.lock().unwrap();
                match inflight.get(key) {
                    Some(rx) => Flight::Follower(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        inflight.insert(key.clone(), rx);
                        Flight::Leader(tx)
                    }
                }
            };

            match flight {
                Flight::Leader(tx) => {
                    let guard = FlightGuard { cache: self, key };

                    // The previous flight may have landed between our miss
                    // and claiming this one.
                    if let Some(entry) = self.get(key) {
                        drop(guard);
                        let _ = tx.send(Some(Ok(entry.clone())));
                        return Ok(entry);
                    }

                    let result = fetch().await.map(Arc::new);
                    if let Ok(entry) = &result {
                        self.entries
                            .write()
                            .unwrap()
                            .insert(key.clone(), Arc::clone(entry));
                    }

                    // Clear the marker before publishing so late arrivals
                    // start a fresh flight instead of joining a closed one.
                    drop(guard);
                    let _ = tx.send(Some(result.clone()));
                    return result;
                }
                Flight::Follower(mut rx) => {
                    loop {
                        {
                            let outcome = rx.borrow_and_update();
                            if let Some(result) = outcome.as_ref() {
                                return result.clone();
                            }
                        }
                        if rx.changed().await.is_err() {
                            // Leader dropped without publishing; retry from
                            // the top and elect a new one.
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Evicts everything. In-flight fetches are not interrupted and may
    /// repopulate the store with a late write; entries are immutable
    /// snapshots, so last-writer-wins is fine.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Removes one entry if present; no-op otherwise.
    pub fn evict(&self, key: &CacheKey) {
        self.entries.write().unwrap().remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::app::NewsError;

    fn response(total: u32) -> NewsResponse {
        NewsResponse {
            status: "ok".to_string(),
            total_results: total,
            articles: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_fetch_populates_entry() {
        let cache = NewsCache::new();
        let key = CacheKey::from("/top-headlines?country=us");
        let calls = AtomicUsize::new(0);

        let result = cache
            .get_or_fetch(&key, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(response(7)) }
            })
            .await
            .unwrap();

        assert_eq!(result.total_results, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap().total_results, 7);
    }

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let cache = NewsCache::new();
        let key = CacheKey::from("/sources");
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            cache
                .get_or_fetch(&key, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(response(1)) }
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_not_cached() {
        let cache = NewsCache::new();
        let key = CacheKey::from("/top-headlines?country=us");
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let err = cache
                .get_or_fetch(&key, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async {
                        Err(NewsError::Upstream {
                            status: 503,
                            message: "unavailable".to_string(),
                        })
                    }
                })
                .await
                .unwrap_err();
            assert!(matches!(err, NewsError::Upstream { status: 503, .. }));
        }

        // Both calls went upstream: the failure was never stored.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache = Arc::new(NewsCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::from("/top-headlines?country=us");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(&key, || {
                        let calls = calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok(response(3))
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().total_results, 3);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_waiters_receive_leader_error() {
        let cache = Arc::new(NewsCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = CacheKey::from("/top-headlines?country=gb");

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            let calls = calls.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(&key, || {
                        let calls = calls.clone();
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Err(NewsError::Upstream {
                                status: 429,
                                message: "rate limited".to_string(),
                            })
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert!(matches!(err, NewsError::Upstream { status: 429, .. }));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_clear_during_flight_keeps_late_write() {
        let cache = Arc::new(NewsCache::new());
        let key = CacheKey::from("/top-headlines?country=us");

        let flight = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(&key, || async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(response(9))
                    })
                    .await
            })
        };

        // Clear while the fetch is still sleeping.
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.clear();
        assert!(cache.is_empty());

        flight.await.unwrap().unwrap();
        assert_eq!(cache.get(&key).unwrap().total_results, 9);
    }

    #[tokio::test]
    async fn test_evict_forces_refetch() {
        let cache = NewsCache::new();
        let key = CacheKey::from("/sources");
        let calls = AtomicUsize::new(0);

        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(response(2)) }
        };

        cache.get_or_fetch(&key, fetch).await.unwrap();
        cache.evict(&key);
        assert!(cache.get(&key).is_none());

        cache.get_or_fetch(&key, fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_evict_missing_key_is_noop() {
        let cache = NewsCache::new();
        cache.evict(&CacheKey::from("/top-headlines?country=fr"));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let cache = NewsCache::new();
        let calls = AtomicUsize::new(0);

        for key in ["/top-headlines?country=us", "/top-headlines?country=gb"] {
            cache
                .get_or_fetch(&CacheKey::from(key), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(response(1)) }
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }
}
