//! # Kiosk
//!
//! A caching news aggregation engine for a NewsAPI-style provider.
//!
//! ## Architecture
//!
//! Kiosk resolves every request through the same pipeline:
//!
//! ```text
//! FilterSet → QueryBuilder → Cache (single-flight) → UpstreamClient
//! ```
//!
//! - [`query`]: turns canonical filter sets into provider query strings,
//!   honoring the provider's parameter exclusivity rules
//! - [`cache`]: keyed response cache with single-flight population and no
//!   TTL; entries live until cleared or evicted
//! - [`upstream`]: reqwest-based provider client behind an async trait
//! - [`engine`]: orchestrates preference resolution, key derivation and
//!   cache-or-fetch for each public operation
//! - [`scheduler`]: hourly warm refresh plus a ten-minute reachability
//!   probe, both tolerant of per-item failures
//!
//! ## Quick Start
//!
//! ```bash
//! # Top headlines for a country
//! kiosk headlines --countries us
//!
//! # Search everything
//! kiosk search "rust language"
//!
//! # A configured user's feed
//! kiosk feed alice
//!
//! # Keep the cache warm in the foreground
//! kiosk run
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all
/// components: cache, upstream client, preference store, engine.
pub mod app;

/// Keyed response cache with single-flight population.
///
/// - [`NewsCache`](cache::NewsCache): concurrent map from canonical query
///   to decoded response
/// - [`CacheKey`](cache::CacheKey): the built path-and-query string
pub mod cache;

/// Command-line interface using clap.
///
/// Defines the CLI structure and subcommands:
/// - `headlines` - Top headlines for explicit filters
/// - `search <keyword>` - Keyword search
/// - `sources` - Provider source listing
/// - `feed <user>` - A configured user's headlines
/// - `check` - One-shot upstream probe
/// - `run` - Foreground refresh scheduler
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/kiosk/config.toml`, supporting:
/// - Provider key, base URL and timeout (`NEWSAPI_KEY` overrides)
/// - Scheduler cadences
/// - Per-user preference tables
pub mod config;

/// Core domain models.
///
/// - [`FilterSet`](domain::FilterSet): canonical category/source/country/
///   language sets plus an optional keyword
/// - [`NewsResponse`](domain::NewsResponse) / [`Article`](domain::Article):
///   decoded provider payload
/// - [`UserId`](domain::UserId): opaque user identity
pub mod domain;

/// Query orchestration.
///
/// [`NewsEngine`](engine::NewsEngine) exposes the four public operations:
/// per-user feed, top headlines, search, and the source listing.
pub mod engine;

/// Per-user preference lookup.
///
/// - [`PreferenceResolver`](prefs::PreferenceResolver): read-only async
///   trait the surrounding application implements
/// - [`InMemoryPreferences`](prefs::InMemoryPreferences): map-backed
///   implementation seeded from configuration
pub mod prefs;

/// Provider query-string construction.
///
/// Pure functions from [`FilterSet`](domain::FilterSet) to path-and-query
/// strings; the built string doubles as the cache key.
pub mod query;

/// Background cache refresh.
///
/// [`RefreshScheduler`](scheduler::RefreshScheduler) drives the hourly
/// warm refresh and the ten-minute reachability probe.
pub mod scheduler;

/// Upstream provider client.
///
/// - [`NewsFetch`](upstream::NewsFetch): async trait for issuing one
///   provider query
/// - [`NewsApiClient`](upstream::NewsApiClient): reqwest implementation
///   with API-key header and bounded timeout
pub mod upstream;
