//! Configuration management.
//!
//! Configuration is read from `~/.config/kiosk/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. The `NEWSAPI_KEY` and `NEWSAPI_BASE_URL` environment variables
//! override the file, so the API key never has to live on disk.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::FilterSet;
use crate::scheduler::SchedulerConfig;
use crate::upstream::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub scheduler: SchedulerConfig,
    pub preferences: HashMap<String, PreferenceEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            scheduler: SchedulerConfig::default(),
            preferences: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Raw per-user preference block; converted into a canonical [`FilterSet`]
/// after load.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreferenceEntry {
    pub categories: Vec<String>,
    pub sources: Vec<String>,
    pub countries: Vec<String>,
    pub languages: Vec<String>,
}

impl PreferenceEntry {
    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet::new()
            .with_categories(&self.categories)
            .with_sources(&self.sources)
            .with_countries(&self.countries)
            .with_languages(&self.languages)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with
    /// comments. If the config file exists but is invalid, returns an
    /// error. Missing fields use default values; environment overrides are
    /// applied last.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        let mut config = if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            Self::default()
        } else {
            let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
                path: config_path.clone(),
                source: e,
            })?;

            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: config_path,
                source: e,
            })?
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Get the default config file path: `~/.config/kiosk/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("kiosk").join("config.toml"))
    }

    /// Per-user filter sets seeded from the `[preferences.<user>]` tables.
    pub fn preference_sets(&self) -> impl Iterator<Item = (String, FilterSet)> + '_ {
        self.preferences
            .iter()
            .map(|(user, entry)| (user.clone(), entry.to_filter_set()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("NEWSAPI_KEY") {
            if !key.is_empty() {
                self.upstream.api_key = key;
            }
        }
        if let Ok(url) = std::env::var("NEWSAPI_BASE_URL") {
            if !url.is_empty() {
                self.upstream.base_url = url;
            }
        }
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Kiosk configuration
#
# The API key can also be provided via the NEWSAPI_KEY environment
# variable, which takes precedence over this file. NEWSAPI_BASE_URL
# overrides the base URL the same way.

[upstream]
# API key for the news provider (https://newsapi.org)
api_key = ""

# Provider base URL
base_url = "https://newsapi.org/v2"

# Per-request timeout in seconds
timeout_secs = 10

[scheduler]
# Seconds between full cache clear-and-repopulate passes
warm_interval_secs = 3600

# Seconds between upstream reachability probes
probe_interval_secs = 600

# Run a warm refresh immediately when the scheduler starts
warm_on_start = true

# Per-user preferences, one table per user. Token lists are
# case-insensitive and deduplicated on load.
#
# [preferences.alice]
# categories = ["technology", "science"]
# countries = ["us", "gb"]
# languages = ["en"]
# sources = []
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
