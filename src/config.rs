//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\catalog-bot\config.toml
//! - macOS: ~/Library/Application Support/catalog-bot/config.toml
//! - Linux: ~/.config/catalog-bot/config.toml
//!
//! A different file can be passed with `--config`. Every section and field
//! has a default, so a partial file (or none at all) is always usable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bot identity and admin allow-list
    pub bot: BotConfig,

    /// Free-text query resolution
    pub search: SearchConfig,

    /// Page sizes per browse view
    pub pagination: PaginationConfig,

    /// Action identifier and token cache limits
    pub navigation: NavigationConfig,

    /// External metadata providers
    pub metadata: MetadataConfig,

    /// Album backfill job
    pub enrichment: EnrichmentJobConfig,

    /// Bulk delivery pacing
    pub delivery: DeliveryConfig,
}

/// Bot identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub name: String,

    /// User ids allowed to upload and run enrichment
    pub admins: Vec<i64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Music Bot".to_string(),
            admins: Vec::new(),
        }
    }
}

/// Query resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Queries shorter than this (after trimming) are rejected
    pub min_query_len: usize,

    /// Cap on substring-search candidates
    pub candidate_limit: u32,

    /// Hits whose artist matches the query needed to treat it as an artist
    pub artist_threshold: usize,

    /// Cap on the artist-without-albums track list
    pub no_album_cap: u32,

    /// Cap on the free-search track list
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            candidate_limit: 50,
            artist_threshold: 5,
            no_album_cap: 30,
            max_results: 20,
        }
    }
}

/// Page sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub artists_per_page: usize,
    pub albums_per_page: usize,
    pub tracks_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            artists_per_page: 10,
            albums_per_page: 5,
            tracks_per_page: 8,
        }
    }
}

/// Action identifier limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Hard ceiling on an encoded action identifier, in bytes
    pub max_action_len: usize,

    /// Values up to this many bytes are used as their own token
    pub raw_token_max_len: usize,

    /// Hex characters of the fingerprint kept in a derived token
    pub token_len: usize,

    /// Maximum entries held by the token cache
    pub token_cache_capacity: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_action_len: 64,
            raw_token_max_len: 20,
            token_len: 16,
            token_cache_capacity: 10_000,
        }
    }
}

/// External metadata provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Look up the album while saving an upload
    pub auto_fetch_album: bool,

    pub musicbrainz_enabled: bool,

    pub itunes_enabled: bool,

    /// Minimum spacing between provider calls, in milliseconds
    pub min_interval_ms: u64,

    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,

    /// Candidate recordings requested from MusicBrainz
    pub top_k: u32,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            auto_fetch_album: true,
            musicbrainz_enabled: true,
            itunes_enabled: true,
            min_interval_ms: 1000,
            request_timeout_secs: 10,
            top_k: 5,
        }
    }
}

impl MetadataConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Album backfill settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentJobConfig {
    /// Records processed per run
    pub batch_limit: u32,

    /// Emit a progress update every N records
    pub progress_every: usize,
}

impl Default for EnrichmentJobConfig {
    fn default() -> Self {
        Self {
            batch_limit: 100,
            progress_every: 5,
        }
    }
}

/// Bulk delivery pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Emit a progress update every N items
    pub progress_every: usize,

    /// Pause after every N items
    pub pause_every: usize,

    /// Pause length, in milliseconds
    pub pause_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            progress_every: 5,
            pause_every: 3,
            pause_ms: 1000,
        }
    }
}

impl DeliveryConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("catalog-bot"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from `path`, or from the default location.
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load(path: Option<&Path>) -> Config {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };

    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(contents) => match parse(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Parse configuration from TOML text.
pub fn parse(contents: &str) -> Result<Config, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

/// Parse a comma-separated admin id list such as the `ADMIN_IDS` variable.
///
/// Blank entries are ignored; any non-numeric entry rejects the whole list.
pub fn parse_admin_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| ConfigError::InvalidAdminId(s.to_string()))
        })
        .collect()
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(toml::de::Error),

    #[error("Invalid admin id: {0}")]
    InvalidAdminId(String),
}

// ============================================================================
// Tests
// ============================================================================
