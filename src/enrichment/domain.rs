//! Internal domain models for metadata resolution.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters.

use std::fmt;
use std::time::Duration;

/// Metadata a provider could supply for an (artist, title) pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMetadata {
    /// Album (release) title
    pub album: Option<String>,
    /// Genre, title-cased
    pub genre: Option<String>,
    /// Release year
    pub year: Option<i32>,
    /// Recording duration
    pub duration: Option<Duration>,
}

impl ResolvedMetadata {
    /// Fill missing fields from `other`, keeping values already present.
    pub fn merge(&mut self, other: &ResolvedMetadata) {
        self.album = self.album.take().or_else(|| other.album.clone());
        self.genre = self.genre.take().or_else(|| other.genre.clone());
        self.year = self.year.or(other.year);
        self.duration = self.duration.or(other.duration);
    }

    /// Both fields the catalog cares about are known.
    pub fn is_complete(&self) -> bool {
        self.album.is_some() && self.genre.is_some()
    }
}

/// Source of metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    MusicBrainz,
    ITunes,
}

impl fmt::Display for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataSource::MusicBrainz => write!(f, "MusicBrainz"),
            MetadataSource::ITunes => write!(f, "iTunes"),
        }
    }
}

/// Errors that can occur while querying a provider
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for EnrichmentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EnrichmentError::Timeout
        } else if e.is_decode() {
            EnrichmentError::Parse(e.to_string())
        } else {
            EnrichmentError::Network(e.to_string())
        }
    }
}

/// Title-case a tag such as `synth-pop rock` into `Synth-pop Rock`.
pub(crate) fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Year from a `YYYY`, `YYYY-MM` or `YYYY-MM-DD...` date string.
pub(crate) fn parse_year(date: &str) -> Option<i32> {
    date.get(..4)?.parse().ok()
}
