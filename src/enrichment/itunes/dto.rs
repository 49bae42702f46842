//! iTunes Search API Data Transfer Objects
//!
//! These types match what `https://itunes.apple.com/search` returns.
//! DO NOT use these types outside the itunes module - convert to domain types.

use serde::{Deserialize, Serialize};

/// Search response
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub result_count: u32,
    #[serde(default)]
    pub results: Vec<SongResult>,
}

/// A song hit (`entity=song`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongResult {
    pub wrapper_type: Option<String>,
    pub artist_name: Option<String>,
    pub track_name: Option<String>,
    /// Album title
    pub collection_name: Option<String>,
    pub primary_genre_name: Option<String>,
    /// Duration in milliseconds
    pub track_time_millis: Option<u64>,
    /// ISO-8601 timestamp, e.g. `2020-03-20T12:00:00Z`
    pub release_date: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================
