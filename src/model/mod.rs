//! Core data models for the catalog.
//!
//! Defines the primary entity [`CatalogItem`] plus the insert payload
//! [`NewItem`] and the aggregate [`CatalogStats`].
//!
//! # Database Schema
//!
//! The models map to the `items` table. `external_ref` is the unique
//! storage reference handed out by the delivery channel and is the key
//! used for duplicate detection.

use serde::Serialize;
use sqlx::FromRow;

/// Artist names treated as "no artist information" by uploads and enrichment.
pub const PLACEHOLDER_ARTISTS: [&str; 2] = ["unknown artist", "unknown"];

/// Artist stored when an upload carries no performer tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Title stored when an upload carries neither a title tag nor a file name.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// A searchable, deliverable audio item.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CatalogItem {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Delivery channel asset reference (unique)
    pub external_ref: String,
    /// Track title
    pub title: String,
    /// Performer
    pub artist: String,
    /// Album title, filled by uploads, enrichment or an admin
    pub album: Option<String>,
    /// Genre
    pub genre: Option<String>,
    /// Duration in seconds
    pub duration: Option<i64>,
    /// Free-text tags, comma separated
    pub tags: Option<String>,
    /// Creation time (RFC 3339, UTC)
    pub created_at: String,
}

impl CatalogItem {
    /// Duration as `M:SS`, or `Unknown` when not known.
    pub fn duration_formatted(&self) -> String {
        format_duration(self.duration)
    }

    /// Whether the artist is one of the placeholder values.
    pub fn has_placeholder_artist(&self) -> bool {
        is_placeholder_artist(&self.artist)
    }
}

/// Payload for inserting a new item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    pub external_ref: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<i64>,
    pub tags: Option<String>,
}

/// Aggregate numbers about the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_items: i64,
    pub unique_artists: i64,
    pub unique_albums: i64,
    pub genres: i64,
    pub missing_album: i64,
    /// Most recent `created_at`, if any item exists
    pub last_upload: Option<String>,
}

impl CatalogStats {
    /// Share of items that have an album, in percent.
    pub fn album_coverage(&self) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        let with_album = self.total_items - self.missing_album;
        with_album as f64 / self.total_items as f64 * 100.0
    }
}

/// Format a duration in seconds as `M:SS`.
pub fn format_duration(seconds: Option<i64>) -> String {
    match seconds {
        Some(s) if s > 0 => format!("{}:{:02}", s / 60, s % 60),
        _ => "Unknown".to_string(),
    }
}

/// Case-insensitive check against [`PLACEHOLDER_ARTISTS`].
pub fn is_placeholder_artist(artist: &str) -> bool {
    let lower = artist.trim().to_lowercase();
    PLACEHOLDER_ARTISTS.contains(&lower.as_str())
}
