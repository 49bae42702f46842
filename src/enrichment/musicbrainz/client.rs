//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.
//! The client itself is stateless; spacing is enforced by the shared
//! [`RateLimiter`](crate::enrichment::rate_limit::RateLimiter) in the resolver.

use std::time::Duration;

use super::{adapter, dto};
use crate::enrichment::USER_AGENT;
use crate::enrichment::domain::{EnrichmentError, ResolvedMetadata};

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
    limit: u32,
}

const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

impl MusicBrainzClient {
    /// Create a new client requesting up to `limit` candidates per search
    pub fn new(timeout: Duration, limit: u32) -> Result<Self, EnrichmentError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout, limit)
    }

    /// Create a client against a custom base URL
    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout: Duration,
        limit: u32,
    ) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            limit,
        })
    }

    /// Search recordings by artist and title and return the best album guess
    pub async fn lookup(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<ResolvedMetadata>, EnrichmentError> {
        let response = self.search_recordings(artist, title).await?;
        let metadata = adapter::to_metadata(response);
        if metadata.is_none() {
            tracing::info!("No MusicBrainz releases found for: {} - {}", artist, title);
        }
        Ok(metadata)
    }

    /// Send the search request and parse the response
    pub async fn search_recordings(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<dto::RecordingSearchResponse, EnrichmentError> {
        let url = self.search_url(artist, title);
        tracing::debug!(artist, title, "querying MusicBrainz");

        let response = self.http_client.get(&url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(EnrichmentError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(EnrichmentError::ApiError(error.error));
            }
            return Err(EnrichmentError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<dto::RecordingSearchResponse>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }

    fn search_url(&self, artist: &str, title: &str) -> String {
        format!(
            "{}/recording/?query={}&fmt=json&limit={}",
            self.base_url,
            urlencoding::encode(&recording_query(artist, title)),
            self.limit
        )
    }
}

/// Structured Lucene query; embedded quotes are dropped.
fn recording_query(artist: &str, title: &str) -> String {
    format!(
        "artist:\"{}\" AND recording:\"{}\"",
        artist.replace('"', ""),
        title.replace('"', "")
    )
}
