//! iTunes Search HTTP client

use std::time::Duration;

use super::{adapter, dto};
use crate::enrichment::domain::{EnrichmentError, ResolvedMetadata};
use crate::enrichment::USER_AGENT;

const DEFAULT_BASE_URL: &str = "https://itunes.apple.com";

/// iTunes Search API client
pub struct ITunesClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ITunesClient {
    pub fn new(timeout: Duration) -> Result<Self, EnrichmentError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Term search for `"{artist} {title}"`, single song result
    pub async fn lookup(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<ResolvedMetadata>, EnrichmentError> {
        let url = self.search_url(artist, title);
        tracing::debug!(artist, title, "querying iTunes");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(EnrichmentError::RateLimited);
        }
        if !status.is_success() {
            return Err(EnrichmentError::Network(format!("HTTP {}", status)));
        }

        let body = response
            .json::<dto::SearchResponse>()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))?;

        let metadata = adapter::to_metadata(body);
        if let Some(album) = metadata.as_ref().and_then(|m| m.album.as_deref()) {
            tracing::info!("Found album from iTunes: {}", album);
        }
        Ok(metadata)
    }

    fn search_url(&self, artist: &str, title: &str) -> String {
        format!(
            "{}/search?term={}&media=music&entity=song&limit=1",
            self.base_url,
            urlencoding::encode(&format!("{} {}", artist, title))
        )
    }
}
