//! Metadata resolver - runs the provider chain for one (artist, title) pair.
//!
//! Providers are tried in order: MusicBrainz first, iTunes as the album
//! fallback. Every call waits on the shared [`RateLimiter`]. A provider
//! error is logged and treated as "no result" so a single bad response
//! never fails the caller.

use std::sync::Arc;

use super::domain::{EnrichmentError, ResolvedMetadata};
use super::itunes::ITunesClient;
use super::musicbrainz::MusicBrainzClient;
use super::rate_limit::RateLimiter;
use super::traits::MetadataProvider;
use crate::config::MetadataConfig;

/// Ordered provider chain behind a rate limiter
pub struct MetadataResolver {
    providers: Vec<Arc<dyn MetadataProvider>>,
    limiter: Arc<RateLimiter>,
}

impl MetadataResolver {
    pub fn new(providers: Vec<Arc<dyn MetadataProvider>>, limiter: Arc<RateLimiter>) -> Self {
        Self { providers, limiter }
    }

    /// Build the production chain from config.
    pub fn from_config(
        config: &MetadataConfig,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, EnrichmentError> {
        let mut providers: Vec<Arc<dyn MetadataProvider>> = Vec::new();

        if config.musicbrainz_enabled {
            providers.push(Arc::new(MusicBrainzClient::new(
                config.request_timeout(),
                config.top_k,
            )?));
        }
        if config.itunes_enabled {
            providers.push(Arc::new(ITunesClient::new(config.request_timeout())?));
        }

        if providers.is_empty() {
            tracing::warn!("All metadata providers are disabled");
        }

        Ok(Self::new(providers, limiter))
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }

    /// First album any provider reports, in chain order.
    pub async fn resolve_album(&self, artist: &str, title: &str) -> Option<String> {
        for provider in &self.providers {
            if let Some(album) = self
                .query(provider.as_ref(), artist, title)
                .await
                .and_then(|m| m.album)
            {
                tracing::info!("Resolved album for {} - {}: {} ({})", artist, title, album, provider.source());
                return Some(album);
            }
        }

        tracing::info!("No album found for: {} - {}", artist, title);
        None
    }

    /// Fill in whatever of album/genre/year/duration is missing.
    ///
    /// When both `existing_album` and `existing_genre` are set they are
    /// returned as-is without contacting any provider.
    pub async fn enrich(
        &self,
        artist: &str,
        title: &str,
        existing_album: Option<&str>,
        existing_genre: Option<&str>,
    ) -> ResolvedMetadata {
        let mut result = ResolvedMetadata {
            album: existing_album.map(String::from),
            genre: existing_genre.map(String::from),
            ..Default::default()
        };

        if result.is_complete() {
            return result;
        }

        let mut chain = self.providers.iter();

        if let Some(primary) = chain.next()
            && let Some(found) = self.query(primary.as_ref(), artist, title).await
        {
            result.merge(&found);
        }

        if result.album.is_none() {
            for provider in chain {
                if let Some(album) = self
                    .query(provider.as_ref(), artist, title)
                    .await
                    .and_then(|m| m.album)
                {
                    result.album = Some(album);
                    break;
                }
            }
        }

        result
    }

    async fn query(
        &self,
        provider: &dyn MetadataProvider,
        artist: &str,
        title: &str,
    ) -> Option<ResolvedMetadata> {
        self.limiter.acquire().await;

        match provider.lookup(artist, title).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    "{} lookup failed for {} - {}: {}",
                    provider.source(),
                    artist,
                    title,
                    e
                );
                None
            }
        }
    }
}
