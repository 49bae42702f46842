//! Trait definitions for external metadata providers.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! can substitute mock implementations.
//!
//! # Example
//!
//! ```ignore
//! use catalog_bot::enrichment::traits::MetadataProvider;
//!
//! async fn album_of(provider: &dyn MetadataProvider) -> Option<String> {
//!     provider.lookup("The Weeknd", "Blinding Lights").await.ok()??.album
//! }
//! ```

use async_trait::async_trait;

use super::domain::{EnrichmentError, MetadataSource, ResolvedMetadata};

/// A catalog service that can map (artist, title) to release metadata.
///
/// `Ok(None)` means the provider answered but knows nothing useful.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn source(&self) -> MetadataSource;

    async fn lookup(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<ResolvedMetadata>, EnrichmentError>;
}

// Implement traits for real clients

#[async_trait]
impl MetadataProvider for super::musicbrainz::MusicBrainzClient {
    fn source(&self) -> MetadataSource {
        MetadataSource::MusicBrainz
    }

    async fn lookup(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<ResolvedMetadata>, EnrichmentError> {
        self.lookup(artist, title).await
    }
}

#[async_trait]
impl MetadataProvider for super::itunes::ITunesClient {
    fn source(&self) -> MetadataSource {
        MetadataSource::ITunes
    }

    async fn lookup(
        &self,
        artist: &str,
        title: &str,
    ) -> Result<Option<ResolvedMetadata>, EnrichmentError> {
        self.lookup(artist, title).await
    }
}
