//! Metadata enrichment - fills in missing album information from external catalogs.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`musicbrainz/dto.rs`, `itunes/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Rate limiter** - Process-wide spacing of outbound calls
//! - **Resolver** - Ordered provider chain with fallback
//! - **Batch** - Backfill job over the "missing album" backlog
//!
//! This decoupling means:
//! 1. API changes don't ripple through our codebase
//! 2. We can test API contracts independently
//! 3. We can swap providers without changing business logic
//!
//! # Usage
//!
//! ```ignore
//! use enrichment::{MetadataResolver, RateLimiter};
//!
//! let limiter = Arc::new(RateLimiter::new(config.metadata.min_interval()));
//! let resolver = MetadataResolver::from_config(&config.metadata, limiter)?;
//!
//! let album = resolver.resolve_album("The Weeknd", "Blinding Lights").await;
//! ```

pub mod batch;
pub mod domain;
pub mod itunes;
pub mod musicbrainz;
pub mod rate_limit;
pub mod resolver;
pub mod traits;

pub use batch::{EnrichmentJob, EnrichmentOutcome};
pub use domain::{EnrichmentError, MetadataSource, ResolvedMetadata};
pub use rate_limit::RateLimiter;
pub use resolver::MetadataResolver;

/// User agent sent to every provider - MusicBrainz requires one
pub(crate) const USER_AGENT: &str = concat!(
    "CatalogBot/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/catalog-bot)"
);
