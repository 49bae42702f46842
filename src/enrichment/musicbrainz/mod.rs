//! MusicBrainz API integration
//!
//! Primary metadata provider. Looks up recordings by artist and title and
//! picks the album they were released on.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use adapter::to_metadata;
pub use client::MusicBrainzClient;
