//! iTunes Search API integration
//!
//! Secondary provider, consulted when MusicBrainz has no album for a track.
//!
//! API docs: https://developer.apple.com/library/archive/documentation/AudioVideo/Conceptual/iTuneSearchAPI/

pub mod dto;
mod adapter;
mod client;

pub use adapter::to_metadata;
pub use client::ITunesClient;
