//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use std::time::Duration;

use super::dto;
use crate::enrichment::domain::{ResolvedMetadata, parse_year, title_case};

/// Release-group primary type preferred over singles and EPs.
const PREFERRED_PRIMARY_TYPE: &str = "Album";

/// Convert a recording search response into resolved metadata.
///
/// Uses the first candidate that carries release information. Returns
/// `None` when no candidate has any release.
pub fn to_metadata(response: dto::RecordingSearchResponse) -> Option<ResolvedMetadata> {
    let recording = response
        .recordings
        .into_iter()
        .find(|r| !r.releases.is_empty())?;

    let release = pick_release(&recording.releases)?;

    Some(ResolvedMetadata {
        album: Some(release.title.clone()).filter(|t| !t.trim().is_empty()),
        genre: top_genre(&recording.tags),
        year: release.date.as_deref().and_then(parse_year),
        duration: recording.length.map(Duration::from_millis),
    })
}

/// Prefer a titled release whose release group is an Album, else the first
/// titled release, else the first one.
fn pick_release(releases: &[dto::Release]) -> Option<&dto::Release> {
    let titled = || releases.iter().filter(|r| !r.title.trim().is_empty());
    titled()
        .find(|r| {
            r.release_group
                .as_ref()
                .and_then(|rg| rg.primary_type.as_deref())
                == Some(PREFERRED_PRIMARY_TYPE)
        })
        .or_else(|| titled().next())
        .or_else(|| releases.first())
}

/// Most voted tag, title-cased. Ties go to the tag listed first.
fn top_genre(tags: &[dto::Tag]) -> Option<String> {
    tags.iter()
        .filter(|t| !t.name.trim().is_empty())
        .fold(None, |best: Option<&dto::Tag>, t| match best {
            Some(b) if b.count >= t.count => Some(b),
            _ => Some(t),
        })
        .map(|t| title_case(&t.name))
}
