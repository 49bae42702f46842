//! Convert iTunes DTOs to domain models

use std::time::Duration;

use super::dto;
use crate::enrichment::domain::{ResolvedMetadata, parse_year};

/// First result's collection, if it names one.
pub fn to_metadata(response: dto::SearchResponse) -> Option<ResolvedMetadata> {
    let song = response.results.into_iter().next()?;
    let album = song.collection_name.filter(|c| !c.trim().is_empty())?;

    Some(ResolvedMetadata {
        album: Some(album),
        genre: song.primary_genre_name.filter(|g| !g.trim().is_empty()),
        year: song.release_date.as_deref().and_then(parse_year),
        duration: song.track_time_millis.map(Duration::from_millis),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(collection: Option<&str>) -> dto::SongResult {
        dto::SongResult {
            wrapper_type: Some("track".to_string()),
            artist_name: Some("Artist".to_string()),
            track_name: Some("Song".to_string()),
            collection_name: collection.map(String::from),
            primary_genre_name: Some("Pop".to_string()),
            track_time_millis: Some(180_000),
            release_date: Some("2012-05-01T07:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_uses_first_collection() {
        let response = dto::SearchResponse {
            result_count: 2,
            results: vec![song(Some("First")), song(Some("Second"))],
        };
        let meta = to_metadata(response).unwrap();
        assert_eq!(meta.album.as_deref(), Some("First"));
        assert_eq!(meta.genre.as_deref(), Some("Pop"));
        assert_eq!(meta.year, Some(2012));
    }

    #[test]
    fn test_missing_collection_is_none() {
        let response = dto::SearchResponse {
            result_count: 1,
            results: vec![song(None)],
        };
        assert!(to_metadata(response).is_none());

        let empty = dto::SearchResponse { result_count: 0, results: vec![] };
        assert!(to_metadata(empty).is_none());
    }
}
