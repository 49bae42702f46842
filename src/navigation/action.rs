//! Colon-delimited action identifiers: `kind:param1:param2:page`.
//!
//! Artist, album and query parameters travel as [`TokenCache`] tokens, so
//! they never contain `:` and stay short. Encoding fails rather than emit an
//! identifier over the presentation channel's length ceiling.

use std::sync::Arc;

use super::tokens::TokenCache;
use super::view::Button;

/// A decoded navigation action with full-length parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Drill into an artist: album list if it has albums, else its tracks
    Artist { artist: String, page: usize },
    /// Page through an artist's albums
    Albums { artist: String, page: usize },
    AlbumTracks { artist: String, album: String, page: usize },
    Track { id: i64 },
    ArtistsPage { page: usize },
    BackToAlbums { artist: String },
    BackToArtists,
    /// Inert; used for the page indicator
    Noop,
    /// Deliver every album-less track of an artist
    DownloadAll { artist: String },
    DownloadAlbum { artist: String, album: String },
    /// Page through free-search results
    Search { query: String, page: usize },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Artist { .. } => "artist",
            Action::Albums { .. } => "albums",
            Action::AlbumTracks { .. } => "album_tracks",
            Action::Track { .. } => "track",
            Action::ArtistsPage { .. } => "artists_page",
            Action::BackToAlbums { .. } => "back_to_albums",
            Action::BackToArtists => "back_to_artists",
            Action::Noop => "noop",
            Action::DownloadAll { .. } => "dl_all",
            Action::DownloadAlbum { .. } => "dl_album",
            Action::Search { .. } => "search",
        }
    }
}

/// Errors decoding or encoding an action identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("unknown action kind: {0}")]
    UnknownKind(String),

    #[error("action {kind} is missing {param}")]
    MissingParam { kind: &'static str, param: &'static str },

    #[error("invalid page number: {0}")]
    InvalidPage(String),

    #[error("invalid item id: {0}")]
    InvalidId(String),

    #[error("action id is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Encodes and decodes actions through the shared token cache
#[derive(Clone)]
pub struct ActionCodec {
    tokens: Arc<TokenCache>,
    max_len: usize,
}

impl ActionCodec {
    pub fn new(tokens: Arc<TokenCache>, max_len: usize) -> Self {
        Self { tokens, max_len }
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    pub fn encode(&self, action: &Action) -> Result<String, ActionError> {
        let tok = |value: &str| self.tokens.put(value);

        let (p1, p2, page) = match action {
            Action::Artist { artist, page } | Action::Albums { artist, page } => {
                (tok(artist), String::new(), *page)
            }
            Action::AlbumTracks { artist, album, page } => (tok(artist), tok(album), *page),
            Action::Track { id } => (id.to_string(), String::new(), 0),
            Action::ArtistsPage { page } => (String::new(), String::new(), *page),
            Action::BackToAlbums { artist } | Action::DownloadAll { artist } => {
                (tok(artist), String::new(), 0)
            }
            Action::DownloadAlbum { artist, album } => (tok(artist), tok(album), 0),
            Action::Search { query, page } => (tok(query), String::new(), *page),
            Action::BackToArtists | Action::Noop => (String::new(), String::new(), 0),
        };

        let id = format!("{}:{}:{}:{}", action.kind(), p1, p2, page);
        if id.len() > self.max_len {
            return Err(ActionError::TooLong {
                len: id.len(),
                max: self.max_len,
            });
        }
        Ok(id)
    }

    /// Decode an identifier, resolving tokens back to full values.
    ///
    /// Trailing fields may be omitted; a missing page means page 0.
    pub fn decode(&self, id: &str) -> Result<Action, ActionError> {
        if id.len() > self.max_len {
            return Err(ActionError::TooLong {
                len: id.len(),
                max: self.max_len,
            });
        }

        let mut parts = id.splitn(4, ':');
        let kind = parts.next().unwrap_or_default();
        let p1 = parts.next().unwrap_or_default();
        let p2 = parts.next().unwrap_or_default();
        let page = parse_page(parts.next().unwrap_or_default())?;

        let value = |raw: &str, kind: &'static str, param: &'static str| {
            if raw.is_empty() {
                Err(ActionError::MissingParam { kind, param })
            } else {
                Ok(self.tokens.get(raw))
            }
        };

        let action = match kind {
            "artist" => Action::Artist {
                artist: value(p1, "artist", "artist")?,
                page,
            },
            "albums" => Action::Albums {
                artist: value(p1, "albums", "artist")?,
                page,
            },
            "album_tracks" => Action::AlbumTracks {
                artist: value(p1, "album_tracks", "artist")?,
                album: value(p2, "album_tracks", "album")?,
                page,
            },
            "track" => Action::Track {
                id: p1
                    .parse()
                    .map_err(|_| ActionError::InvalidId(p1.to_string()))?,
            },
            "artists_page" => Action::ArtistsPage { page },
            "back_to_albums" => Action::BackToAlbums {
                artist: value(p1, "back_to_albums", "artist")?,
            },
            "back_to_artists" => Action::BackToArtists,
            "noop" => Action::Noop,
            "dl_all" => Action::DownloadAll {
                artist: value(p1, "dl_all", "artist")?,
            },
            "dl_album" => Action::DownloadAlbum {
                artist: value(p1, "dl_album", "artist")?,
                album: value(p2, "dl_album", "album")?,
            },
            "search" => Action::Search {
                query: value(p1, "search", "query")?,
                page,
            },
            other => return Err(ActionError::UnknownKind(other.to_string())),
        };

        Ok(action)
    }

    /// A button carrying the encoded `action`.
    pub fn button(&self, label: impl Into<String>, action: &Action) -> Result<Button, ActionError> {
        Ok(Button {
            label: label.into(),
            action: self.encode(action)?,
        })
    }
}

fn parse_page(raw: &str) -> Result<usize, ActionError> {
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| ActionError::InvalidPage(raw.to_string()))
}
