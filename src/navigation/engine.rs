//! Navigation engine - turns queries and action ids into views.
//!
//! Nothing about a browsing session is kept in memory apart from the token
//! cache: every action is decoded and its view re-derived from the store.
//!
//! Query resolution order:
//! 1. artist with albums → album list
//! 2. substring search; no hits → "no results"
//! 3. enough hits by a matching artist → that artist's track list
//! 4. exactly one hit → deliver it
//! 5. otherwise → search track list

use std::sync::Arc;

use super::action::{Action, ActionCodec};
use super::tokens::TokenCache;
use super::view::{PageDescriptor, View, nav_row};
use crate::config::{Config, PaginationConfig, SearchConfig};
use crate::db::{RecordStore, SearchField};
use crate::error::Result;
use crate::model::CatalogItem;

/// Shown for any unexpected failure; details go to the log.
pub const APOLOGY: &str = "❌ Sorry, something went wrong. Please try again later.";

/// Shown when an action id can't be decoded (stale or tampered).
pub const STALE_ACTION: &str = "⚠️ This button is no longer valid. Please search again.";

/// What the caller should do next
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Show(View),
    Deliver(CatalogItem),
    DeliverMany { label: String, items: Vec<CatalogItem> },
    /// Nothing to do (page indicator pressed)
    Ack,
}

pub struct NavigationEngine {
    store: Arc<dyn RecordStore>,
    codec: ActionCodec,
    search: SearchConfig,
    pages: PaginationConfig,
}

impl NavigationEngine {
    pub fn new(store: Arc<dyn RecordStore>, tokens: Arc<TokenCache>, config: &Config) -> Self {
        Self {
            store,
            codec: ActionCodec::new(tokens, config.navigation.max_action_len),
            search: config.search.clone(),
            pages: config.pagination.clone(),
        }
    }

    pub fn codec(&self) -> &ActionCodec {
        &self.codec
    }

    /// Resolve a free-text query.
    pub async fn search(&self, query: &str) -> Outcome {
        let query = query.trim();
        if query.chars().count() < self.search.min_query_len {
            return Outcome::Show(View::text(format!(
                "❌ Search query is too short. Please enter at least {} characters.",
                self.search.min_query_len
            )));
        }

        tracing::info!("Searching for: {}", query);
        self.recover(self.resolve_query(query).await, query)
    }

    /// Decode and run an action id.
    pub async fn handle_action(&self, id: &str) -> Outcome {
        let action = match self.codec.decode(id) {
            Ok(action) => action,
            Err(e) => {
                tracing::warn!("Rejected action {:?}: {}", id, e);
                return Outcome::Show(View::text(STALE_ACTION));
            }
        };

        tracing::debug!(?action, "dispatching");
        self.recover(self.dispatch(action).await, id)
    }

    /// Top-level artist list.
    pub async fn artists(&self, page: usize) -> Outcome {
        self.recover(self.artist_list(page).await.map(Outcome::Show), "artists")
    }

    fn recover(&self, result: Result<Outcome>, context: &str) -> Outcome {
        result.unwrap_or_else(|e| {
            tracing::error!("Navigation failed for {:?}: {}", context, e);
            Outcome::Show(View::text(APOLOGY))
        })
    }

    async fn resolve_query(&self, query: &str) -> Result<Outcome> {
        let albums = self.store.find_albums_by_artist(query).await?;
        if !albums.is_empty() {
            return Ok(Outcome::Show(self.album_list(query, &albums, 0)?));
        }

        let hits = self
            .store
            .find_by_substring(&SearchField::ALL, query, self.search.candidate_limit)
            .await?;

        if hits.is_empty() {
            tracing::info!("No results for query: {}", query);
            return Ok(Outcome::Show(no_results(query)));
        }

        let needle = query.to_lowercase();
        let artist_hits = hits
            .iter()
            .filter(|item| item.artist.to_lowercase().contains(&needle))
            .count();
        if artist_hits >= self.search.artist_threshold {
            return Ok(Outcome::Show(self.artist_tracks(query, 0).await?));
        }

        if let [single] = hits.as_slice() {
            return Ok(Outcome::Deliver(single.clone()));
        }

        let mut hits = hits;
        hits.truncate(self.search.max_results);
        Ok(Outcome::Show(self.search_results(query, &hits, 0)?))
    }

    async fn dispatch(&self, action: Action) -> Result<Outcome> {
        let view = match action {
            Action::Artist { artist, page } | Action::Albums { artist, page } => {
                self.artist_view(&artist, page).await?
            }
            Action::BackToAlbums { artist } => self.artist_view(&artist, 0).await?,
            Action::AlbumTracks { artist, album, page } => {
                self.album_tracks(&artist, &album, page).await?
            }
            Action::Track { id } => {
                return Ok(match self.store.get(id).await? {
                    Some(item) => Outcome::Deliver(item),
                    None => Outcome::Show(View::text("❌ Track not found in the catalog.")),
                });
            }
            Action::ArtistsPage { page } => self.artist_list(page).await?,
            Action::BackToArtists => self.artist_list(0).await?,
            Action::Noop => return Ok(Outcome::Ack),
            Action::DownloadAll { artist } => {
                let items = self
                    .store
                    .find_by_artist(&artist, true, self.search.candidate_limit)
                    .await?;
                return Ok(bulk(artist, items));
            }
            Action::DownloadAlbum { artist, album } => {
                let items = self.store.find_by_album(&artist, &album).await?;
                return Ok(bulk(format!("{} - {}", artist, album), items));
            }
            Action::Search { query, page } => {
                let mut hits = self
                    .store
                    .find_by_substring(&SearchField::ALL, &query, self.search.candidate_limit)
                    .await?;
                if hits.is_empty() {
                    no_results(&query)
                } else {
                    hits.truncate(self.search.max_results);
                    self.search_results(&query, &hits, page)?
                }
            }
        };

        Ok(Outcome::Show(view))
    }

    /// Album list when the artist has albums, else the artist's tracks.
    async fn artist_view(&self, artist: &str, page: usize) -> Result<View> {
        let albums = self.store.find_albums_by_artist(artist).await?;
        if albums.is_empty() {
            self.artist_tracks(artist, page).await
        } else {
            self.album_list(artist, &albums, page)
        }
    }

    async fn artist_list(&self, page: usize) -> Result<View> {
        let artists = self.store.list_artists().await?;
        if artists.is_empty() {
            return Ok(View::text("📭 The catalog is empty."));
        }

        let desc = PageDescriptor::new(artists.len(), self.pages.artists_per_page, page);
        let mut view = View::text(format!(
            "👥 Artists: {}\nPage {}",
            artists.len(),
            desc.indicator()
        ));

        for artist in desc.slice(&artists) {
            view.push_button(self.codec.button(
                format!("👤 {}", artist),
                &Action::Artist {
                    artist: artist.clone(),
                    page: 0,
                },
            )?);
        }

        if let Some(row) = nav_row(&desc, &self.codec, |page| Action::ArtistsPage { page })? {
            view.push_row(row);
        }
        Ok(view)
    }

    fn album_list(&self, artist: &str, albums: &[String], page: usize) -> Result<View> {
        let desc = PageDescriptor::new(albums.len(), self.pages.albums_per_page, page);
        let mut view = View::text(format!("👤 {}\n💿 Albums: {}", artist, albums.len()));

        for album in desc.slice(albums) {
            view.push_button(self.codec.button(
                format!("💿 {}", album),
                &Action::AlbumTracks {
                    artist: artist.to_string(),
                    album: album.clone(),
                    page: 0,
                },
            )?);
        }

        if let Some(row) = nav_row(&desc, &self.codec, |page| Action::Albums {
            artist: artist.to_string(),
            page,
        })? {
            view.push_row(row);
        }

        view.push_button(self.codec.button("⬅️ Back to artists", &Action::BackToArtists)?);
        Ok(view)
    }

    async fn album_tracks(&self, artist: &str, album: &str, page: usize) -> Result<View> {
        let items = self.store.find_by_album(artist, album).await?;
        let back = self.codec.button(
            "⬅️ Back to albums",
            &Action::BackToAlbums {
                artist: artist.to_string(),
            },
        )?;

        if items.is_empty() {
            let mut view = View::text("❌ No tracks found for this album.");
            view.push_button(back);
            return Ok(view);
        }

        let desc = PageDescriptor::new(items.len(), self.pages.tracks_per_page, page);
        let header = format!("💿 {}\n👤 {}\n🎵 Tracks: {}", album, artist, items.len());
        let mut view = self.track_list(header, &items, &desc)?;

        if let Some(row) = nav_row(&desc, &self.codec, |page| Action::AlbumTracks {
            artist: artist.to_string(),
            album: album.to_string(),
            page,
        })? {
            view.push_row(row);
        }

        view.push_button(self.codec.button(
            format!("⬇️ Download album ({})", items.len()),
            &Action::DownloadAlbum {
                artist: artist.to_string(),
                album: album.to_string(),
            },
        )?);
        view.push_button(back);
        Ok(view)
    }

    /// Tracks of an artist that has no albums.
    async fn artist_tracks(&self, artist: &str, page: usize) -> Result<View> {
        let items = self
            .store
            .find_by_artist(artist, true, self.search.no_album_cap)
            .await?;
        let back = self.codec.button("⬅️ Back to artists", &Action::BackToArtists)?;

        if items.is_empty() {
            let mut view = View::text(format!("❌ No tracks found for {}.", artist));
            view.push_button(back);
            return Ok(view);
        }

        let desc = PageDescriptor::new(items.len(), self.pages.tracks_per_page, page);
        let header = format!("👤 {}\n🎵 Tracks: {}", artist, items.len());
        let mut view = self.track_list(header, &items, &desc)?;

        if let Some(row) = nav_row(&desc, &self.codec, |page| Action::Artist {
            artist: artist.to_string(),
            page,
        })? {
            view.push_row(row);
        }

        view.push_button(self.codec.button(
            format!("⬇️ Download all ({})", items.len()),
            &Action::DownloadAll {
                artist: artist.to_string(),
            },
        )?);
        view.push_button(back);
        Ok(view)
    }

    fn search_results(&self, query: &str, items: &[CatalogItem], page: usize) -> Result<View> {
        let desc = PageDescriptor::new(items.len(), self.pages.tracks_per_page, page);
        let header = format!("🔍 Found {} tracks for \"{}\"", items.len(), query);
        let mut view = self.track_list(header, items, &desc)?;

        if let Some(row) = nav_row(&desc, &self.codec, |page| Action::Search {
            query: query.to_string(),
            page,
        })? {
            view.push_row(row);
        }
        Ok(view)
    }

    /// Numbered listing of the current page plus one button per track.
    fn track_list(&self, header: String, items: &[CatalogItem], desc: &PageDescriptor) -> Result<View> {
        let mut text = header;
        text.push('\n');

        let mut buttons = Vec::new();
        for (i, item) in desc.slice(items).iter().enumerate() {
            let number = desc.offset() + i + 1;
            text.push_str(&format!(
                "\n{}. {} - {}",
                number, item.title, item.artist
            ));
            if let Some(genre) = &item.genre {
                text.push_str(&format!(" • {}", genre));
            }
            text.push_str(&format!(" • {}", item.duration_formatted()));

            buttons.push(self.codec.button(
                format!("🎵 {}. {}", number, item.title),
                &Action::Track { id: item.id },
            )?);
        }

        let mut view = View::text(text);
        for button in buttons {
            view.push_button(button);
        }
        Ok(view)
    }
}

fn no_results(query: &str) -> View {
    View::text(format!("❌ Nothing found for \"{}\".", query))
}

fn bulk(label: String, items: Vec<CatalogItem>) -> Outcome {
    if items.is_empty() {
        Outcome::Show(View::text("❌ No tracks to send."))
    } else {
        Outcome::DeliverMany { label, items }
    }
}
