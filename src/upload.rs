//! Admin-only intake of new catalog items.
//!
//! An upload arrives with whatever tags the channel extracted. The intake
//! normalizes title and artist, rejects duplicates by external reference,
//! optionally looks up the album, and inserts the item. A unique-constraint
//! violation on insert (a concurrent upload of the same asset) is reported
//! the same way as a duplicate found up front.

use std::collections::HashSet;
use std::sync::Arc;

use crate::channel::Presenter;
use crate::config::{self, BotConfig};
use crate::db::{RecordStore, is_unique_violation};
use crate::enrichment::{MetadataResolver, ResolvedMetadata};
use crate::error::{Error, Result, ResultExt};
use crate::model::{CatalogItem, NewItem, UNKNOWN_ARTIST, UNKNOWN_TITLE, format_duration, is_placeholder_artist};

/// Extensions stripped from titles that came from a file name
const AUDIO_EXTENSIONS: [&str; 5] = [".mp3", ".m4a", ".flac", ".wav", ".ogg"];

/// An audio file as received from the channel
#[derive(Debug, Clone, Default)]
pub struct AudioUpload {
    pub user_id: i64,
    /// Channel-side storage reference
    pub external_ref: String,
    /// Title tag
    pub title: Option<String>,
    /// Performer tag
    pub performer: Option<String>,
    pub file_name: Option<String>,
    /// Seconds
    pub duration: Option<i64>,
}

/// What happened to the album during intake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumLookup {
    Found(String),
    NotFound,
    /// Artist or title unknown, or title is just the file name
    MissingTags,
    /// Auto-fetch switched off in config
    Disabled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Denied,
    AlreadyExists(CatalogItem),
    Saved {
        item: CatalogItem,
        album_lookup: AlbumLookup,
    },
}

impl UploadOutcome {
    /// User-facing text.
    pub fn message(&self) -> String {
        match self {
            UploadOutcome::Denied => "⛔️ Access Denied\n\n\
                 Only administrators can upload tracks.\n\
                 Contact the bot owner if you need access."
                .to_string(),
            UploadOutcome::AlreadyExists(existing) => {
                let mut text = format!(
                    "⚠️ Track already exists\n\n🎵 {}\n👤 {}\n",
                    existing.title, existing.artist
                );
                if let Some(album) = &existing.album {
                    text.push_str(&format!("💿 {}\n", album));
                }
                text.push_str(&format!("\n📊 Track ID: {}", existing.id));
                text
            }
            UploadOutcome::Saved { item, album_lookup } => {
                let mut text = String::new();
                match album_lookup {
                    AlbumLookup::Found(album) => {
                        text.push_str(&format!("✅ Album found: {}\n\n", album))
                    }
                    AlbumLookup::NotFound => text.push_str(
                        "ℹ️ Album not found in databases. Saved without album information.\n\n",
                    ),
                    AlbumLookup::MissingTags => text.push_str(
                        "ℹ️ No metadata in file. Send files with artist/title tags for automatic album detection.\n\n",
                    ),
                    AlbumLookup::Disabled => {}
                }

                text.push_str(&format!(
                    "✅ Track saved successfully!\n\n🎵 Title: {}\n👤 Artist: {}\n",
                    item.title, item.artist
                ));
                if let Some(album) = &item.album {
                    text.push_str(&format!("💿 Album: {}\n", album));
                }
                if let Some(genre) = &item.genre {
                    text.push_str(&format!("🎼 Genre: {}\n", genre));
                }
                if item.duration.is_some() {
                    text.push_str(&format!("⏱ Duration: {}\n", format_duration(item.duration)));
                }
                text.push_str(&format!("\n📊 Track ID: {}", item.id));
                text
            }
        }
    }
}

/// Static admin allow-list
#[derive(Debug, Clone, Default)]
pub struct AdminList {
    ids: HashSet<i64>,
}

impl AdminList {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Config admins plus a comma-separated `ADMIN_IDS`-style list.
    ///
    /// A malformed list is logged and ignored.
    pub fn from_config(bot: &BotConfig, env_ids: Option<&str>) -> Self {
        let mut admins = Self::new(bot.admins.iter().copied());
        if let Some(raw) = env_ids {
            match config::parse_admin_ids(raw) {
                Ok(ids) => admins.ids.extend(ids),
                Err(e) => tracing::error!("Ignoring ADMIN_IDS: {}", e),
            }
        }
        admins
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

pub struct UploadIntake {
    store: Arc<dyn RecordStore>,
    resolver: Arc<MetadataResolver>,
    admins: Arc<AdminList>,
    auto_fetch: bool,
}

impl UploadIntake {
    pub fn new(
        store: Arc<dyn RecordStore>,
        resolver: Arc<MetadataResolver>,
        admins: Arc<AdminList>,
        auto_fetch: bool,
    ) -> Self {
        Self {
            store,
            resolver,
            admins,
            auto_fetch,
        }
    }

    pub async fn intake(&self, upload: &AudioUpload, presenter: &dyn Presenter) -> Result<UploadOutcome> {
        if !self.admins.is_admin(upload.user_id) {
            tracing::warn!("Unauthorized upload attempt by user {}", upload.user_id);
            return Ok(UploadOutcome::Denied);
        }

        let (title, from_file_name) = normalize_title(upload);
        let artist = upload
            .performer
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(UNKNOWN_ARTIST)
            .to_string();

        tracing::info!("User {} uploading: {} by {}", upload.user_id, title, artist);

        if let Some(existing) = self
            .store
            .find_by_external_ref(&upload.external_ref)
            .await
            .with_context("checking for duplicate upload")?
        {
            tracing::warn!("Duplicate upload attempt: {}", upload.external_ref);
            return Ok(UploadOutcome::AlreadyExists(existing));
        }

        let mut resolved = ResolvedMetadata::default();
        let album_lookup = if !self.auto_fetch {
            AlbumLookup::Disabled
        } else if is_placeholder_artist(&artist) || title == UNKNOWN_TITLE || from_file_name {
            tracing::info!("Skipping album lookup: incomplete track info");
            AlbumLookup::MissingTags
        } else {
            presenter.status("🔍 Searching for album information...").await;
            resolved = self.resolver.enrich(&artist, &title, None, None).await;
            match &resolved.album {
                Some(album) => AlbumLookup::Found(album.clone()),
                None => AlbumLookup::NotFound,
            }
        };

        let new_item = NewItem {
            external_ref: upload.external_ref.clone(),
            title,
            artist,
            album: resolved.album,
            genre: resolved.genre,
            duration: upload
                .duration
                .or(resolved.duration.map(|d| d.as_secs() as i64)),
            ..Default::default()
        };

        match self.store.insert(&new_item).await {
            Ok(item) => {
                tracing::info!(
                    "Item saved: id={} title={} album={:?}",
                    item.id,
                    item.title,
                    item.album
                );
                Ok(UploadOutcome::Saved { item, album_lookup })
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!("Upload raced a duplicate insert: {}", upload.external_ref);
                let existing = self
                    .store
                    .find_by_external_ref(&upload.external_ref)
                    .await
                    .with_context("loading duplicate item")?
                    .ok_or_else(|| Error::not_found(upload.external_ref.clone()))?;
                Ok(UploadOutcome::AlreadyExists(existing))
            }
            Err(e) => Err(Error::Database(e).context("saving uploaded item")),
        }
    }
}

/// Title from the tag, else the file name without its audio extension.
///
/// The flag is true when the title came from the file name.
fn normalize_title(upload: &AudioUpload) -> (String, bool) {
    let tagged = upload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let (raw, from_file_name) = match (tagged, upload.file_name.as_deref()) {
        (Some(title), _) => (title, false),
        (None, Some(name)) if !name.trim().is_empty() => (name.trim(), true),
        _ => (UNKNOWN_TITLE, false),
    };

    (strip_audio_extension(raw).to_string(), from_file_name)
}

fn strip_audio_extension(title: &str) -> &str {
    let lower = title.to_ascii_lowercase();
    AUDIO_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext) && title.len() > ext.len())
        .map(|ext| &title[..title.len() - ext.len()])
        .unwrap_or(title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mocks::RecordingPresenter;
    use crate::enrichment::domain::{EnrichmentError, MetadataSource, ResolvedMetadata};
    use crate::enrichment::musicbrainz::{dto, to_metadata};
    use crate::enrichment::rate_limit::RateLimiter;
    use crate::enrichment::traits::MetadataProvider;
    use crate::enrichment::traits::mocks::MockProvider;
    use crate::test_utils::{mock_new_item, temp_store};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const ADMIN: i64 = 42;

    /// Answers every lookup with a canned MusicBrainz search response.
    struct CannedMusicBrainz {
        body: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataProvider for CannedMusicBrainz {
        fn source(&self) -> MetadataSource {
            MetadataSource::MusicBrainz
        }

        async fn lookup(
            &self,
            _artist: &str,
            _title: &str,
        ) -> std::result::Result<Option<ResolvedMetadata>, EnrichmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response: dto::RecordingSearchResponse = serde_json::from_str(self.body)
                .map_err(|e| EnrichmentError::Parse(e.to_string()))?;
            Ok(to_metadata(response))
        }
    }

    const AFTER_HOURS: &str = r#"{
        "count": 1,
        "recordings": [{
            "id": "rec-1",
            "title": "Blinding Lights",
            "length": 200040,
            "releases": [{
                "id": "rel-1",
                "title": "After Hours",
                "date": "2020-03-20",
                "release-group": {"primary-type": "Album"}
            }],
            "tags": [{"name": "r&b", "count": 3}, {"name": "pop", "count": 7}]
        }]
    }"#;

    fn resolver(provider: Arc<dyn MetadataProvider>) -> Arc<MetadataResolver> {
        Arc::new(MetadataResolver::new(
            vec![provider],
            Arc::new(RateLimiter::new(Duration::from_millis(1))),
        ))
    }

    fn upload(external_ref: &str, title: Option<&str>, performer: Option<&str>) -> AudioUpload {
        AudioUpload {
            user_id: ADMIN,
            external_ref: external_ref.to_string(),
            title: title.map(String::from),
            performer: performer.map(String::from),
            file_name: Some("track01.mp3".to_string()),
            duration: Some(200),
        }
    }

    fn saved(outcome: UploadOutcome) -> (CatalogItem, AlbumLookup) {
        match outcome {
            UploadOutcome::Saved { item, album_lookup } => (item, album_lookup),
            other => panic!("expected saved, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_after_hours_album_is_fetched() {
        let (store, _dir) = temp_store().await;
        let provider = Arc::new(CannedMusicBrainz {
            body: AFTER_HOURS,
            calls: AtomicUsize::new(0),
        });
        let intake = UploadIntake::new(
            store.clone(),
            resolver(provider.clone()),
            Arc::new(AdminList::new([ADMIN])),
            true,
        );

        let outcome = intake
            .intake(
                &upload("file-1", Some("Blinding Lights"), Some("The Weeknd")),
                &RecordingPresenter::default(),
            )
            .await
            .unwrap();

        let (item, lookup) = saved(outcome);
        assert_eq!(lookup, AlbumLookup::Found("After Hours".to_string()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let stored = store.get(item.id).await.unwrap().unwrap();
        assert_eq!(stored.album.as_deref(), Some("After Hours"));
        assert_eq!(stored.genre.as_deref(), Some("Pop"));
        assert_eq!(stored.duration, Some(200));
    }

    #[tokio::test]
    async fn test_non_admin_is_denied() {
        let (store, _dir) = temp_store().await;
        let provider = Arc::new(MockProvider::with_album(MetadataSource::MusicBrainz, "X"));
        let intake = UploadIntake::new(
            store.clone(),
            resolver(provider.clone()),
            Arc::new(AdminList::new([ADMIN])),
            true,
        );

        let mut request = upload("file-1", Some("Song"), Some("Artist"));
        request.user_id = 7;
        let outcome = intake.intake(&request, &RecordingPresenter::default()).await.unwrap();

        assert_eq!(outcome, UploadOutcome::Denied);
        assert_eq!(provider.calls(), 0);
        assert_eq!(store.stats().await.unwrap().total_items, 0);
    }

    #[tokio::test]
    async fn test_duplicate_external_ref() {
        let (store, _dir) = temp_store().await;
        let existing = store
            .insert(&mock_new_item("file-1", "Old", "Artist", Some("LP")))
            .await
            .unwrap();
        let provider = Arc::new(MockProvider::with_album(MetadataSource::MusicBrainz, "X"));
        let intake = UploadIntake::new(
            store,
            resolver(provider.clone()),
            Arc::new(AdminList::new([ADMIN])),
            true,
        );

        let outcome = intake
            .intake(&upload("file-1", Some("New"), Some("Artist")), &RecordingPresenter::default())
            .await
            .unwrap();

        assert_eq!(outcome, UploadOutcome::AlreadyExists(existing));
        assert!(outcome.message().contains("already exists"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_file_name_title_skips_lookup() {
        let (store, _dir) = temp_store().await;
        let provider = Arc::new(MockProvider::with_album(MetadataSource::MusicBrainz, "X"));
        let intake = UploadIntake::new(
            store,
            resolver(provider.clone()),
            Arc::new(AdminList::new([ADMIN])),
            true,
        );

        let outcome = intake
            .intake(&upload("file-1", None, Some("Artist")), &RecordingPresenter::default())
            .await
            .unwrap();

        let (item, lookup) = saved(outcome);
        assert_eq!(item.title, "track01");
        assert_eq!(lookup, AlbumLookup::MissingTags);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_performer_defaults_and_skips_lookup() {
        let (store, _dir) = temp_store().await;
        let provider = Arc::new(MockProvider::with_album(MetadataSource::MusicBrainz, "X"));
        let intake = UploadIntake::new(
            store,
            resolver(provider.clone()),
            Arc::new(AdminList::new([ADMIN])),
            true,
        );

        let outcome = intake
            .intake(&upload("file-1", Some("Song"), None), &RecordingPresenter::default())
            .await
            .unwrap();

        let (item, lookup) = saved(outcome);
        assert_eq!(item.artist, UNKNOWN_ARTIST);
        assert_eq!(lookup, AlbumLookup::MissingTags);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_auto_fetch_disabled() {
        let (store, _dir) = temp_store().await;
        let provider = Arc::new(MockProvider::with_album(MetadataSource::MusicBrainz, "X"));
        let intake = UploadIntake::new(
            store,
            resolver(provider.clone()),
            Arc::new(AdminList::new([ADMIN])),
            false,
        );

        let outcome = intake
            .intake(&upload("file-1", Some("Song"), Some("Artist")), &RecordingPresenter::default())
            .await
            .unwrap();

        let (item, lookup) = saved(outcome);
        assert_eq!(lookup, AlbumLookup::Disabled);
        assert!(item.album.is_none());
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_normalize_title() {
        let mut request = upload("x", None, None);
        request.file_name = Some("Intro.FLAC".to_string());
        assert_eq!(normalize_title(&request), ("Intro".to_string(), true));

        request.title = Some("Song.mp3".to_string());
        assert_eq!(normalize_title(&request), ("Song".to_string(), false));

        request.title = None;
        request.file_name = None;
        assert_eq!(normalize_title(&request), (UNKNOWN_TITLE.to_string(), false));

        assert_eq!(strip_audio_extension(".mp3"), ".mp3");
        assert_eq!(strip_audio_extension("notes.txt"), "notes.txt");
    }

    #[test]
    fn test_admin_list_merges_env() {
        let bot = BotConfig {
            admins: vec![1],
            ..Default::default()
        };

        let admins = AdminList::from_config(&bot, Some("2, 3,"));
        assert!(admins.is_admin(1));
        assert!(admins.is_admin(3));
        assert!(!admins.is_admin(4));
        assert_eq!(admins.len(), 3);

        let fallback = AdminList::from_config(&bot, Some("2,abc"));
        assert!(fallback.is_admin(1));
        assert!(!fallback.is_admin(2));
    }
}
