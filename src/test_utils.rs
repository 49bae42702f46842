//! Test utilities and fixtures for catalog-bot tests.
//!
//! This module provides common test helpers, mock factories, and
//! database utilities to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use catalog_bot::test_utils::{temp_store, seed};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (store, _dir) = temp_store().await;
//!     seed(&store, &[("Song", "Artist", None)]).await;
//!     // ... test logic
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tempfile::TempDir;

use crate::db::{RecordStore, SearchField, SqliteStore};
use crate::model::{CatalogItem, CatalogStats, NewItem};

/// Creates a temporary database for testing.
///
/// The database is created in a temporary directory that is automatically
/// cleaned up when the returned `TempDir` is dropped. Migrations are run
/// automatically.
///
/// Keep the TempDir alive for the duration of your test.
pub async fn temp_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = format!("sqlite:{}", db_path.display());

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (pool, dir)
}

/// Same as [`temp_db`] but wrapped in a shareable [`SqliteStore`].
pub async fn temp_store() -> (Arc<SqliteStore>, TempDir) {
    let (pool, dir) = temp_db().await;
    (Arc::new(SqliteStore::new(pool)), dir)
}

/// Creates a NewItem with the given identity and metadata.
pub fn mock_new_item(external_ref: &str, title: &str, artist: &str, album: Option<&str>) -> NewItem {
    NewItem {
        external_ref: external_ref.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.map(String::from),
        duration: Some(180),
        ..Default::default()
    }
}

/// Creates a CatalogItem without touching a database.
pub fn mock_item(id: i64, title: &str, artist: &str, album: Option<&str>) -> CatalogItem {
    CatalogItem {
        id,
        external_ref: format!("ref-{}", id),
        title: title.to_string(),
        artist: artist.to_string(),
        album: album.map(String::from),
        genre: None,
        duration: Some(180),
        tags: None,
        created_at: "2025-01-01T00:00:00+00:00".to_string(),
    }
}

/// Inserts `(title, artist, album)` rows, generating unique external refs.
pub async fn seed(store: &dyn RecordStore, rows: &[(&str, &str, Option<&str>)]) -> Vec<CatalogItem> {
    let mut items = Vec::with_capacity(rows.len());
    for (i, (title, artist, album)) in rows.iter().enumerate() {
        let external_ref = format!("seed-{}-{}", i, title);
        let item = store
            .insert(&mock_new_item(&external_ref, title, artist, *album))
            .await
            .expect("Failed to seed item");
        items.push(item);
    }
    items
}

/// Store whose every call fails, for exercising error paths.
pub struct FailingStore;

fn failure() -> sqlx::Error {
    sqlx::Error::Protocol("simulated store failure".to_string())
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn insert(&self, _item: &NewItem) -> sqlx::Result<CatalogItem> {
        Err(failure())
    }

    async fn get(&self, _id: i64) -> sqlx::Result<Option<CatalogItem>> {
        Err(failure())
    }

    async fn find_by_external_ref(&self, _external_ref: &str) -> sqlx::Result<Option<CatalogItem>> {
        Err(failure())
    }

    async fn find_by_substring(
        &self,
        _fields: &[SearchField],
        _query: &str,
        _limit: u32,
    ) -> sqlx::Result<Vec<CatalogItem>> {
        Err(failure())
    }

    async fn find_albums_by_artist(&self, _artist: &str) -> sqlx::Result<Vec<String>> {
        Err(failure())
    }

    async fn find_by_album(&self, _artist: &str, _album: &str) -> sqlx::Result<Vec<CatalogItem>> {
        Err(failure())
    }

    async fn find_by_artist(
        &self,
        _artist: &str,
        _no_album_only: bool,
        _limit: u32,
    ) -> sqlx::Result<Vec<CatalogItem>> {
        Err(failure())
    }

    async fn list_artists(&self) -> sqlx::Result<Vec<String>> {
        Err(failure())
    }

    async fn update_album(&self, _id: i64, _album: &str) -> sqlx::Result<Option<CatalogItem>> {
        Err(failure())
    }

    async fn count_missing_album(&self) -> sqlx::Result<i64> {
        Err(failure())
    }

    async fn list_missing_album(&self, _limit: u32) -> sqlx::Result<Vec<CatalogItem>> {
        Err(failure())
    }

    async fn stats(&self) -> sqlx::Result<CatalogStats> {
        Err(failure())
    }
}
