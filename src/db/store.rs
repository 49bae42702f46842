//! Record store abstraction.
//!
//! The navigation engine, enrichment job and upload intake only see this
//! trait. [`SqliteStore`] is the production implementation; tests can use
//! it against a temp database or substitute their own.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

use super::SearchField;
use crate::model::{CatalogItem, CatalogStats, NewItem};

/// Persistence contract for catalog items.
///
/// All substring matches are case-insensitive.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, item: &NewItem) -> sqlx::Result<CatalogItem>;

    async fn get(&self, id: i64) -> sqlx::Result<Option<CatalogItem>>;

    async fn find_by_external_ref(&self, external_ref: &str) -> sqlx::Result<Option<CatalogItem>>;

    async fn find_by_substring(
        &self,
        fields: &[SearchField],
        query: &str,
        limit: u32,
    ) -> sqlx::Result<Vec<CatalogItem>>;

    async fn find_albums_by_artist(&self, artist: &str) -> sqlx::Result<Vec<String>>;

    async fn find_by_album(&self, artist: &str, album: &str) -> sqlx::Result<Vec<CatalogItem>>;

    async fn find_by_artist(
        &self,
        artist: &str,
        no_album_only: bool,
        limit: u32,
    ) -> sqlx::Result<Vec<CatalogItem>>;

    async fn list_artists(&self) -> sqlx::Result<Vec<String>>;

    async fn update_album(&self, id: i64, album: &str) -> sqlx::Result<Option<CatalogItem>>;

    async fn count_missing_album(&self) -> sqlx::Result<i64>;

    async fn list_missing_album(&self, limit: u32) -> sqlx::Result<Vec<CatalogItem>>;

    async fn stats(&self) -> sqlx::Result<CatalogStats>;
}

/// [`RecordStore`] backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, item: &NewItem) -> sqlx::Result<CatalogItem> {
        super::insert_item(&self.pool, item).await
    }

    async fn get(&self, id: i64) -> sqlx::Result<Option<CatalogItem>> {
        super::get_item(&self.pool, id).await
    }

    async fn find_by_external_ref(&self, external_ref: &str) -> sqlx::Result<Option<CatalogItem>> {
        super::find_by_external_ref(&self.pool, external_ref).await
    }

    async fn find_by_substring(
        &self,
        fields: &[SearchField],
        query: &str,
        limit: u32,
    ) -> sqlx::Result<Vec<CatalogItem>> {
        super::find_by_substring(&self.pool, fields, query, limit).await
    }

    async fn find_albums_by_artist(&self, artist: &str) -> sqlx::Result<Vec<String>> {
        super::find_albums_by_artist(&self.pool, artist).await
    }

    async fn find_by_album(&self, artist: &str, album: &str) -> sqlx::Result<Vec<CatalogItem>> {
        super::find_by_album(&self.pool, artist, album).await
    }

    async fn find_by_artist(
        &self,
        artist: &str,
        no_album_only: bool,
        limit: u32,
    ) -> sqlx::Result<Vec<CatalogItem>> {
        super::find_by_artist(&self.pool, artist, no_album_only, limit).await
    }

    async fn list_artists(&self) -> sqlx::Result<Vec<String>> {
        super::list_artists(&self.pool).await
    }

    async fn update_album(&self, id: i64, album: &str) -> sqlx::Result<Option<CatalogItem>> {
        super::update_album(&self.pool, id, album).await
    }

    async fn count_missing_album(&self) -> sqlx::Result<i64> {
        super::count_missing_album(&self.pool).await
    }

    async fn list_missing_album(&self, limit: u32) -> sqlx::Result<Vec<CatalogItem>> {
        super::list_missing_album(&self.pool, limit).await
    }

    async fn stats(&self) -> sqlx::Result<CatalogStats> {
        super::get_stats(&self.pool).await
    }
}
