//! Database module for catalog item persistence.
//!
//! Uses SQLx with SQLite for lightweight, embedded database storage.
//! Provides async operations for:
//! - Item insertion and lookup by id or external reference
//! - Case-insensitive substring search across title/artist/album
//! - Artist/album browsing queries
//! - Album backfill for the enrichment job
//!
//! The free functions operate directly on a pool. Higher layers go through
//! the [`RecordStore`] trait so they can be tested against mocks.
//!
//! # Example
//!
//! ```ignore
//! use catalog_bot::db::{init_db, find_albums_by_artist};
//!
//! let pool = init_db("sqlite:catalog.db").await?;
//! let albums = find_albums_by_artist(&pool, "weeknd").await?;
//! ```

mod store;

pub use store::{RecordStore, SqliteStore};

use chrono::Utc;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::model::{CatalogItem, CatalogStats, NewItem};

/// Default database filename.
pub const DEFAULT_DB_NAME: &str = "catalog.db";

const ITEM_COLUMNS: &str =
    "id, external_ref, title, artist, album, genre, duration, tags, created_at";

/// Columns a substring search can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Artist,
    Album,
}

impl SearchField {
    /// Fields used by the free-text search.
    pub const ALL: [SearchField; 3] = [SearchField::Title, SearchField::Artist, SearchField::Album];

    /// Folded column matched by [`like_pattern`].
    fn column(self) -> &'static str {
        match self {
            SearchField::Title => "title_lc",
            SearchField::Artist => "artist_lc",
            SearchField::Album => "album_lc",
        }
    }
}

/// Build a SQLite database URL from an optional path.
///
/// If no path is provided, uses [`DEFAULT_DB_NAME`] in the current directory.
pub fn db_url(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => format!("sqlite:{}", p.display()),
        None => format!("sqlite:{}", DEFAULT_DB_NAME),
    }
}

/// Initialize the database connection pool and run migrations.
///
/// Creates the database file if it doesn't exist, establishes a connection
/// pool with up to 5 connections, and runs all pending migrations.
///
/// # Errors
///
/// Returns an error if:
/// - Database creation fails
/// - Connection cannot be established
/// - Migration fails
pub async fn init_db(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    if !sqlx::Sqlite::database_exists(db_url).await.unwrap_or(false) {
        sqlx::Sqlite::create_database(db_url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    backfill_folded(&pool).await?;

    Ok(pool)
}

/// Unicode lowercase used for every case-insensitive match.
///
/// Stored columns and query patterns must both go through this.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Fill the folded columns of rows written before they existed.
async fn backfill_folded(pool: &SqlitePool) -> sqlx::Result<()> {
    let rows: Vec<(i64, String, String, Option<String>)> = sqlx::query_as(
        "SELECT id, title, artist, album FROM items WHERE title_lc IS NULL OR artist_lc IS NULL",
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Ok(());
    }

    tracing::info!("Backfilling folded search columns for {} items", rows.len());
    let mut tx = pool.begin().await?;
    for (id, title, artist, album) in rows {
        sqlx::query("UPDATE items SET title_lc = ?, artist_lc = ?, album_lc = ? WHERE id = ?")
            .bind(fold(&title))
            .bind(fold(&artist))
            .bind(album.as_deref().map(fold))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

/// Build a `LIKE` pattern matching `query` anywhere, folded with [`fold`].
///
/// `%`, `_` and the escape character itself are escaped with `\`.
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in fold(query).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Insert a new item.
///
/// Fails with a unique-constraint violation if `external_ref` is taken;
/// see [`is_unique_violation`].
pub async fn insert_item(pool: &SqlitePool, item: &NewItem) -> sqlx::Result<CatalogItem> {
    let created_at = Utc::now().to_rfc3339();

    sqlx::query_as::<_, CatalogItem>(&format!(
        r#"
        INSERT INTO items (
            external_ref, title, artist, album, genre, duration, tags, created_at,
            title_lc, artist_lc, album_lc
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(&item.external_ref)
    .bind(&item.title)
    .bind(&item.artist)
    .bind(&item.album)
    .bind(&item.genre)
    .bind(item.duration)
    .bind(&item.tags)
    .bind(&created_at)
    .bind(fold(&item.title))
    .bind(fold(&item.artist))
    .bind(item.album.as_deref().map(fold))
    .fetch_one(pool)
    .await
}

/// Whether an error is SQLite rejecting a duplicate unique key.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Get an item by its database ID.
pub async fn get_item(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<CatalogItem>> {
    sqlx::query_as::<_, CatalogItem>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Get an item by its delivery channel reference.
pub async fn find_by_external_ref(
    pool: &SqlitePool,
    external_ref: &str,
) -> sqlx::Result<Option<CatalogItem>> {
    sqlx::query_as::<_, CatalogItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE external_ref = ?"
    ))
    .bind(external_ref)
    .fetch_optional(pool)
    .await
}

/// Case-insensitive substring search over the given fields.
///
/// An empty field set matches nothing.
pub async fn find_by_substring(
    pool: &SqlitePool,
    fields: &[SearchField],
    query: &str,
    limit: u32,
) -> sqlx::Result<Vec<CatalogItem>> {
    if fields.is_empty() {
        return Ok(Vec::new());
    }

    let conditions = fields
        .iter()
        .map(|f| format!("{} LIKE ? ESCAPE '\\'", f.column()))
        .collect::<Vec<_>>()
        .join(" OR ");
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE {conditions} ORDER BY id LIMIT ?"
    );

    let pattern = like_pattern(query);
    let mut q = sqlx::query_as::<_, CatalogItem>(&sql);
    for _ in fields {
        q = q.bind(&pattern);
    }
    let items = q.bind(limit as i64).fetch_all(pool).await?;

    tracing::debug!("Search '{}' found {} items", query, items.len());
    Ok(items)
}

/// Distinct album names of artists matching `artist` (substring), sorted.
pub async fn find_albums_by_artist(pool: &SqlitePool, artist: &str) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT album FROM items
        WHERE artist_lc LIKE ? ESCAPE '\'
          AND album IS NOT NULL AND album != ''
        ORDER BY album
        "#,
    )
    .bind(like_pattern(artist))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(album,)| album).collect())
}

/// Items on `album` by artists matching `artist` (substring), by title.
pub async fn find_by_album(
    pool: &SqlitePool,
    artist: &str,
    album: &str,
) -> sqlx::Result<Vec<CatalogItem>> {
    sqlx::query_as::<_, CatalogItem>(&format!(
        r#"
        SELECT {ITEM_COLUMNS} FROM items
        WHERE artist_lc LIKE ? ESCAPE '\' AND album = ?
        ORDER BY title
        "#
    ))
    .bind(like_pattern(artist))
    .bind(album)
    .fetch_all(pool)
    .await
}

/// Items by artists matching `artist` (substring), by title, capped at `limit`.
///
/// With `no_album_only`, items that already have an album are excluded.
pub async fn find_by_artist(
    pool: &SqlitePool,
    artist: &str,
    no_album_only: bool,
    limit: u32,
) -> sqlx::Result<Vec<CatalogItem>> {
    let album_filter = if no_album_only {
        "AND (album IS NULL OR album = '')"
    } else {
        ""
    };

    sqlx::query_as::<_, CatalogItem>(&format!(
        r#"
        SELECT {ITEM_COLUMNS} FROM items
        WHERE artist_lc LIKE ? ESCAPE '\' {album_filter}
        ORDER BY title
        LIMIT ?
        "#
    ))
    .bind(like_pattern(artist))
    .bind(limit as i64)
    .fetch_all(pool)
    .await
}

/// All distinct artist names, sorted.
pub async fn list_artists(pool: &SqlitePool) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT DISTINCT artist FROM items ORDER BY artist")
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(|(artist,)| artist).collect())
}

/// Set the album of one item, returning the updated row.
///
/// Returns `None` if no item has that id.
pub async fn update_album(
    pool: &SqlitePool,
    id: i64,
    album: &str,
) -> sqlx::Result<Option<CatalogItem>> {
    sqlx::query_as::<_, CatalogItem>(&format!(
        "UPDATE items SET album = ?, album_lc = ? WHERE id = ? RETURNING {ITEM_COLUMNS}"
    ))
    .bind(album)
    .bind(fold(album))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Number of items without an album.
pub async fn count_missing_album(pool: &SqlitePool) -> sqlx::Result<i64> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM items WHERE album IS NULL OR album = ''")
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

/// Items without an album, oldest first.
pub async fn list_missing_album(pool: &SqlitePool, limit: u32) -> sqlx::Result<Vec<CatalogItem>> {
    sqlx::query_as::<_, CatalogItem>(&format!(
        r#"
        SELECT {ITEM_COLUMNS} FROM items
        WHERE album IS NULL OR album = ''
        ORDER BY id
        LIMIT ?
        "#
    ))
    .bind(limit as i64)
    .fetch_all(pool)
    .await
}

/// Aggregate statistics for `/stats` and `/album_stats`.
pub async fn get_stats(pool: &SqlitePool) -> sqlx::Result<CatalogStats> {
    let (total_items, unique_artists, unique_albums, genres, missing_album, last_upload): (
        i64,
        i64,
        i64,
        i64,
        i64,
        Option<String>,
    ) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(DISTINCT artist),
            COUNT(DISTINCT album),
            COUNT(DISTINCT genre),
            COALESCE(SUM(CASE WHEN album IS NULL OR album = '' THEN 1 ELSE 0 END), 0),
            MAX(created_at)
        FROM items
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(CatalogStats {
        total_items,
        unique_artists,
        unique_albums,
        genres,
        missing_album,
        last_upload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_new_item, temp_db};

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("AC/DC"), "%ac/dc%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("Émilie КИНО"), "%émilie кино%");
    }

    #[tokio::test]
    async fn test_init_db_creates_database() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite:{}", db_path.display());

        let pool = init_db(&db_url).await.expect("Failed to init db");
        assert!(db_path.exists());

        let artists = list_artists(&pool).await.expect("Failed to query artists");
        assert!(artists.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let (pool, _dir) = temp_db().await;

        let item = insert_item(&pool, &mock_new_item("ref-1", "Song", "Artist", None))
            .await
            .unwrap();
        assert!(item.id > 0);
        assert!(!item.created_at.is_empty());

        let by_ref = find_by_external_ref(&pool, "ref-1").await.unwrap().unwrap();
        assert_eq!(by_ref, item);

        let by_id = get_item(&pool, item.id).await.unwrap().unwrap();
        assert_eq!(by_id.title, "Song");
        assert!(find_by_external_ref(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_external_ref_is_unique_violation() {
        let (pool, _dir) = temp_db().await;

        insert_item(&pool, &mock_new_item("dup", "A", "B", None))
            .await
            .unwrap();
        let err = insert_item(&pool, &mock_new_item("dup", "C", "D", None))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_substring_search_is_case_insensitive() {
        let (pool, _dir) = temp_db().await;
        insert_item(&pool, &mock_new_item("1", "Blinding Lights", "The Weeknd", Some("After Hours")))
            .await
            .unwrap();
        insert_item(&pool, &mock_new_item("2", "Starboy", "The Weeknd", None))
            .await
            .unwrap();
        insert_item(&pool, &mock_new_item("3", "Levitating", "Dua Lipa", None))
            .await
            .unwrap();

        let hits = find_by_substring(&pool, &SearchField::ALL, "WEEKND", 50)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);

        let by_album = find_by_substring(&pool, &[SearchField::Album], "after", 50)
            .await
            .unwrap();
        assert_eq!(by_album.len(), 1);

        let capped = find_by_substring(&pool, &SearchField::ALL, "e", 1).await.unwrap();
        assert_eq!(capped.len(), 1);

        assert!(find_by_substring(&pool, &[], "e", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_albums_and_album_tracks() {
        let (pool, _dir) = temp_db().await;
        insert_item(&pool, &mock_new_item("1", "B Song", "Queen", Some("Jazz")))
            .await
            .unwrap();
        insert_item(&pool, &mock_new_item("2", "A Song", "Queen", Some("Jazz")))
            .await
            .unwrap();
        insert_item(&pool, &mock_new_item("3", "Other", "Queen", Some("A Night at the Opera")))
            .await
            .unwrap();
        insert_item(&pool, &mock_new_item("4", "Loose", "Queen", None))
            .await
            .unwrap();

        let albums = find_albums_by_artist(&pool, "queen").await.unwrap();
        assert_eq!(albums, vec!["A Night at the Opera", "Jazz"]);

        let tracks = find_by_album(&pool, "queen", "Jazz").await.unwrap();
        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A Song", "B Song"]);

        let all = find_by_artist(&pool, "QUEEN", false, 30).await.unwrap();
        assert_eq!(all.len(), 4);

        let loose = find_by_artist(&pool, "queen", true, 30).await.unwrap();
        assert_eq!(loose.len(), 1);
        assert_eq!(loose[0].title, "Loose");
    }

    #[tokio::test]
    async fn test_non_ascii_matching_ignores_case() {
        let (pool, _dir) = temp_db().await;
        insert_item(&pool, &mock_new_item("1", "Кукушка", "Кино", Some("Группа крови")))
            .await
            .unwrap();
        insert_item(&pool, &mock_new_item("2", "Désert", "Émilie Simon", None))
            .await
            .unwrap();

        for query in ["Кино", "кино", "КИНО"] {
            let hits = find_by_substring(&pool, &SearchField::ALL, query, 50)
                .await
                .unwrap();
            assert_eq!(hits.len(), 1, "search {}", query);
            assert_eq!(
                find_albums_by_artist(&pool, query).await.unwrap(),
                vec!["Группа крови"],
                "albums {}",
                query
            );
            assert_eq!(
                find_by_album(&pool, query, "Группа крови").await.unwrap().len(),
                1,
                "album tracks {}",
                query
            );
        }

        for query in ["Émilie Simon", "émilie", "ÉMILIE SIMON"] {
            let hits = find_by_substring(&pool, &SearchField::ALL, query, 50)
                .await
                .unwrap();
            assert_eq!(hits.len(), 1, "search {}", query);
            assert_eq!(
                find_by_artist(&pool, query, true, 30).await.unwrap().len(),
                1,
                "artist tracks {}",
                query
            );
        }

        let by_album = find_by_substring(&pool, &[SearchField::Album], "ГРУППА", 50)
            .await
            .unwrap();
        assert_eq!(by_album[0].title, "Кукушка");
    }

    #[tokio::test]
    async fn test_updated_album_is_searchable_in_any_case() {
        let (pool, _dir) = temp_db().await;
        let item = insert_item(&pool, &mock_new_item("1", "Désert", "Émilie Simon", None))
            .await
            .unwrap();

        update_album(&pool, item.id, "Végétal").await.unwrap();

        let hits = find_by_substring(&pool, &[SearchField::Album], "VÉGÉTAL", 50)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(find_albums_by_artist(&pool, "émilie").await.unwrap(), vec!["Végétal"]);
    }

    #[tokio::test]
    async fn test_backfill_folds_rows_without_folded_columns() {
        let (pool, _dir) = temp_db().await;
        sqlx::query(
            "INSERT INTO items (external_ref, title, artist, album, created_at) \
             VALUES ('old', 'Звезда', 'Кино', 'Последний герой', '2024-01-01T00:00:00+00:00')",
        )
        .execute(&pool)
        .await
        .unwrap();
        assert!(
            find_by_substring(&pool, &SearchField::ALL, "кино", 10)
                .await
                .unwrap()
                .is_empty()
        );

        backfill_folded(&pool).await.unwrap();

        let hits = find_by_substring(&pool, &SearchField::ALL, "КИНО", 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(
            find_albums_by_artist(&pool, "кино").await.unwrap(),
            vec!["Последний герой"]
        );
    }

    #[tokio::test]
    async fn test_missing_album_backlog_and_update() {
        let (pool, _dir) = temp_db().await;
        let first = insert_item(&pool, &mock_new_item("1", "One", "X", None))
            .await
            .unwrap();
        insert_item(&pool, &mock_new_item("2", "Two", "X", None))
            .await
            .unwrap();
        insert_item(&pool, &mock_new_item("3", "Three", "X", Some("Has")))
            .await
            .unwrap();

        assert_eq!(count_missing_album(&pool).await.unwrap(), 2);
        let backlog = list_missing_album(&pool, 10).await.unwrap();
        assert_eq!(backlog[0].id, first.id);

        let updated = update_album(&pool, first.id, "Found").await.unwrap().unwrap();
        assert_eq!(updated.album.as_deref(), Some("Found"));
        assert_eq!(count_missing_album(&pool).await.unwrap(), 1);

        assert!(update_album(&pool, 9999, "Nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats() {
        let (pool, _dir) = temp_db().await;
        let empty = get_stats(&pool).await.unwrap();
        assert_eq!(empty.total_items, 0);
        assert!(empty.last_upload.is_none());

        insert_item(&pool, &mock_new_item("1", "One", "X", Some("Al")))
            .await
            .unwrap();
        insert_item(&pool, &mock_new_item("2", "Two", "Y", None))
            .await
            .unwrap();

        let stats = get_stats(&pool).await.unwrap();
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.unique_artists, 2);
        assert_eq!(stats.unique_albums, 1);
        assert_eq!(stats.missing_album, 1);
        assert!(stats.last_upload.is_some());
        assert_eq!(list_artists(&pool).await.unwrap(), vec!["X", "Y"]);
    }
}
