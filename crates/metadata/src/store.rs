//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult, is_foreign_key_violation, is_unique_violation};
use crate::repos::{ArtworkRepo, UserRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: UserRepo + ArtworkRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store. `:memory:` opens an ephemeral catalog.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();
        let in_memory = path == Path::new(":memory:");

        if !in_memory && let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let mut pool_opts = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; using a single connection avoids
            // persistent "database is locked" failures under test/axum concurrency.
            .max_connections(1);
        if in_memory {
            // The database lives and dies with its only connection.
            pool_opts = pool_opts.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_opts.connect_with(opts).await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(path = %path.display(), "SQLite catalog ready");
        Ok(store)
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

const ARTWORK_VIEW_SELECT: &str = "SELECT a.*, u.username AS owner_username, u.wallet_address AS owner_wallet \
     FROM artworks a JOIN users u ON u.id = a.user_id";

const USER_SUMMARY_SELECT: &str = "SELECT u.*, \
     (SELECT COUNT(*) FROM artworks a WHERE a.user_id = u.id) AS artwork_count \
     FROM users u";

// Implement the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use gallery_core::{ArtworkFilter, ArtworkUpdate, PageRequest, ProfileUpdate};
    use sqlx::QueryBuilder;
    use time::macros::format_description;
    use time::{OffsetDateTime, UtcOffset};

    /// Fixed-width UTC text so `ORDER BY created_at` is chronological.
    pub(super) fn sortable(at: OffsetDateTime) -> MetadataResult<String> {
        at.to_offset(UtcOffset::UTC)
            .format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"
            ))
            .map_err(|e| MetadataError::Internal(format!("timestamp format: {e}")))
    }

    /// Append WHERE clauses for `filter`. Search is case-sensitive.
    fn push_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a ArtworkFilter) {
        qb.push(" WHERE 1 = 1");
        if let Some(file_type) = filter.file_type {
            qb.push(" AND a.file_type = ").push_bind(file_type.as_str());
        }
        if let Some(search) = filter.search.as_deref() {
            qb.push(" AND (instr(a.title, ")
                .push_bind(search)
                .push(") > 0 OR instr(COALESCE(a.description, ''), ")
                .push_bind(search)
                .push(") > 0)");
        }
        if let Some(owner_id) = filter.owner_id {
            qb.push(" AND a.user_id = ").push_bind(owner_id);
        }
    }

    #[async_trait]
    impl UserRepo for SqliteStore {
        async fn upsert_user_by_wallet(
            &self,
            wallet_address: &str,
            now: OffsetDateTime,
        ) -> MetadataResult<(UserRow, bool)> {
            let inserted = sqlx::query_as::<_, UserRow>(
                "INSERT INTO users (wallet_address, created_at) VALUES (?, ?) \
                 ON CONFLICT(wallet_address) DO NOTHING RETURNING *",
            )
            .bind(wallet_address)
            .bind(sortable(now)?)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(user) = inserted {
                return Ok((user, true));
            }

            let existing = self.get_user_by_wallet(wallet_address).await?.ok_or_else(|| {
                MetadataError::Internal(format!(
                    "user for wallet {wallet_address} vanished after conflicting insert"
                ))
            })?;
            Ok((existing, false))
        }

        async fn get_user(&self, user_id: i64) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_wallet(
            &self,
            wallet_address: &str,
        ) -> MetadataResult<Option<UserRow>> {
            let row =
                sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE wallet_address = ?")
                    .bind(wallet_address)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(row)
        }

        async fn get_user_summary(&self, user_id: i64) -> MetadataResult<Option<UserSummaryRow>> {
            let row = sqlx::query_as::<_, UserSummaryRow>(&format!(
                "{USER_SUMMARY_SELECT} WHERE u.id = ?"
            ))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn list_users(&self) -> MetadataResult<Vec<UserSummaryRow>> {
            let rows = sqlx::query_as::<_, UserSummaryRow>(&format!(
                "{USER_SUMMARY_SELECT} ORDER BY u.id"
            ))
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn update_profile(
            &self,
            user_id: i64,
            update: &ProfileUpdate,
        ) -> MetadataResult<UserRow> {
            let mut tx = self.pool.begin().await?;

            // Each field is (present, value); absent fields keep their value.
            let result = sqlx::query_as::<_, UserRow>(
                r#"
                UPDATE users SET
                    username = CASE WHEN ? THEN ? ELSE username END,
                    avatar_url = CASE WHEN ? THEN ? ELSE avatar_url END,
                    bio = CASE WHEN ? THEN ? ELSE bio END,
                    x_handle = CASE WHEN ? THEN ? ELSE x_handle END,
                    discord_handle = CASE WHEN ? THEN ? ELSE discord_handle END
                WHERE id = ?
                RETURNING *
                "#,
            )
            .bind(update.username.is_some())
            .bind(update.username.clone().flatten())
            .bind(update.avatar_url.is_some())
            .bind(update.avatar_url.clone().flatten())
            .bind(update.bio.is_some())
            .bind(update.bio.clone().flatten())
            .bind(update.x_handle.is_some())
            .bind(update.x_handle.clone().flatten())
            .bind(update.discord_handle.is_some())
            .bind(update.discord_handle.clone().flatten())
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await;

            let row = match result {
                Ok(Some(row)) => row,
                Ok(None) => return Err(MetadataError::NotFound(format!("user {user_id}"))),
                Err(e) if is_unique_violation(&e) => {
                    let name = update.username.clone().flatten().unwrap_or_default();
                    return Err(MetadataError::UsernameTaken(name));
                }
                Err(e) => return Err(e.into()),
            };

            tx.commit().await?;
            Ok(row)
        }

        async fn username_exists(&self, username: &str) -> MetadataResult<bool> {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                    .bind(username)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(exists)
        }

        async fn delete_user(&self, user_id: i64) -> MetadataResult<bool> {
            let result = sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }
    }

    #[async_trait]
    impl ArtworkRepo for SqliteStore {
        async fn create_artwork(
            &self,
            artwork: &NewArtwork,
            now: OffsetDateTime,
        ) -> MetadataResult<ArtworkRow> {
            let result = sqlx::query_as::<_, ArtworkRow>(
                r#"
                INSERT INTO artworks (
                    user_id, title, description, file_type, storage_id, file_url,
                    thumbnail_url, file_size, mime_type, created_at, updated_at, views, likes
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0)
                RETURNING *
                "#,
            )
            .bind(artwork.user_id)
            .bind(&artwork.title)
            .bind(&artwork.description)
            .bind(artwork.file_type.as_str())
            .bind(&artwork.storage_id)
            .bind(&artwork.file_url)
            .bind(&artwork.thumbnail_url)
            .bind(artwork.file_size)
            .bind(&artwork.mime_type)
            .bind(sortable(now)?)
            .bind(sortable(now)?)
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(row) => Ok(row),
                Err(e) if is_foreign_key_violation(&e) => Err(MetadataError::NotFound(format!(
                    "user {}",
                    artwork.user_id
                ))),
                Err(e) if is_unique_violation(&e) => Err(MetadataError::AlreadyExists(format!(
                    "storage_id {}",
                    artwork.storage_id
                ))),
                Err(e) => Err(e.into()),
            }
        }

        async fn get_artwork(&self, artwork_id: i64) -> MetadataResult<Option<ArtworkViewRow>> {
            let row = sqlx::query_as::<_, ArtworkViewRow>(&format!(
                "{ARTWORK_VIEW_SELECT} WHERE a.id = ?"
            ))
            .bind(artwork_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn record_view(&self, artwork_id: i64) -> MetadataResult<Option<ArtworkViewRow>> {
            let mut tx = self.pool.begin().await?;

            let updated = sqlx::query("UPDATE artworks SET views = views + 1 WHERE id = ?")
                .bind(artwork_id)
                .execute(&mut *tx)
                .await?;
            if updated.rows_affected() == 0 {
                return Ok(None);
            }

            let row = sqlx::query_as::<_, ArtworkViewRow>(&format!(
                "{ARTWORK_VIEW_SELECT} WHERE a.id = ?"
            ))
            .bind(artwork_id)
            .fetch_optional(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(row)
        }

        async fn record_like(&self, artwork_id: i64) -> MetadataResult<Option<i64>> {
            let likes: Option<i64> = sqlx::query_scalar(
                "UPDATE artworks SET likes = likes + 1 WHERE id = ? RETURNING likes",
            )
            .bind(artwork_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(likes)
        }

        async fn list_artworks(
            &self,
            filter: &ArtworkFilter,
            page: PageRequest,
        ) -> MetadataResult<ArtworkPage> {
            let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM artworks a");
            push_filters(&mut count, filter);
            let total = count
                .build_query_scalar::<i64>()
                .fetch_one(&self.pool)
                .await?;

            let mut items = QueryBuilder::<Sqlite>::new(ARTWORK_VIEW_SELECT);
            push_filters(&mut items, filter);
            items
                .push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ")
                .push_bind(page.limit())
                .push(" OFFSET ")
                .push_bind(page.offset());
            let items = items
                .build_query_as::<ArtworkViewRow>()
                .fetch_all(&self.pool)
                .await?;

            Ok(ArtworkPage {
                items,
                total: total.max(0) as u64,
            })
        }

        async fn list_user_artworks(&self, user_id: i64) -> MetadataResult<Vec<ArtworkViewRow>> {
            let rows = sqlx::query_as::<_, ArtworkViewRow>(&format!(
                "{ARTWORK_VIEW_SELECT} WHERE a.user_id = ? ORDER BY a.created_at DESC, a.id DESC"
            ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn update_artwork(
            &self,
            artwork_id: i64,
            update: &ArtworkUpdate,
            now: OffsetDateTime,
        ) -> MetadataResult<Option<ArtworkRow>> {
            let row = sqlx::query_as::<_, ArtworkRow>(
                r#"
                UPDATE artworks SET
                    title = COALESCE(?, title),
                    description = CASE WHEN ? THEN ? ELSE description END,
                    updated_at = ?
                WHERE id = ?
                RETURNING *
                "#,
            )
            .bind(&update.title)
            .bind(update.description.is_some())
            .bind(update.description.clone().flatten())
            .bind(sortable(now)?)
            .bind(artwork_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn delete_artwork(&self, artwork_id: i64) -> MetadataResult<bool> {
            let result = sqlx::query("DELETE FROM artworks WHERE id = ?")
                .bind(artwork_id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    wallet_address TEXT NOT NULL UNIQUE,
    username TEXT UNIQUE,
    avatar_url TEXT,
    bio TEXT,
    x_handle TEXT,
    discord_handle TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS artworks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    file_type TEXT NOT NULL CHECK (file_type IN ('image', 'video')),
    storage_id TEXT NOT NULL UNIQUE,
    file_url TEXT NOT NULL,
    thumbnail_url TEXT,
    file_size INTEGER NOT NULL,
    mime_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    views INTEGER NOT NULL DEFAULT 0,
    likes INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_artworks_user ON artworks(user_id);
CREATE INDEX IF NOT EXISTS idx_artworks_created ON artworks(created_at DESC, id DESC);
"#;
