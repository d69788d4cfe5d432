//! PostgreSQL-based metadata store implementation.

use crate::error::{MetadataError, MetadataResult, is_foreign_key_violation, is_unique_violation};
use crate::models::*;
use crate::repos::{ArtworkRepo, UserRepo};
use crate::store::MetadataStore;
use async_trait::async_trait;
use gallery_core::config::PgSslMode;
use gallery_core::{ArtworkFilter, ArtworkUpdate, PageRequest, ProfileUpdate};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode as SqlxPgSslMode};
use sqlx::{Pool, Postgres, QueryBuilder};
use std::str::FromStr;
use time::OffsetDateTime;

/// PostgreSQL schema (embedded).
const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

fn postgres_schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .filter_map(|statement| {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                return None;
            }
            let has_sql = trimmed.lines().any(|line| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with("--")
            });
            has_sql.then_some(trimmed)
        })
        .collect()
}

const ARTWORK_VIEW_SELECT: &str = "SELECT a.*, u.username AS owner_username, u.wallet_address AS owner_wallet \
     FROM artworks a JOIN users u ON u.id = a.user_id";

const USER_SUMMARY_SELECT: &str = "SELECT u.*, \
     (SELECT COUNT(*) FROM artworks a WHERE a.user_id = u.id) AS artwork_count \
     FROM users u";

/// Append WHERE clauses for `filter`. `strpos` is case-sensitive.
fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a ArtworkFilter) {
    qb.push(" WHERE TRUE");
    if let Some(file_type) = filter.file_type {
        qb.push(" AND a.file_type = ").push_bind(file_type.as_str());
    }
    if let Some(search) = filter.search.as_deref() {
        qb.push(" AND (strpos(a.title, ")
            .push_bind(search)
            .push(") > 0 OR strpos(COALESCE(a.description, ''), ")
            .push_bind(search)
            .push(") > 0)");
    }
    if let Some(owner_id) = filter.owner_id {
        qb.push(" AND a.user_id = ").push_bind(owner_id);
    }
}

/// PostgreSQL-based metadata store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection URL.
    pub async fn from_url(url: &str, max_connections: u32) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Self::connect(opts, max_connections).await
    }

    /// Create a new PostgreSQL store from individual connection parameters.
    ///
    /// This allows credentials to be passed separately, enabling better
    /// secret management (e.g., passwords via environment variables).
    #[allow(clippy::too_many_arguments)]
    pub async fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        ssl_mode: Option<PgSslMode>,
        max_connections: u32,
    ) -> MetadataResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }

        if let Some(pass) = password {
            opts = opts.password(pass);
        }

        if let Some(mode) = ssl_mode {
            let sqlx_mode = match mode {
                PgSslMode::Disable => SqlxPgSslMode::Disable,
                PgSslMode::Prefer => SqlxPgSslMode::Prefer,
                PgSslMode::Require => SqlxPgSslMode::Require,
            };
            opts = opts.ssl_mode(sqlx_mode);
        }

        // Log connection info without password
        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            ssl_mode = ?ssl_mode,
            "Connecting to PostgreSQL with individual parameters"
        );

        Self::connect(opts, max_connections).await
    }

    async fn connect(opts: PgConnectOptions, max_connections: u32) -> MetadataResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // PostgreSQL doesn't allow multiple statements in a single prepared statement,
        // so we split the schema and execute each statement separately.
        for statement in postgres_schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepo for PostgresStore {
    async fn upsert_user_by_wallet(
        &self,
        wallet_address: &str,
        now: OffsetDateTime,
    ) -> MetadataResult<(UserRow, bool)> {
        let inserted = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (wallet_address, created_at) VALUES ($1, $2) \
             ON CONFLICT (wallet_address) DO NOTHING RETURNING *",
        )
        .bind(wallet_address)
        .bind(now)
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
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_user_by_wallet(&self, wallet_address: &str) -> MetadataResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE wallet_address = $1")
            .bind(wallet_address)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_user_summary(&self, user_id: i64) -> MetadataResult<Option<UserSummaryRow>> {
        let row =
            sqlx::query_as::<_, UserSummaryRow>(&format!("{USER_SUMMARY_SELECT} WHERE u.id = $1"))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn list_users(&self) -> MetadataResult<Vec<UserSummaryRow>> {
        let rows =
            sqlx::query_as::<_, UserSummaryRow>(&format!("{USER_SUMMARY_SELECT} ORDER BY u.id"))
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

        let result = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users SET
                username = CASE WHEN $1 THEN $2 ELSE username END,
                avatar_url = CASE WHEN $3 THEN $4 ELSE avatar_url END,
                bio = CASE WHEN $5 THEN $6 ELSE bio END,
                x_handle = CASE WHEN $7 THEN $8 ELSE x_handle END,
                discord_handle = CASE WHEN $9 THEN $10 ELSE discord_handle END
            WHERE id = $11
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
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn delete_user(&self, user_id: i64) -> MetadataResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ArtworkRepo for PostgresStore {
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
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, 0, 0)
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
        .bind(now)
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
        let row =
            sqlx::query_as::<_, ArtworkViewRow>(&format!("{ARTWORK_VIEW_SELECT} WHERE a.id = $1"))
                .bind(artwork_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    async fn record_view(&self, artwork_id: i64) -> MetadataResult<Option<ArtworkViewRow>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE artworks SET views = views + 1 WHERE id = $1")
            .bind(artwork_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let row =
            sqlx::query_as::<_, ArtworkViewRow>(&format!("{ARTWORK_VIEW_SELECT} WHERE a.id = $1"))
                .bind(artwork_id)
                .fetch_optional(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn record_like(&self, artwork_id: i64) -> MetadataResult<Option<i64>> {
        let likes: Option<i64> = sqlx::query_scalar(
            "UPDATE artworks SET likes = likes + 1 WHERE id = $1 RETURNING likes",
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
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM artworks a");
        push_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut items = QueryBuilder::<Postgres>::new(ARTWORK_VIEW_SELECT);
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
            "{ARTWORK_VIEW_SELECT} WHERE a.user_id = $1 ORDER BY a.created_at DESC, a.id DESC"
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
                title = COALESCE($1, title),
                description = CASE WHEN $2 THEN $3 ELSE description END,
                updated_at = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&update.title)
        .bind(update.description.is_some())
        .bind(update.description.clone().flatten())
        .bind(now)
        .bind(artwork_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_artwork(&self, artwork_id: i64) -> MetadataResult<bool> {
        let result = sqlx::query("DELETE FROM artworks WHERE id = $1")
            .bind(artwork_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
