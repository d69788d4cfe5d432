//! Database models mapping to the catalog schema.

use gallery_core::FileType;
use sqlx::FromRow;
use time::OffsetDateTime;

// =============================================================================
// Users
// =============================================================================

/// User record, keyed by wallet address.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub wallet_address: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub x_handle: Option<String>,
    pub discord_handle: Option<String>,
    pub created_at: OffsetDateTime,
}

/// User record with the number of artworks it owns.
#[derive(Debug, Clone, FromRow)]
pub struct UserSummaryRow {
    #[sqlx(flatten)]
    pub user: UserRow,
    pub artwork_count: i64,
}

// =============================================================================
// Artworks
// =============================================================================

/// Artwork record.
#[derive(Debug, Clone, FromRow)]
pub struct ArtworkRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    /// `image` or `video`.
    pub file_type: String,
    /// Permanent storage id of the original bytes. Unique.
    pub storage_id: String,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub file_size: i64,
    pub mime_type: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub views: i64,
    pub likes: i64,
}

/// Artwork joined with the owner fields needed for attribution.
#[derive(Debug, Clone, FromRow)]
pub struct ArtworkViewRow {
    #[sqlx(flatten)]
    pub artwork: ArtworkRow,
    pub owner_username: Option<String>,
    pub owner_wallet: String,
}

/// Input for a new artwork record. Counters start at zero.
#[derive(Debug, Clone)]
pub struct NewArtwork {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_type: FileType,
    pub storage_id: String,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub file_size: i64,
    pub mime_type: String,
}

/// One page of a filtered catalog listing.
#[derive(Debug, Clone)]
pub struct ArtworkPage {
    pub items: Vec<ArtworkViewRow>,
    /// Number of artworks matching the filter across all pages.
    pub total: u64,
}
