//! Artwork repository.

use crate::error::MetadataResult;
use crate::models::{ArtworkPage, ArtworkRow, ArtworkViewRow, NewArtwork};
use async_trait::async_trait;
use gallery_core::{ArtworkFilter, ArtworkUpdate, PageRequest};
use time::OffsetDateTime;

/// Repository for artwork catalog operations.
#[async_trait]
pub trait ArtworkRepo: Send + Sync {
    /// Insert an artwork record.
    ///
    /// Fails with `NotFound` if the owner does not exist and
    /// `AlreadyExists` if the storage id is already catalogued.
    async fn create_artwork(
        &self,
        artwork: &NewArtwork,
        now: OffsetDateTime,
    ) -> MetadataResult<ArtworkRow>;

    /// Get an artwork with owner attribution, without side effects.
    async fn get_artwork(&self, artwork_id: i64) -> MetadataResult<Option<ArtworkViewRow>>;

    /// Increment the view counter and return the updated artwork.
    async fn record_view(&self, artwork_id: i64) -> MetadataResult<Option<ArtworkViewRow>>;

    /// Increment the like counter and return the new count.
    async fn record_like(&self, artwork_id: i64) -> MetadataResult<Option<i64>>;

    /// List artworks newest first.
    async fn list_artworks(
        &self,
        filter: &ArtworkFilter,
        page: PageRequest,
    ) -> MetadataResult<ArtworkPage>;

    /// All artworks owned by a user, newest first.
    async fn list_user_artworks(&self, user_id: i64) -> MetadataResult<Vec<ArtworkViewRow>>;

    /// Apply a title/description edit and refresh `updated_at`.
    async fn update_artwork(
        &self,
        artwork_id: i64,
        update: &ArtworkUpdate,
        now: OffsetDateTime,
    ) -> MetadataResult<Option<ArtworkRow>>;

    /// Delete the catalog record. Returns false if it did not exist.
    async fn delete_artwork(&self, artwork_id: i64) -> MetadataResult<bool>;
}
