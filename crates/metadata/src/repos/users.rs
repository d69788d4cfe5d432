//! User repository.

use crate::error::MetadataResult;
use crate::models::{UserRow, UserSummaryRow};
use async_trait::async_trait;
use gallery_core::ProfileUpdate;
use time::OffsetDateTime;

/// Repository for user identity operations.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a user for `wallet_address` unless one exists, then return it.
    ///
    /// The flag is true when this call created the user. Safe under
    /// concurrent calls for the same wallet.
    async fn upsert_user_by_wallet(
        &self,
        wallet_address: &str,
        now: OffsetDateTime,
    ) -> MetadataResult<(UserRow, bool)>;

    /// Get a user by ID.
    async fn get_user(&self, user_id: i64) -> MetadataResult<Option<UserRow>>;

    /// Get a user by wallet address.
    async fn get_user_by_wallet(&self, wallet_address: &str) -> MetadataResult<Option<UserRow>>;

    /// Get a user with its artwork count.
    async fn get_user_summary(&self, user_id: i64) -> MetadataResult<Option<UserSummaryRow>>;

    /// List all users with artwork counts, oldest first.
    async fn list_users(&self) -> MetadataResult<Vec<UserSummaryRow>>;

    /// Apply a profile update in one statement.
    ///
    /// Fails with `UsernameTaken` if another user holds the requested
    /// username, in which case nothing is changed. Returns `NotFound` for an
    /// unknown user.
    async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> MetadataResult<UserRow>;

    /// Whether any user holds `username`.
    async fn username_exists(&self, username: &str) -> MetadataResult<bool>;

    /// Delete a user and, by cascade, all of its artwork records.
    ///
    /// Returns false if the user did not exist.
    async fn delete_user(&self, user_id: i64) -> MetadataResult<bool>;
}
