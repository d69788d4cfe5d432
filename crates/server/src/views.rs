//! JSON representations of catalog records.

use gallery_core::user::display_name;
use gallery_metadata::{ArtworkViewRow, UserRow, UserSummaryRow};
use serde::Serialize;
use time::OffsetDateTime;

/// Public artwork record.
#[derive(Debug, Clone, Serialize)]
pub struct ArtworkView {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_type: String,
    pub storage_id: String,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub file_size: i64,
    pub mime_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub views: i64,
    pub likes: i64,
    /// Owner username, or a shortened wallet address.
    pub artist: String,
}

impl From<ArtworkViewRow> for ArtworkView {
    fn from(row: ArtworkViewRow) -> Self {
        let artist = display_name(row.owner_username.as_deref(), &row.owner_wallet);
        let a = row.artwork;
        Self {
            id: a.id,
            user_id: a.user_id,
            title: a.title,
            description: a.description,
            file_type: a.file_type,
            storage_id: a.storage_id,
            file_url: a.file_url,
            thumbnail_url: a.thumbnail_url,
            file_size: a.file_size,
            mime_type: a.mime_type,
            created_at: a.created_at,
            updated_at: a.updated_at,
            views: a.views,
            likes: a.likes,
            artist,
        }
    }
}

/// Public user record.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub wallet_address: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub x_handle: Option<String>,
    pub discord_handle: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub artwork_count: i64,
}

impl UserView {
    pub fn new(user: UserRow, artwork_count: i64) -> Self {
        Self {
            id: user.id,
            wallet_address: user.wallet_address,
            username: user.username,
            avatar_url: user.avatar_url,
            bio: user.bio,
            x_handle: user.x_handle,
            discord_handle: user.discord_handle,
            created_at: user.created_at,
            artwork_count,
        }
    }
}

impl From<UserSummaryRow> for UserView {
    fn from(row: UserSummaryRow) -> Self {
        Self::new(row.user, row.artwork_count)
    }
}

/// User record with every artwork it owns, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: UserView,
    pub artworks: Vec<ArtworkView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_metadata::ArtworkRow;
    use time::macros::datetime;

    fn row(username: Option<&str>) -> ArtworkViewRow {
        let at = datetime!(2024-05-01 12:00 UTC);
        ArtworkViewRow {
            artwork: ArtworkRow {
                id: 1,
                user_id: 2,
                title: "Sunset".to_string(),
                description: None,
                file_type: "image".to_string(),
                storage_id: "abc".to_string(),
                file_url: "https://gw.test/abc".to_string(),
                thumbnail_url: None,
                file_size: 10,
                mime_type: "image/png".to_string(),
                created_at: at,
                updated_at: at,
                views: 0,
                likes: 0,
            },
            owner_username: username.map(str::to_string),
            owner_wallet: "0x1234567890abcdef".to_string(),
        }
    }

    #[test]
    fn artist_prefers_username() {
        assert_eq!(ArtworkView::from(row(Some("painter"))).artist, "painter");
        assert_eq!(ArtworkView::from(row(None)).artist, "0x123456...");
    }

    #[test]
    fn timestamps_serialize_as_rfc3339() {
        let json = serde_json::to_value(ArtworkView::from(row(None))).unwrap();
        assert_eq!(json["created_at"], "2024-05-01T12:00:00Z");
        assert_eq!(json["thumbnail_url"], serde_json::Value::Null);
    }
}
