use gallery_core::FileType;
use gallery_metadata::{ArtworkRow, MetadataStore, NewArtwork, UserRow};
use time::{Duration, OffsetDateTime};

/// Fixed base time so ordering assertions do not depend on the clock.
#[allow(dead_code)]
pub fn base_time() -> OffsetDateTime {
    time::macros::datetime!(2024-05-01 12:00 UTC)
}

#[allow(dead_code)]
pub async fn user(store: &dyn MetadataStore, wallet: &str) -> UserRow {
    store
        .upsert_user_by_wallet(wallet, base_time())
        .await
        .unwrap()
        .0
}

#[allow(dead_code)]
pub fn new_artwork(user_id: i64, title: &str, file_type: FileType) -> NewArtwork {
    let storage_id = uuid_like(title);
    NewArtwork {
        user_id,
        title: title.to_string(),
        description: None,
        file_type,
        file_url: format!("https://gateway.test/{storage_id}"),
        storage_id,
        thumbnail_url: None,
        file_size: 1024,
        mime_type: match file_type {
            FileType::Image => "image/png".to_string(),
            FileType::Video => "video/mp4".to_string(),
        },
    }
}

/// Insert an artwork created `minutes` after the base time.
#[allow(dead_code)]
pub async fn artwork_at(
    store: &dyn MetadataStore,
    artwork: NewArtwork,
    minutes: i64,
) -> ArtworkRow {
    store
        .create_artwork(&artwork, base_time() + Duration::minutes(minutes))
        .await
        .unwrap()
}

fn uuid_like(seed: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let cleaned: String = seed.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    format!("{cleaned}{n:016x}")
}
