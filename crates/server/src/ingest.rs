//! Artwork ingestion pipeline.
//!
//! A submission moves through validation, content sniffing, the upload of the
//! original bytes, optional thumbnail derivation and upload, and finally the
//! catalog insert. Nothing is written to the catalog unless the original
//! bytes are permanently stored. Thumbnail problems never fail an upload.

use crate::error::{ApiError, ApiResult};
use crate::metrics::{
    ARTWORKS_UPLOADED, STORAGE_PUT_DURATION, THUMBNAILS_GENERATED, UPLOAD_BYTES,
    record_thumbnail_skipped, record_upload_failure,
};
use crate::state::AppState;
use bytes::Bytes;
use gallery_core::artwork::normalize_title;
use gallery_core::mime::{self, SniffedMime};
use gallery_core::thumbnail::THUMBNAIL_MIME;
use gallery_core::user::attribution;
use gallery_core::StorageTags;
use gallery_metadata::{ArtworkViewRow, NewArtwork, UserRow};
use gallery_storage::{PermanentStore, StorageError, StoredObject};
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

/// Raw upload as received from the client, before any validation.
#[derive(Debug, Default)]
pub struct ArtworkSubmission {
    pub title: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<String>,
    pub file: Option<Bytes>,
    /// Client filename. Logged only; classification ignores it.
    pub file_name: Option<String>,
}

/// A submission that passed validation.
struct ValidSubmission {
    title: String,
    description: Option<String>,
    owner: UserRow,
    file: Bytes,
    sniffed: SniffedMime,
}

/// Why a storage put did not produce an object.
#[derive(Debug, thiserror::Error)]
enum PutFailure {
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Run the full pipeline and return the new catalog record.
#[instrument(skip_all, fields(file_name = submission.file_name.as_deref().unwrap_or("")))]
pub async fn ingest(state: &AppState, submission: ArtworkSubmission) -> ApiResult<ArtworkViewRow> {
    let valid = match validate(state, submission).await {
        Ok(valid) => valid,
        Err(e) => {
            record_upload_failure(e.code());
            return Err(e);
        }
    };

    let ValidSubmission {
        title,
        description,
        owner,
        file,
        sniffed,
    } = valid;

    let app = state.config.server.app_name.as_str();
    let artist = attribution(owner.username.as_deref(), &owner.wallet_address);
    let tags = StorageTags::for_artwork(
        sniffed.mime_type(),
        &title,
        description.as_deref().unwrap_or(""),
        &artist,
        app,
    );

    let original = timed_put(
        state.storage.as_ref(),
        "original",
        state.storage_timeout(),
        file.clone(),
        sniffed.mime_type(),
        &tags,
    );
    let thumbnail = async {
        if sniffed.is_image() {
            derive_and_store_thumbnail(state, file.clone(), &title).await
        } else {
            None
        }
    };
    let (original, thumbnail) = tokio::join!(original, thumbnail);

    let stored = match original {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "original upload failed, nothing persisted");
            record_upload_failure("storage");
            return Err(ApiError::UploadFailed(e.to_string()));
        }
    };

    let file_size = i64::try_from(file.len())
        .map_err(|_| ApiError::Internal("file size out of range".to_string()))?;
    let new_artwork = NewArtwork {
        user_id: owner.id,
        title,
        description,
        file_type: sniffed.file_type(),
        storage_id: stored.id.clone(),
        file_url: stored.url.clone(),
        thumbnail_url: thumbnail.map(|t| t.url),
        file_size,
        mime_type: sniffed.mime_type().to_string(),
    };

    let row = match state
        .metadata
        .create_artwork(&new_artwork, OffsetDateTime::now_utc())
        .await
    {
        Ok(row) => row,
        Err(e) => {
            // The stored bytes stay orphaned; permanent storage has no delete.
            warn!(storage_id = %stored.id, error = %e, "catalog insert failed after upload");
            record_upload_failure("persist");
            return Err(e.into());
        }
    };

    ARTWORKS_UPLOADED
        .with_label_values(&[sniffed.file_type().as_str()])
        .inc();
    UPLOAD_BYTES.inc_by(file.len() as u64);
    info!(
        artwork_id = row.id,
        user_id = owner.id,
        storage_id = %row.storage_id,
        mime_type = %row.mime_type,
        thumbnail = row.thumbnail_url.is_some(),
        "artwork ingested"
    );

    Ok(ArtworkViewRow {
        artwork: row,
        owner_username: owner.username,
        owner_wallet: owner.wallet_address,
    })
}

async fn validate(state: &AppState, submission: ArtworkSubmission) -> ApiResult<ValidSubmission> {
    let title = match submission.title.as_deref() {
        Some(title) => normalize_title(title)?,
        None => return Err(ApiError::MissingField("title")),
    };

    let user_id = match submission.user_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw
            .parse::<i64>()
            .map_err(|_| ApiError::BadRequest(format!("user_id must be an integer, got '{raw}'")))?,
        _ => return Err(ApiError::MissingField("user_id")),
    };

    let description = submission
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let owner = state
        .metadata
        .get_user(user_id)
        .await?
        .ok_or(ApiError::UserNotFound(user_id))?;

    let file = match submission.file {
        Some(file) if !file.is_empty() => file,
        _ => return Err(ApiError::NoFile),
    };

    let max = state.max_upload_bytes();
    if file.len() > max {
        return Err(ApiError::PayloadTooLarge { max });
    }

    let sniffed = mime::classify(&file)?;

    Ok(ValidSubmission {
        title,
        description,
        owner,
        file,
        sniffed,
    })
}

/// Put one object, bounded by `timeout`, recording the call latency.
async fn timed_put(
    storage: &dyn PermanentStore,
    object: &'static str,
    timeout: Duration,
    bytes: Bytes,
    content_type: &str,
    tags: &StorageTags,
) -> Result<StoredObject, PutFailure> {
    let started = Instant::now();
    let result = tokio::time::timeout(timeout, storage.put(bytes, content_type, tags)).await;
    STORAGE_PUT_DURATION
        .with_label_values(&[object])
        .observe(started.elapsed().as_secs_f64());

    match result {
        Ok(Ok(stored)) => Ok(stored),
        Ok(Err(e)) => Err(e.into()),
        Err(_) => Err(PutFailure::TimedOut(timeout)),
    }
}

/// Derive a JPEG thumbnail and store it. Every failure is swallowed.
async fn derive_and_store_thumbnail(
    state: &AppState,
    bytes: Bytes,
    title: &str,
) -> Option<StoredObject> {
    let thumbnailer = state.thumbnailer.clone();
    let jpeg = match tokio::task::spawn_blocking(move || thumbnailer.derive(&bytes)).await {
        Ok(Ok(jpeg)) => jpeg,
        Ok(Err(e)) => {
            warn!(error = %e, "continuing without thumbnail");
            record_thumbnail_skipped("derive");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "thumbnail task aborted, continuing without thumbnail");
            record_thumbnail_skipped("derive");
            return None;
        }
    };

    let tags = StorageTags::for_thumbnail(title, &state.config.server.app_name);
    match timed_put(
        state.storage.as_ref(),
        "thumbnail",
        state.storage_timeout(),
        Bytes::from(jpeg),
        THUMBNAIL_MIME,
        &tags,
    )
    .await
    {
        Ok(stored) => {
            THUMBNAILS_GENERATED.inc();
            Some(stored)
        }
        Err(e) => {
            warn!(error = %e, "thumbnail upload failed, continuing without thumbnail");
            record_thumbnail_skipped("storage");
            None
        }
    }
}
