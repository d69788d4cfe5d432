//! Artwork catalog handlers.

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::ingest::{ArtworkSubmission, ingest};
use crate::metrics::{ARTWORK_LIKES, ARTWORK_VIEWS};
use crate::state::AppState;
use crate::views::ArtworkView;
use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use gallery_core::serde_ext::lenient;
use gallery_core::{ArtworkFilter, ArtworkUpdate, Caller, PageInfo};
use gallery_metadata::ArtworkViewRow;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

/// Query parameters for `GET /api/artworks`.
///
/// Numeric parameters that do not parse are ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ListArtworksQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub per_page: Option<i64>,
    pub file_type: Option<String>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user_id: Option<i64>,
}

/// One page of the catalog.
#[derive(Debug, Serialize)]
pub struct ArtworkListResponse {
    pub artworks: Vec<ArtworkView>,
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Response carrying a single artwork with a status message.
#[derive(Debug, Serialize)]
pub struct ArtworkMessage {
    pub message: &'static str,
    pub artwork: ArtworkView,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub message: &'static str,
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Body of `PUT /api/artworks/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateArtworkRequest {
    pub user_id: Option<i64>,
    #[serde(flatten)]
    pub changes: ArtworkUpdate,
}

/// Body of `DELETE /api/artworks/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteArtworkRequest {
    pub user_id: Option<i64>,
}

/// GET /api/artworks
pub async fn list_artworks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListArtworksQuery>,
) -> ApiResult<Json<ArtworkListResponse>> {
    let filter = ArtworkFilter::from_query(
        query.file_type.as_deref(),
        query.search.as_deref(),
        query.user_id,
    )?;
    let request = state.page_request(query.page, query.per_page);

    let page = state.metadata.list_artworks(&filter, request).await?;

    Ok(Json(ArtworkListResponse {
        artworks: page.items.into_iter().map(ArtworkView::from).collect(),
        page: PageInfo::new(request, page.total),
    }))
}

/// POST /api/artworks (multipart: title, description, user_id, file)
pub async fn upload_artwork(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<ArtworkMessage>)> {
    let submission = read_submission(multipart?, state.max_upload_bytes()).await?;
    let view = ingest(&state, submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(ArtworkMessage {
            message: "Artwork uploaded successfully",
            artwork: view.into(),
        }),
    ))
}

/// GET /api/artworks/{id}
///
/// Each successful fetch counts as one view.
pub async fn get_artwork(
    State(state): State<AppState>,
    ApiPath(artwork_id): ApiPath<i64>,
) -> ApiResult<Json<ArtworkView>> {
    let view = state
        .metadata
        .record_view(artwork_id)
        .await?
        .ok_or_else(|| artwork_not_found(artwork_id))?;
    ARTWORK_VIEWS.inc();
    Ok(Json(view.into()))
}

/// PUT /api/artworks/{id}
pub async fn update_artwork(
    State(state): State<AppState>,
    ApiPath(artwork_id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateArtworkRequest>,
) -> ApiResult<Json<ArtworkMessage>> {
    let current = load_owned(&state, artwork_id, body.user_id, "update").await?;
    let changes = body.changes.validate()?;

    let updated = state
        .metadata
        .update_artwork(artwork_id, &changes, OffsetDateTime::now_utc())
        .await?
        .ok_or_else(|| artwork_not_found(artwork_id))?;

    info!(artwork_id, "artwork updated");
    let view = ArtworkViewRow {
        artwork: updated,
        owner_username: current.owner_username,
        owner_wallet: current.owner_wallet,
    };
    Ok(Json(ArtworkMessage {
        message: "Artwork updated successfully",
        artwork: view.into(),
    }))
}

/// DELETE /api/artworks/{id}
///
/// Removes the catalog record only. The stored bytes are permanent.
pub async fn delete_artwork(
    State(state): State<AppState>,
    ApiPath(artwork_id): ApiPath<i64>,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let request: DeleteArtworkRequest = parse_optional_json(&body)?;
    load_owned(&state, artwork_id, request.user_id, "delete").await?;

    if !state.metadata.delete_artwork(artwork_id).await? {
        return Err(artwork_not_found(artwork_id));
    }

    info!(artwork_id, "artwork removed from catalog");
    Ok(Json(MessageResponse {
        message: "Artwork removed from gallery (file remains in permanent storage)",
    }))
}

/// POST /api/artworks/{id}/like
pub async fn like_artwork(
    State(state): State<AppState>,
    ApiPath(artwork_id): ApiPath<i64>,
) -> ApiResult<Json<LikeResponse>> {
    let likes = state
        .metadata
        .record_like(artwork_id)
        .await?
        .ok_or_else(|| artwork_not_found(artwork_id))?;
    ARTWORK_LIKES.inc();
    Ok(Json(LikeResponse {
        message: "Artwork liked",
        likes,
    }))
}

fn artwork_not_found(artwork_id: i64) -> ApiError {
    ApiError::NotFound(format!("artwork {artwork_id}"))
}

/// Fetch an artwork and check that `user_id` owns it.
async fn load_owned(
    state: &AppState,
    artwork_id: i64,
    user_id: Option<i64>,
    action: &str,
) -> ApiResult<ArtworkViewRow> {
    let current = state
        .metadata
        .get_artwork(artwork_id)
        .await?
        .ok_or_else(|| artwork_not_found(artwork_id))?;

    match user_id.map(Caller::new) {
        Some(caller) if caller.owns(current.artwork.user_id) => Ok(current),
        _ => Err(ApiError::Forbidden(format!(
            "you can only {action} your own artworks"
        ))),
    }
}

/// Parse a JSON body that may be absent entirely.
fn parse_optional_json<T: serde::de::DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
}

async fn read_submission(mut multipart: Multipart, max: usize) -> ApiResult<ArtworkSubmission> {
    let mut submission = ArtworkSubmission::default();
    let err = |e: MultipartError| multipart_error(e, max);

    while let Some(field) = multipart.next_field().await.map_err(err)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "title" => submission.title = Some(field.text().await.map_err(err)?),
            "description" => submission.description = Some(field.text().await.map_err(err)?),
            "user_id" => submission.user_id = Some(field.text().await.map_err(err)?),
            "file" => {
                submission.file_name = field.file_name().map(str::to_string);
                submission.file = Some(field.bytes().await.map_err(err)?);
            }
            _ => {}
        }
    }

    Ok(submission)
}

fn multipart_error(err: MultipartError, max: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { max }
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
