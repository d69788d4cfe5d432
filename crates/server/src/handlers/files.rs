//! Serving stored objects by id.
//!
//! Lets `storage.gateway_url` point at this server (`http://host/files`) when
//! running against a local backend.

use crate::error::ApiResult;
use crate::extract::ApiPath;
use crate::state::AppState;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

/// GET /files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Response> {
    let info = state.storage.get_info(&id).await?;
    let data = state.storage.get(&id).await?;

    Ok((
        [
            (CONTENT_TYPE, info.content_type),
            // Objects never change once written.
            (
                CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        data,
    )
        .into_response())
}
