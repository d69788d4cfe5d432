//! Identity and profile handlers.

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::views::{ArtworkView, UserDetail, UserView};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use gallery_core::ProfileUpdate;
use gallery_core::user::normalize_wallet;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

/// Body of `POST /api/users/connect`.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    pub wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub message: &'static str,
    pub user: UserView,
    pub is_new_user: bool,
}

#[derive(Debug, Serialize)]
pub struct UserMessage {
    pub message: &'static str,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UsernameAvailability {
    pub available: bool,
    pub username: String,
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserView>>> {
    let users = state.metadata.list_users().await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// GET /api/users/wallet/{address}
pub async fn get_user_by_wallet(
    State(state): State<AppState>,
    ApiPath(address): ApiPath<String>,
) -> ApiResult<Json<UserView>> {
    let wallet = normalize_wallet(&address)?;
    let user = state
        .metadata
        .get_user_by_wallet(&wallet)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user with wallet {wallet}")))?;
    user_view(&state, user.id).await.map(Json)
}

/// POST /api/users/connect
///
/// Returns 201 when the wallet is seen for the first time, 200 otherwise.
pub async fn connect_wallet(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ConnectRequest>,
) -> ApiResult<(StatusCode, Json<ConnectResponse>)> {
    let wallet = normalize_wallet(body.wallet_address.as_deref().unwrap_or_default())?;
    let (user, created) = state
        .metadata
        .upsert_user_by_wallet(&wallet, OffsetDateTime::now_utc())
        .await?;

    if created {
        info!(user_id = user.id, "new user connected");
        return Ok((
            StatusCode::CREATED,
            Json(ConnectResponse {
                message: "New user created successfully",
                user: UserView::new(user, 0),
                is_new_user: true,
            }),
        ));
    }

    let user = user_view(&state, user.id).await?;
    Ok((
        StatusCode::OK,
        Json(ConnectResponse {
            message: "Wallet connected successfully",
            user,
            is_new_user: false,
        }),
    ))
}

/// PUT /api/users/{id}/profile
pub async fn update_profile(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<UserMessage>> {
    let update = update.validate()?;
    state.metadata.update_profile(user_id, &update).await?;
    info!(user_id, "profile updated");

    Ok(Json(UserMessage {
        message: "Profile updated successfully",
        user: user_view(&state, user_id).await?,
    }))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<UserDetail>> {
    let user = user_view(&state, user_id).await?;
    let artworks = state.metadata.list_user_artworks(user_id).await?;

    Ok(Json(UserDetail {
        user,
        artworks: artworks.into_iter().map(ArtworkView::from).collect(),
    }))
}

/// DELETE /api/users/{id}
///
/// Cascades to the user's catalog records. Stored bytes are untouched.
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<DeleteUserResponse>> {
    if !state.metadata.delete_user(user_id).await? {
        return Err(user_not_found(user_id));
    }
    info!(user_id, "user deleted");
    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully",
    }))
}

/// GET /api/users/check-username/{username}
pub async fn check_username(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> ApiResult<Json<UsernameAvailability>> {
    let taken = state.metadata.username_exists(username.trim()).await?;
    Ok(Json(UsernameAvailability {
        available: !taken,
        username,
    }))
}

fn user_not_found(user_id: i64) -> ApiError {
    ApiError::NotFound(format!("user {user_id}"))
}

async fn user_view(state: &AppState, user_id: i64) -> ApiResult<UserView> {
    state
        .metadata
        .get_user_summary(user_id)
        .await?
        .map(UserView::from)
        .ok_or_else(|| user_not_found(user_id))
}
