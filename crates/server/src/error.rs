//! API error types.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gallery_metadata::MetadataError;
use gallery_storage::StorageError;
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("no file uploaded")]
    NoFile,

    #[error("file exceeds the upload limit of {max} bytes")]
    PayloadTooLarge { max: usize },

    /// Writing the original bytes to permanent storage failed or timed out.
    #[error("upload to permanent storage failed: {0}")]
    UploadFailed(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("{0}")]
    Core(#[from] gallery_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Forbidden(_) => "forbidden",
            Self::MissingField(_) => "missing_field",
            Self::UserNotFound(_) => "user_not_found",
            Self::NoFile => "no_file",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::UploadFailed(_) => "upload_failed",
            Self::Internal(_) => "internal_error",
            Self::Storage(e) => match e {
                StorageError::NotFound(_) => "not_found",
                _ => "storage_error",
            },
            Self::Metadata(e) => match e {
                MetadataError::NotFound(_) => "not_found",
                MetadataError::UsernameTaken(_) => "username_taken",
                MetadataError::AlreadyExists(_) | MetadataError::Constraint(_) => "conflict",
                _ => "metadata_error",
            },
            Self::Core(e) => match e {
                gallery_core::Error::MissingField(_) => "missing_field",
                gallery_core::Error::UnsupportedType(_) => "unsupported_type",
                gallery_core::Error::ThumbnailUnavailable(_) => "thumbnail_unavailable",
                _ => "invalid_field",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::NoFile => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UploadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(e) => match e {
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::InvalidId(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Metadata(e) => match e {
                MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
                MetadataError::UsernameTaken(_) => StatusCode::BAD_REQUEST,
                MetadataError::AlreadyExists(_) => StatusCode::CONFLICT,
                MetadataError::Constraint(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Core(e) => match e {
                gallery_core::Error::ThumbnailUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
