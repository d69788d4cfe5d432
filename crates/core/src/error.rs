//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("field {field} is too long: {len} characters (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("invalid file type filter: {0}")]
    InvalidFileType(String),

    #[error("thumbnail unavailable: {0}")]
    ThumbnailUnavailable(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reject `value` when it is longer than `max` characters.
pub fn check_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::FieldTooLong { field, len, max });
    }
    Ok(())
}
