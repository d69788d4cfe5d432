//! Content-based media classification.
//!
//! Uploads are classified by their magic bytes, never by the client supplied
//! filename or `Content-Type`, so renaming a file cannot smuggle in other
//! content.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog media category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
}

impl FileType {
    /// Stable string form used in the catalog and the HTTP API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(Error::InvalidFileType(other.to_string())),
        }
    }
}

/// A MIME type detected from content, already known to be image or video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SniffedMime {
    mime_type: &'static str,
    file_type: FileType,
}

impl SniffedMime {
    /// The detected MIME type, e.g. `image/png`.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// The catalog category derived from the MIME prefix.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Whether a thumbnail should be attempted for this content.
    pub fn is_image(&self) -> bool {
        self.file_type == FileType::Image
    }
}

/// Classify raw bytes.
///
/// Returns [`Error::UnsupportedType`] for anything that is not `image/*` or
/// `video/*`, including content with no recognizable signature.
pub fn classify(bytes: &[u8]) -> Result<SniffedMime> {
    let Some(kind) = infer::get(bytes) else {
        return Err(Error::UnsupportedType(
            "content does not match any known signature".to_string(),
        ));
    };
    classify_mime(kind.mime_type())
}

/// Map a detected MIME string onto a catalog category.
pub fn classify_mime(mime_type: &'static str) -> Result<SniffedMime> {
    let file_type = if mime_type.starts_with("image/") {
        FileType::Image
    } else if mime_type.starts_with("video/") {
        FileType::Video
    } else {
        return Err(Error::UnsupportedType(mime_type.to_string()));
    };
    Ok(SniffedMime {
        mime_type,
        file_type,
    })
}
