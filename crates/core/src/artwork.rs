//! Artwork catalog types.

use crate::error::{Error, Result, check_len};
use crate::mime::FileType;
use serde::Deserialize;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_STORAGE_ID_LEN: usize = 100;

/// Trim a title and reject it when blank or too long.
pub fn normalize_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::MissingField("title"));
    }
    check_len("title", title, MAX_TITLE_LEN)?;
    Ok(title.to_string())
}

/// Catalog listing filters. All filters combine with AND.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtworkFilter {
    pub file_type: Option<FileType>,
    /// Substring matched against title or description.
    pub search: Option<String>,
    pub owner_id: Option<i64>,
}

impl ArtworkFilter {
    /// Build from raw query values, treating blank strings as absent.
    pub fn from_query(
        file_type: Option<&str>,
        search: Option<&str>,
        owner_id: Option<i64>,
    ) -> Result<Self> {
        let file_type = match file_type.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(s.parse()?),
            None => None,
        };
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Ok(Self {
            file_type,
            search,
            owner_id,
        })
    }
}

/// Owner edit of an artwork. Only title and description are mutable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ArtworkUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_ext::present")]
    pub description: Option<Option<String>>,
}

impl ArtworkUpdate {
    /// A present title must be non-blank; it is trimmed like on upload.
    pub fn validate(mut self) -> Result<Self> {
        if let Some(title) = &self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(Error::InvalidField {
                    field: "title",
                    reason: "must not be empty".to_string(),
                });
            }
            check_len("title", title, MAX_TITLE_LEN)?;
            self.title = Some(title.to_string());
        }
        Ok(self)
    }
}
