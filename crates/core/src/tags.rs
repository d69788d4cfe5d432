//! Key/value tags attached to objects sent to permanent storage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TAG_CONTENT_TYPE: &str = "Content-Type";
pub const TAG_TITLE: &str = "Title";
pub const TAG_DESCRIPTION: &str = "Description";
pub const TAG_ARTIST: &str = "Artist";
pub const TAG_APP: &str = "App";
pub const TAG_TYPE: &str = "Type";

/// Tag set for a stored object. Keys are unique; later inserts overwrite.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageTags(BTreeMap<String, String>);

impl StorageTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags for an original artwork upload.
    pub fn for_artwork(
        content_type: &str,
        title: &str,
        description: &str,
        artist: &str,
        app: &str,
    ) -> Self {
        Self::new()
            .with(TAG_CONTENT_TYPE, content_type)
            .with(TAG_TITLE, title)
            .with(TAG_DESCRIPTION, description)
            .with(TAG_ARTIST, artist)
            .with(TAG_APP, app)
    }

    /// Tags for the derived thumbnail of an artwork.
    pub fn for_thumbnail(title: &str, app: &str) -> Self {
        Self::new()
            .with(TAG_CONTENT_TYPE, crate::thumbnail::THUMBNAIL_MIME)
            .with(TAG_TITLE, format!("{title} - Thumbnail"))
            .with(TAG_APP, app)
            .with(TAG_TYPE, "Thumbnail")
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artwork_tags_carry_attribution_and_app_marker() {
        let tags = StorageTags::for_artwork("image/png", "Sunset", "", "0xabc", "Irys-Gallery");
        assert_eq!(tags.get(TAG_CONTENT_TYPE), Some("image/png"));
        assert_eq!(tags.get(TAG_TITLE), Some("Sunset"));
        assert_eq!(tags.get(TAG_DESCRIPTION), Some(""));
        assert_eq!(tags.get(TAG_ARTIST), Some("0xabc"));
        assert_eq!(tags.get(TAG_APP), Some("Irys-Gallery"));
        assert_eq!(tags.get(TAG_TYPE), None);
    }

    #[test]
    fn thumbnail_tags_are_marked() {
        let tags = StorageTags::for_thumbnail("Sunset", "Irys-Gallery");
        assert_eq!(tags.get(TAG_CONTENT_TYPE), Some("image/jpeg"));
        assert_eq!(tags.get(TAG_TITLE), Some("Sunset - Thumbnail"));
        assert_eq!(tags.get(TAG_TYPE), Some("Thumbnail"));
        assert_eq!(tags.get(TAG_ARTIST), None);
    }

    #[test]
    fn serializes_as_flat_object() {
        let tags = StorageTags::new().with("a", "1");
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"{"a":"1"}"#);
    }
}
