//! Storage trait definitions.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use gallery_core::StorageTags;
use gallery_core::artwork::MAX_STORAGE_ID_LEN;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

/// Hex characters of the content digest kept in an object id.
const ID_DIGEST_LEN: usize = 32;

/// Result of a successful `put`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: String,
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

/// Settlement state reported for a stored object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStatus {
    /// Settled and retrievable by id.
    Confirmed,
}

/// Everything the store knows about an object, without its bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub id: String,
    pub url: String,
    pub size: u64,
    pub content_type: String,
    pub tags: StorageTags,
    pub status: ObjectStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ObjectInfo {
    pub fn stored(&self) -> StoredObject {
        StoredObject {
            id: self.id.clone(),
            url: self.url.clone(),
            size: self.size,
            content_type: self.content_type.clone(),
        }
    }
}

/// Append-only object store with permanent, id-addressed objects.
///
/// Every `put` yields a fresh id, even for identical bytes. Objects are never
/// removed: `delete` always fails with [`StorageError::Immutable`] and must
/// not be retried.
#[async_trait]
pub trait PermanentStore: Send + Sync + 'static {
    /// Store bytes with their content type and tags.
    async fn put(
        &self,
        data: Bytes,
        content_type: &str,
        tags: &StorageTags,
    ) -> StorageResult<StoredObject>;

    /// Look up an object's metadata by id.
    async fn get_info(&self, id: &str) -> StorageResult<ObjectInfo>;

    /// Fetch an object's bytes by id.
    async fn get(&self, id: &str) -> StorageResult<Bytes>;

    /// Objects are permanent; deletion is always refused.
    async fn delete(&self, id: &str) -> StorageResult<()> {
        Err(StorageError::Immutable(id.to_string()))
    }

    /// Public URL for an id. A pure function of the id.
    fn url_for(&self, id: &str) -> String;

    /// Get the name of this storage backend.
    ///
    /// Used for metrics and logging.
    fn backend_name(&self) -> &'static str;

    /// Verify storage backend connectivity.
    ///
    /// The default implementation returns Ok(()), suitable for backends that
    /// don't require connectivity verification.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Mint a new object id for `data`.
///
/// The id is the first 32 hex characters of the SHA-256 of the content
/// followed by a random 32 character nonce, so two uploads of the same bytes
/// never share an id.
pub fn mint_id(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    let mut id = String::with_capacity(ID_DIGEST_LEN * 2);
    for byte in digest.iter().take(ID_DIGEST_LEN / 2) {
        id.push_str(&format!("{byte:02x}"));
    }
    id.push_str(&Uuid::new_v4().simple().to_string());
    id
}

/// Reject ids that could not have been minted by [`mint_id`]-style schemes.
///
/// Ids are used as file names by the filesystem backend, so only ASCII
/// alphanumerics, `-` and `_` are allowed.
pub fn validate_id(id: &str) -> StorageResult<()> {
    if id.is_empty() || id.len() > MAX_STORAGE_ID_LEN {
        return Err(StorageError::InvalidId(format!(
            "length must be 1..={MAX_STORAGE_ID_LEN}"
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(StorageError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Join a gateway base URL and an id.
pub fn gateway_url(gateway: &str, id: &str) -> String {
    format!("{}/{}", gateway.trim_end_matches('/'), id)
}
