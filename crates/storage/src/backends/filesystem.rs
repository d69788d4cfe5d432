//! Local filesystem storage backend.
//!
//! Layout under the root:
//! - `objects/{id}`: object bytes
//! - `objects/{id}.json`: [`ObjectInfo`] sidecar
//!
//! Objects are written once and never rewritten or removed.

use crate::error::{StorageError, StorageResult};
use crate::traits::{
    ObjectInfo, ObjectStatus, PermanentStore, StoredObject, gateway_url, mint_id, validate_id,
};
use async_trait::async_trait;
use bytes::Bytes;
use gallery_core::StorageTags;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};
use uuid::Uuid;

const OBJECTS_DIR: &str = "objects";

/// Local filesystem permanent store.
pub struct FilesystemBackend {
    root: PathBuf,
    gateway: String,
}

impl FilesystemBackend {
    /// Create a new filesystem backend, creating the object directory.
    pub async fn new(root: impl AsRef<Path>, gateway: impl Into<String>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(OBJECTS_DIR)).await?;
        Ok(Self {
            root,
            gateway: gateway.into(),
        })
    }

    /// Path of the object bytes for an id.
    ///
    /// Returns an error if the id is malformed or if an existing entry
    /// resolves outside the storage root (e.g. a planted symlink).
    async fn object_path(&self, id: &str) -> StorageResult<PathBuf> {
        validate_id(id)?;
        let root = self.root.clone();
        let path = root.join(OBJECTS_DIR).join(id);
        let id = id.to_string();
        tokio::task::spawn_blocking(move || Self::check_within_root(&root, &path, &id))
            .await
            .map_err(|e| {
                StorageError::Io(std::io::Error::other(format!("spawn_blocking failed: {e}")))
            })?
    }

    fn check_within_root(root: &Path, path: &Path, id: &str) -> StorageResult<PathBuf> {
        match std::fs::symlink_metadata(path) {
            Ok(_) => {
                let root_canonical = root.canonicalize()?;
                let canonical = path.canonicalize().map_err(|_| {
                    StorageError::InvalidId(format!("symlink target missing or invalid: {id}"))
                })?;
                if !canonical.starts_with(&root_canonical) {
                    return Err(StorageError::InvalidId(format!(
                        "resolved path escapes storage root: {id}"
                    )));
                }
                Ok(path.to_path_buf())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(path.to_path_buf()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    fn sidecar_path(object_path: &Path) -> PathBuf {
        let mut name = object_path.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }

    /// Write to a temp file, fsync, then link into place without replacing
    /// anything that already exists.
    async fn write_once(path: &Path, data: &[u8]) -> StorageResult<()> {
        let temp_path = path.with_file_name(format!(
            "{}.tmp.{}",
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            Uuid::new_v4()
        ));
        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
        }

        let linked = fs::hard_link(&temp_path, path).await;
        let _ = fs::remove_file(&temp_path).await;
        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(
                StorageError::AlreadyExists(path.display().to_string()),
            ),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn not_found(id: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
        move |e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(id.to_string())
            } else {
                StorageError::Io(e)
            }
        }
    }
}

#[async_trait]
impl PermanentStore for FilesystemBackend {
    #[instrument(skip(self, data, tags), fields(backend = "filesystem", size = data.len()))]
    async fn put(
        &self,
        data: Bytes,
        content_type: &str,
        tags: &StorageTags,
    ) -> StorageResult<StoredObject> {
        let id = mint_id(&data);
        let path = self.object_path(&id).await?;

        let info = ObjectInfo {
            url: self.url_for(&id),
            id: id.clone(),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            tags: tags.clone(),
            status: ObjectStatus::Confirmed,
            created_at: OffsetDateTime::now_utc(),
        };

        // Sidecar goes first so an object file never exists without metadata.
        let sidecar = serde_json::to_vec_pretty(&info)?;
        Self::write_once(&Self::sidecar_path(&path), &sidecar).await?;
        Self::write_once(&path, &data).await?;

        debug!(id = %id, "object stored");
        Ok(info.stored())
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get_info(&self, id: &str) -> StorageResult<ObjectInfo> {
        let path = self.object_path(id).await?;
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(id.to_string()));
        }
        let raw = fs::read(Self::sidecar_path(&path))
            .await
            .map_err(Self::not_found(id))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn get(&self, id: &str) -> StorageResult<Bytes> {
        let path = self.object_path(id).await?;
        let data = fs::read(&path).await.map_err(Self::not_found(id))?;
        Ok(Bytes::from(data))
    }

    fn url_for(&self, id: &str) -> String {
        gateway_url(&self.gateway, id)
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn health_check(&self) -> StorageResult<()> {
        let dir = self.root.join(OBJECTS_DIR);
        let metadata = fs::metadata(&dir).await?;
        if !metadata.is_dir() {
            return Err(StorageError::Config(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(())
    }
}
