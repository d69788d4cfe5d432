//! Permanent object storage abstraction and backends for the gallery.
//!
//! This crate provides:
//! - The [`PermanentStore`] trait: put bytes, get a permanent id and URL
//! - Id minting from content digest plus a per-call nonce
//! - Backends: in-memory and local filesystem

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{
    filesystem::FilesystemBackend,
    memory::{MemoryBackend, StoreCall},
};
pub use error::{StorageError, StorageResult};
pub use traits::{ObjectInfo, ObjectStatus, PermanentStore, StoredObject};

use gallery_core::config::{StorageBackendConfig, StorageConfig};
use std::sync::Arc;

/// Create a permanent store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn PermanentStore>> {
    config.validate().map_err(StorageError::Config)?;

    match &config.backend {
        StorageBackendConfig::Memory => Ok(Arc::new(MemoryBackend::new(&config.gateway_url))),
        StorageBackendConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path, &config.gateway_url).await?;
            Ok(Arc::new(backend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use gallery_core::StorageTags;
    use tempfile::tempdir;

    #[tokio::test]
    async fn from_config_filesystem_ok() {
        let temp = tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackendConfig::Filesystem {
                path: temp.path().join("store"),
            },
            ..Default::default()
        };

        let store = from_config(&config).await.unwrap();
        assert_eq!(store.backend_name(), "filesystem");
        let stored = store
            .put(Bytes::from_static(b"hi"), "image/png", &StorageTags::new())
            .await
            .unwrap();
        assert!(stored.url.starts_with("https://gateway.irys.xyz/"));
    }

    #[tokio::test]
    async fn from_config_memory_ok() {
        let config = StorageConfig {
            backend: StorageBackendConfig::Memory,
            ..Default::default()
        };
        let store = from_config(&config).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        store.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn from_config_rejects_invalid_gateway() {
        let config = StorageConfig {
            backend: StorageBackendConfig::Memory,
            gateway_url: "ftp://gateway".to_string(),
            ..Default::default()
        };

        match from_config(&config).await {
            Ok(_) => panic!("expected error"),
            Err(StorageError::Config(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
}
