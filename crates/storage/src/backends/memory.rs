//! In-process storage backend.
//!
//! Objects live only as long as the process. Every call is recorded so tests
//! can assert on what the store was asked to do, and puts can be made to fail
//! or stall to exercise upstream failure handling.

use crate::error::{StorageError, StorageResult};
use crate::traits::{
    ObjectInfo, ObjectStatus, PermanentStore, StoredObject, gateway_url, mint_id, validate_id,
};
use async_trait::async_trait;
use bytes::Bytes;
use gallery_core::StorageTags;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// A call made against a [`MemoryBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    Put { content_type: String },
    GetInfo(String),
    Get(String),
    Delete(String),
}

#[derive(Default)]
struct Faults {
    /// Content types whose puts are rejected.
    reject: HashSet<String>,
    /// Delay applied before every put.
    put_delay: Option<Duration>,
}

/// In-memory permanent store.
pub struct MemoryBackend {
    gateway: String,
    objects: RwLock<HashMap<String, (Bytes, ObjectInfo)>>,
    calls: RwLock<Vec<StoreCall>>,
    faults: RwLock<Faults>,
}

impl MemoryBackend {
    pub fn new(gateway: impl Into<String>) -> Self {
        Self {
            gateway: gateway.into(),
            objects: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            faults: RwLock::new(Faults::default()),
        }
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().await.clone()
    }

    /// Number of puts received, including rejected ones.
    pub async fn put_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, StoreCall::Put { .. }))
            .count()
    }

    /// Number of delete attempts received.
    pub async fn delete_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, StoreCall::Delete(_)))
            .count()
    }

    /// Number of objects held.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Reject every subsequent put with this content type.
    pub async fn reject_content_type(&self, content_type: impl Into<String>) {
        self.faults.write().await.reject.insert(content_type.into());
    }

    /// Stall every subsequent put for `delay`.
    pub async fn delay_puts(&self, delay: Duration) {
        self.faults.write().await.put_delay = Some(delay);
    }

    async fn record(&self, call: StoreCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl PermanentStore for MemoryBackend {
    #[instrument(skip(self, data, tags), fields(backend = "memory", size = data.len()))]
    async fn put(
        &self,
        data: Bytes,
        content_type: &str,
        tags: &StorageTags,
    ) -> StorageResult<StoredObject> {
        self.record(StoreCall::Put {
            content_type: content_type.to_string(),
        })
        .await;

        let (rejected, delay) = {
            let faults = self.faults.read().await;
            (faults.reject.contains(content_type), faults.put_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if rejected {
            return Err(StorageError::Rejected(format!(
                "content type {content_type} refused"
            )));
        }

        let id = mint_id(&data);
        let info = ObjectInfo {
            url: self.url_for(&id),
            id: id.clone(),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            tags: tags.clone(),
            status: ObjectStatus::Confirmed,
            created_at: OffsetDateTime::now_utc(),
        };
        let stored = info.stored();

        let mut objects = self.objects.write().await;
        if objects.contains_key(&id) {
            return Err(StorageError::AlreadyExists(id));
        }
        objects.insert(id.clone(), (data, info));
        debug!(id = %id, "object stored");
        Ok(stored)
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn get_info(&self, id: &str) -> StorageResult<ObjectInfo> {
        self.record(StoreCall::GetInfo(id.to_string())).await;
        validate_id(id)?;
        self.objects
            .read()
            .await
            .get(id)
            .map(|(_, info)| info.clone())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn get(&self, id: &str) -> StorageResult<Bytes> {
        self.record(StoreCall::Get(id.to_string())).await;
        validate_id(id)?;
        self.objects
            .read()
            .await
            .get(id)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    #[instrument(skip(self), fields(backend = "memory"))]
    async fn delete(&self, id: &str) -> StorageResult<()> {
        self.record(StoreCall::Delete(id.to_string())).await;
        Err(StorageError::Immutable(id.to_string()))
    }

    fn url_for(&self, id: &str) -> String {
        gateway_url(&self.gateway, id)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
