//! Application state shared across handlers.

use gallery_core::config::AppConfig;
use gallery_core::{PageRequest, Thumbnailer};
use gallery_metadata::MetadataStore;
use gallery_storage::PermanentStore;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Permanent storage for artwork bytes and thumbnails.
    pub storage: Arc<dyn PermanentStore>,
    /// Catalog and identity store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Thumbnail deriver configured from `[thumbnail]`.
    pub thumbnailer: Arc<Thumbnailer>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn PermanentStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let thumbnailer = Thumbnailer::new(&config.thumbnail);
        Self {
            config: Arc::new(config),
            storage,
            metadata,
            thumbnailer: Arc::new(thumbnailer),
        }
    }

    /// Upper bound for a single storage call.
    pub fn storage_timeout(&self) -> Duration {
        self.config.storage.timeout()
    }

    /// Largest artwork accepted by the ingestion pipeline.
    pub fn max_upload_bytes(&self) -> usize {
        self.config.server.max_upload_bytes
    }

    /// Resolve client paging parameters against the configured defaults.
    pub fn page_request(&self, page: Option<i64>, per_page: Option<i64>) -> PageRequest {
        PageRequest::new(
            page,
            per_page,
            self.config.server.default_per_page,
            self.config.server.max_per_page,
        )
    }
}
