//! Metadata store test utilities.

pub mod fixtures;

use gallery_metadata::{MetadataError, MetadataResult, MetadataStore, PostgresStore, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;

/// A file-backed SQLite catalog that is removed on drop.
#[allow(dead_code)]
pub struct TestMetadata {
    pub store: Arc<dyn MetadataStore>,
    _temp_dir: TempDir,
}

impl TestMetadata {
    pub async fn new() -> MetadataResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = SqliteStore::new(temp_dir.path().join("gallery.db")).await?;
        Ok(Self {
            store: Arc::new(store),
            _temp_dir: temp_dir,
        })
    }

    pub fn store(&self) -> Arc<dyn MetadataStore> {
        self.store.clone()
    }
}

/// PostgreSQL catalog backed by a throwaway container.
#[allow(dead_code)]
pub struct PostgresTestMetadata {
    pub store: Arc<dyn MetadataStore>,
    _container: ContainerAsync<Postgres>,
}

impl PostgresTestMetadata {
    pub async fn new() -> MetadataResult<Self> {
        let container = Postgres::default()
            .with_tag("15-alpine")
            .start()
            .await
            .map_err(|e| {
                MetadataError::Internal(format!("Failed to start PostgreSQL container: {e}"))
            })?;

        let host = container.get_host().await.expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get port");

        // Default credentials from testcontainers-modules postgres
        let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");
        let store = PostgresStore::from_url(&url, 5).await?;

        Ok(Self {
            store: Arc::new(store),
            _container: container,
        })
    }

    pub fn store(&self) -> Arc<dyn MetadataStore> {
        self.store.clone()
    }
}

/// Run a test against SQLite and, when Docker is available, PostgreSQL.
#[allow(dead_code)]
pub async fn run_metadata_test_both<F, Fut>(test_fn: F)
where
    F: Fn(Arc<dyn MetadataStore>) -> Fut + Clone,
    Fut: std::future::Future<Output = ()>,
{
    let sqlite = TestMetadata::new()
        .await
        .expect("Failed to create SQLite test metadata");
    test_fn.clone()(sqlite.store()).await;

    if std::env::var("SKIP_POSTGRES_TESTS").is_err() {
        match PostgresTestMetadata::new().await {
            Ok(postgres) => test_fn(postgres.store()).await,
            Err(err) => eprintln!("Skipping PostgreSQL metadata tests: {err}"),
        }
    }
}
