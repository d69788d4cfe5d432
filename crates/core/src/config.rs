//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted artwork size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    /// Application marker attached to every stored object as the `App` tag.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Page size used when the client does not send `per_page`.
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    /// Upper bound for client supplied `per_page`.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_max_upload_bytes() -> usize {
    crate::DEFAULT_MAX_UPLOAD_BYTES
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_app_name() -> String {
    "Irys-Gallery".to_string()
}

fn default_per_page() -> u32 {
    crate::page::DEFAULT_PER_PAGE
}

fn default_max_per_page() -> u32 {
    crate::page::MAX_PER_PAGE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            metrics_enabled: default_metrics_enabled(),
            app_name: default_app_name(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes must be greater than zero".to_string());
        }
        if self.app_name.trim().is_empty() {
            return Err("server.app_name must not be empty".to_string());
        }
        if self.default_per_page == 0 || self.max_per_page == 0 {
            return Err("server.default_per_page and server.max_per_page must be positive".to_string());
        }
        if self.default_per_page > self.max_per_page {
            return Err(format!(
                "server.default_per_page {} exceeds server.max_per_page {}",
                self.default_per_page, self.max_per_page
            ));
        }
        Ok(())
    }
}

/// Storage backend selection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageBackendConfig {
    /// In-process store. Objects vanish on restart; intended for tests and demos.
    Memory,
    /// Local append-only directory.
    Filesystem {
        /// Root directory for stored objects.
        path: PathBuf,
    },
}

impl Default for StorageBackendConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/objects"),
        }
    }
}

/// Permanent storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend holds the bytes.
    #[serde(default)]
    pub backend: StorageBackendConfig,
    /// Base URL that resolves stored objects by id (`{gateway_url}/{id}`).
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Upper bound for a single storage call, in seconds.
    #[serde(default = "default_storage_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gateway_url() -> String {
    "https://gateway.irys.xyz".to_string()
}

fn default_storage_timeout_secs() -> u64 {
    30
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendConfig::default(),
            gateway_url: default_gateway_url(),
            timeout_secs: default_storage_timeout_secs(),
        }
    }
}

impl StorageConfig {
    /// Get the per-call timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.gateway_url.starts_with("http://") || self.gateway_url.starts_with("https://")) {
            return Err(format!(
                "storage.gateway_url must start with http:// or https://, got '{}'",
                self.gateway_url
            ));
        }
        if self.timeout_secs == 0 {
            return Err("storage.timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// PostgreSQL SSL mode configuration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PgSslMode {
    /// Disable SSL/TLS entirely.
    Disable,
    /// Prefer SSL/TLS but allow unencrypted connections (default).
    #[default]
    Prefer,
    /// Require SSL/TLS for all connections.
    Require,
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database file (`:memory:` for an ephemeral catalog).
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// PostgreSQL database.
    Postgres {
        /// Connection URL. Takes precedence over individual fields.
        url: Option<String>,
        /// Database host.
        host: Option<String>,
        /// Database port (default: 5432).
        #[serde(default = "default_pg_port")]
        port: Option<u16>,
        /// Database username.
        username: Option<String>,
        /// Database password.
        /// WARNING: Prefer GALLERY_METADATA__PASSWORD env var over storing in config.
        password: Option<String>,
        /// Database name.
        database: Option<String>,
        /// SSL mode for connections.
        ssl_mode: Option<PgSslMode>,
        /// Maximum connections in the pool.
        #[serde(default = "default_max_connections")]
        max_connections: u32,
    },
}

fn default_max_connections() -> u32 {
    10
}

fn default_pg_port() -> Option<u16> {
    Some(5432)
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/gallery.db"),
        }
    }
}

impl MetadataConfig {
    /// Validate metadata configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Sqlite { .. } => Ok(()),
            MetadataConfig::Postgres {
                url,
                host,
                database,
                ..
            } => match (url.as_ref(), host.as_ref(), database.as_ref()) {
                (Some(_), _, _) => Ok(()),
                (None, Some(_), Some(_)) => Ok(()),
                (None, None, _) => Err(
                    "postgres config requires either 'url' or 'host' + 'database'".to_string(),
                ),
                (None, Some(_), None) => Err(
                    "postgres config requires 'database' when using individual fields"
                        .to_string(),
                ),
            },
        }
    }
}

/// Thumbnail derivation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Maximum thumbnail width in pixels.
    #[serde(default = "default_thumbnail_edge")]
    pub max_width: u32,
    /// Maximum thumbnail height in pixels.
    #[serde(default = "default_thumbnail_edge")]
    pub max_height: u32,
    /// JPEG quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

fn default_thumbnail_edge() -> u32 {
    crate::thumbnail::DEFAULT_MAX_EDGE
}

fn default_jpeg_quality() -> u8 {
    crate::thumbnail::DEFAULT_JPEG_QUALITY
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_width: default_thumbnail_edge(),
            max_height: default_thumbnail_edge(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl ThumbnailConfig {
    /// Validate thumbnail configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err("thumbnail bounds must be positive".to_string());
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "thumbnail.jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            ));
        }
        Ok(())
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Permanent storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Thumbnail configuration.
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses the in-memory storage backend and an
    /// in-memory SQLite catalog.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig {
                backend: StorageBackendConfig::Memory,
                ..Default::default()
            },
            metadata: MetadataConfig::Sqlite {
                path: PathBuf::from(":memory:"),
            },
            thumbnail: ThumbnailConfig::default(),
        }
    }

    /// Validate every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.storage.validate()?;
        self.metadata.validate()?;
        self.thumbnail.validate()?;
        Ok(())
    }
}
