//! Server test utilities.

use super::fixtures::MultipartForm;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use gallery_core::config::{AppConfig, MetadataConfig};
use gallery_metadata::{MetadataStore, SqliteStore};
use gallery_server::{AppState, create_router};
use gallery_storage::MemoryBackend;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Gateway the in-memory store builds URLs from.
pub const GATEWAY: &str = "https://gateway.test";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    /// Direct handle on the storage fake for call assertions and fault injection.
    pub storage: Arc<MemoryBackend>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with an in-memory store and a SQLite catalog.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("gallery.db");

        let mut config = AppConfig::for_testing();
        config.storage.gateway_url = GATEWAY.to_string();
        config.metadata = MetadataConfig::Sqlite {
            path: db_path.clone(),
        };
        modifier(&mut config);

        let storage = Arc::new(MemoryBackend::new(&config.storage.gateway_url));
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create metadata store"),
        );

        gallery_server::metrics::register_metrics();
        let state = AppState::new(config, storage.clone(), metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            storage,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }

    /// Send a raw request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed")
    }

    /// Send a request with an optional JSON body and decode the JSON reply.
    pub async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&v).expect("Failed to encode JSON"))
            }
            None => Body::empty(),
        };
        let response = self
            .send(builder.body(body).expect("Failed to build request"))
            .await;
        decode(response).await
    }

    /// Submit an upload form to `POST /api/artworks`.
    pub async fn upload(&self, form: MultipartForm) -> (StatusCode, Value) {
        let response = self.send(form.into_request("/api/artworks")).await;
        decode(response).await
    }

    /// Connect a wallet and return the user id.
    pub async fn connect(&self, wallet: &str) -> i64 {
        let (status, body) = self
            .json(
                "POST",
                "/api/users/connect",
                Some(serde_json::json!({ "wallet_address": wallet })),
            )
            .await;
        assert!(status.is_success(), "connect failed: {status} {body}");
        body["user"]["id"].as_i64().expect("user id in connect response")
    }

    /// Upload an artwork that must succeed, returning the artwork JSON.
    pub async fn upload_ok(&self, form: MultipartForm) -> Value {
        let (status, body) = self.upload(form).await;
        assert_eq!(status, StatusCode::CREATED, "upload failed: {body}");
        body["artwork"].clone()
    }
}

/// Split a response into status and JSON body (`Null` when empty or not JSON).
pub async fn decode(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");

    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}
