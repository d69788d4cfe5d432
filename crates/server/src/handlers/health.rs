//! Health endpoint.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
    pub metadata: &'static str,
    pub storage_backend: &'static str,
}

fn component(ok: bool) -> &'static str {
    if ok { "ok" } else { "unavailable" }
}

/// GET /api/health
///
/// Unauthenticated so load balancers can probe it. Returns 503 when either
/// store is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (storage, metadata) =
        tokio::join!(state.storage.health_check(), state.metadata.health_check());

    if let Err(e) = &storage {
        tracing::warn!(error = %e, "storage health check failed");
    }
    if let Err(e) = &metadata {
        tracing::warn!(error = %e, "metadata health check failed");
    }

    let healthy = storage.is_ok() && metadata.is_ok();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" },
            storage: component(storage.is_ok()),
            metadata: component(metadata.is_ok()),
            storage_backend: state.storage.backend_name(),
        }),
    )
}
