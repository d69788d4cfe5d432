//! Prometheus metrics for the gallery server.
//!
//! Exposes metrics for artwork ingestion, thumbnail derivation, storage
//! latency and catalog engagement.
//!
//! The `/metrics` endpoint is unauthenticated. It carries only aggregate
//! counts (no titles, wallets or storage ids), but should still be reachable
//! from the scraper network only.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Ingestion metrics
pub static ARTWORKS_UPLOADED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gallery_artworks_uploaded_total",
            "Total number of artworks ingested, by file type",
        ),
        &["file_type"],
    )
    .expect("metric creation failed")
});

pub static UPLOAD_BYTES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "gallery_upload_bytes_total",
        "Total bytes of original artwork written to permanent storage",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gallery_upload_failures_total",
            "Total rejected or failed uploads by reason",
        ),
        &["reason"],
    )
    .expect("metric creation failed")
});

// Thumbnail metrics
pub static THUMBNAILS_GENERATED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "gallery_thumbnails_generated_total",
        "Total thumbnails derived and stored",
    )
    .expect("metric creation failed")
});

pub static THUMBNAILS_SKIPPED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gallery_thumbnails_skipped_total",
            "Total image uploads stored without a thumbnail, by reason",
        ),
        &["reason"],
    )
    .expect("metric creation failed")
});

// Timing metrics
pub static STORAGE_PUT_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gallery_storage_put_duration_seconds",
            "Time taken by a single permanent storage put",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["object"],
    )
    .expect("metric creation failed")
});

// Engagement metrics
pub static ARTWORK_VIEWS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("gallery_artwork_views_total", "Total artwork views recorded")
        .expect("metric creation failed")
});

pub static ARTWORK_LIKES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("gallery_artwork_likes_total", "Total artwork likes recorded")
        .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so integration tests can build many routers in one process.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(ARTWORKS_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_BYTES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_FAILURES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(THUMBNAILS_GENERATED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(THUMBNAILS_SKIPPED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(STORAGE_PUT_DURATION.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ARTWORK_VIEWS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(ARTWORK_LIKES.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record a failed or rejected upload.
pub fn record_upload_failure(reason: &str) {
    UPLOAD_FAILURES.with_label_values(&[reason]).inc();
}

/// Record an image upload that ended up without a thumbnail.
pub fn record_thumbnail_skipped(reason: &str) {
    THUMBNAILS_SKIPPED.with_label_values(&[reason]).inc();
}
