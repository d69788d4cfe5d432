//! HTTP API server for the permanent-storage art gallery.
//!
//! This crate provides:
//! - The artwork ingestion pipeline (sniff, store, thumbnail, catalog)
//! - Catalog endpoints: listing, views, likes, owner edits
//! - Identity endpoints: wallet connect, profiles, username checks
//! - Health, Prometheus metrics and stored-object serving

pub mod error;
pub mod extract;
pub mod handlers;
pub mod ingest;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod trace;
pub mod views;

pub use error::ApiError;
pub use ingest::{ArtworkSubmission, ingest};
pub use routes::create_router;
pub use state::AppState;
pub use trace::TraceId;
