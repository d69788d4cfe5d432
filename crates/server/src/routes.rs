//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::trace::trace_id_middleware;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Room for the multipart framing and text fields around the file itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state
        .config
        .server
        .max_upload_bytes
        .saturating_add(FORM_OVERHEAD_BYTES);

    let api_routes = Router::new()
        // Health check (unauthenticated for load balancer probes)
        .route("/api/health", get(handlers::health_check))
        // Catalog
        .route(
            "/api/artworks",
            get(handlers::list_artworks)
                .post(handlers::upload_artwork)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/artworks/{artwork_id}",
            get(handlers::get_artwork)
                .put(handlers::update_artwork)
                .delete(handlers::delete_artwork),
        )
        .route(
            "/api/artworks/{artwork_id}/like",
            post(handlers::like_artwork),
        )
        // Identity
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/connect", post(handlers::connect_wallet))
        .route(
            "/api/users/wallet/{address}",
            get(handlers::get_user_by_wallet),
        )
        .route(
            "/api/users/check-username/{username}",
            get(handlers::check_username),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route(
            "/api/users/{user_id}/profile",
            put(handlers::update_profile),
        );

    // Resolves `{gateway_url}/{id}` when the gateway points back at this server.
    let file_routes = Router::new().route("/files/{id}", get(handlers::get_file));

    let mut router = Router::new().merge(api_routes).merge(file_routes);

    // When enabled, keep /metrics reachable from the scraper network only.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    // Layers run outermost first: TraceLayer -> CORS -> trace id -> handler.
    router
        .layer(middleware::from_fn(trace_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
