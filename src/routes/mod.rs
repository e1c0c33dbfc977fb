pub mod catalog;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/ready", get(health::ready))
        .route("/live", get(health::live))
        // Catalog endpoints
        .route("/api/catalog/movies", get(catalog::get_movies))
        .route("/api/catalog/series", get(catalog::get_series))
        .route("/api/catalog/series/:key", get(catalog::get_series_detail))
        .route("/api/catalog/live", get(catalog::get_live_channels))
        .route("/api/catalog/stats", get(catalog::get_stats))
        .route("/api/catalog/reload", post(catalog::reload_catalog))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
