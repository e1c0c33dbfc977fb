use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;

use crate::models::CatalogStats;
use crate::AppState;

/// Root endpoint - basic status
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "IPTV Catalog",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "runtime": "rust"
    }))
}

/// Cache settings
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheInfo {
    dir: String,
    ttl_ms: u64,
    max_bytes: usize,
}

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    uptime: u64,
    sources: usize,
    catalog: CatalogStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    loaded_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
    cache: CacheInfo,
}

/// GET /health - Catalog health
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();
    let status = state.session.status().await;
    let has_catalog = !state.session.current().await.is_empty();

    // A failed reload over a good catalog still serves the old one
    let label = match (has_catalog, status.last_error.is_some()) {
        (true, false) => "ok",
        (true, true) => "degraded",
        (false, _) => "unhealthy",
    };

    Json(HealthResponse {
        status: label.to_string(),
        uptime,
        sources: state.session.loader().sources().len(),
        catalog: status.stats,
        loaded_at: status.loaded_at,
        last_error: status.last_error,
        cache: CacheInfo {
            dir: state.config.cache_dir.clone(),
            ttl_ms: state.session.loader().cache().ttl().as_millis() as u64,
            max_bytes: state.config.cache_max_bytes,
        },
    })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                b"Internal Server Error".to_vec(),
            )
        }
    }
}

/// Readiness probe: ready once a catalog is being served
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.session.current().await.is_empty() {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready - catalog not loaded")
    } else {
        (StatusCode::OK, "ready")
    }
}

/// Liveness probe (for Kubernetes)
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::cache::{CatalogCache, DEFAULT_MAX_CACHE_BYTES};
    use crate::services::classifier::ContentClassifier;
    use crate::services::loader::{CatalogLoader, FetchOptions, PlaylistSource};
    use crate::services::session::CatalogSession;
    use crate::services::view::CatalogView;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::{Duration, Instant};
    use tower::ServiceExt;

    async fn state_with(playlist: &str) -> (std::path::PathBuf, Arc<AppState>) {
        let dir = std::env::temp_dir().join(format!("catalog-health-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("lista.m3u");
        tokio::fs::write(&path, playlist).await.unwrap();

        let cache = CatalogCache::new(dir.join("cache"), Duration::from_secs(60), DEFAULT_MAX_CACHE_BYTES)
            .await
            .unwrap();
        let loader = CatalogLoader::new(
            cache,
            ContentClassifier::default(),
            vec![PlaylistSource::File(path)],
            FetchOptions::default(),
        );
        let state = Arc::new(AppState {
            config: Config::from_env(),
            session: CatalogSession::new(loader),
            view: CatalogView::default(),
            start_time: Instant::now(),
        });
        (dir, state)
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = crate::routes::build_router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_health_follows_catalog_state() {
        let (dir, state) = state_with("#EXTINF:-1,Globo\nhttp://example.com/globo.m3u8\n").await;

        let (status, _) = get(&state, "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let (_, body) = get(&state, "/health").await;
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "unhealthy");
        assert_eq!(health["sources"], 1);
        assert_eq!(health["cache"]["ttlMs"], 60_000);

        state.session.reload().await.unwrap();

        let (status, _) = get(&state, "/ready").await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = get(&state, "/health").await;
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["catalog"]["liveCount"], 1);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_metrics_and_live() {
        let (dir, state) = state_with("#EXTINF:-1,Globo\nhttp://example.com/globo.m3u8\n").await;
        state.session.reload().await.unwrap();

        let (status, body) = get(&state, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8_lossy(&body).contains("catalog_loads_total"));

        let (status, body) = get(&state, "/live").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"alive");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
