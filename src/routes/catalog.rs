use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::CatalogError;
use crate::models::{CatalogQuery, CatalogStats, ReloadQuery};
use crate::services::loader::CatalogOrigin;
use crate::services::view::AuthGate;
use crate::AppState;

/// Presence of this header means "a user is logged in"
pub const CURRENT_USER_HEADER: &str = "x-current-user";

/// Auth gate fed by request headers. Not verified.
pub struct HeaderGate<'a>(&'a HeaderMap);

impl AuthGate for HeaderGate<'_> {
    fn is_logged_in(&self) -> bool {
        self.0
            .get(CURRENT_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }
}

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Map a failed load to a single user-facing error
fn load_error(err: &CatalogError) -> ApiError {
    let status = if err.is_content() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else if err.is_transport() || matches!(err, CatalogError::NoSources) {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let mut body = serde_json::json!({ "error": err.to_string() });
    if let CatalogError::AllSourcesFailed(failures) = err {
        body["failures"] = failures.iter().map(|f| f.to_string()).collect();
    }

    (status, Json(body))
}

/// GET /api/catalog/movies
pub async fn get_movies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let catalog = state.session.current().await;
    Json(state.view.movies(&catalog, &query.filter, query.page))
}

/// GET /api/catalog/series
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let catalog = state.session.current().await;
    Json(state.view.series(&catalog, &query.filter, query.page))
}

/// GET /api/catalog/series/:key - Seasons and episodes of one series
pub async fn get_series_detail(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.session.current().await;
    match state.view.series_detail(&catalog, &key) {
        Some(detail) => Ok(Json(detail)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Série não encontrada" })),
        )),
    }
}

/// GET /api/catalog/live - Channels for logged-in users, placeholder otherwise
pub async fn get_live_channels(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CatalogQuery>,
) -> impl IntoResponse {
    let catalog = state.session.current().await;
    Json(state.view.live_channels(&catalog, &query.filter, &HeaderGate(&headers), query.page))
}

/// GET /api/catalog/stats - Counts and outcome of the last load
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.status().await)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<CatalogOrigin>,
    pub stats: CatalogStats,
}

/// POST /api/catalog/reload - Load again; `?force=true` bypasses the cache
pub async fn reload_catalog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReloadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let result = if query.force {
        state.session.force_reload().await
    } else {
        state.session.reload().await
    };

    let catalog = result.map_err(|e| load_error(&e))?;
    let origin = state.session.status().await.origin;
    tracing::info!(force = query.force, "Catalog reloaded via API");

    Ok(Json(ReloadResponse {
        status: "ok".to_string(),
        origin,
        stats: catalog.stats(),
    }))
}
