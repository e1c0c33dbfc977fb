use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::Result;
use crate::models::{Catalog, CatalogStats};
use crate::services::loader::{CatalogLoader, CatalogOrigin};

/// Outcome of the most recent load attempt
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<CatalogOrigin>,
    /// Epoch ms of the last successful load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub stats: CatalogStats,
}

/// Owns the current catalog.
///
/// Each successful load swaps in a new immutable `Arc<Catalog>`; readers keep
/// whatever snapshot they cloned. A failed load leaves the previous catalog in
/// place. Loads never overlap.
pub struct CatalogSession {
    loader: CatalogLoader,
    current: RwLock<Arc<Catalog>>,
    status: RwLock<SessionStatus>,
    load_lock: Mutex<()>,
}

impl CatalogSession {
    pub fn new(loader: CatalogLoader) -> Self {
        Self {
            loader,
            current: RwLock::new(Arc::new(Catalog::default())),
            status: RwLock::new(SessionStatus::default()),
            load_lock: Mutex::new(()),
        }
    }

    pub fn loader(&self) -> &CatalogLoader {
        &self.loader
    }

    /// Snapshot of the catalog currently shown
    pub async fn current(&self) -> Arc<Catalog> {
        self.current.read().await.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.status.read().await.clone()
    }

    /// Run one load (cache first) and install the result
    pub async fn reload(&self) -> Result<Arc<Catalog>> {
        let _guard = self.load_lock.lock().await;
        self.load_locked().await
    }

    /// Drop the cached record, then load from the sources
    pub async fn force_reload(&self) -> Result<Arc<Catalog>> {
        let _guard = self.load_lock.lock().await;
        if let Err(e) = self.loader.cache().clear().await {
            tracing::warn!("Failed to clear catalog cache: {}", e);
        }
        self.load_locked().await
    }

    async fn load_locked(&self) -> Result<Arc<Catalog>> {
        match self.loader.load().await {
            Ok(loaded) => {
                let catalog = Arc::new(loaded.catalog);
                *self.current.write().await = catalog.clone();

                let mut status = self.status.write().await;
                status.origin = Some(loaded.origin);
                status.loaded_at = Some(chrono::Utc::now().timestamp_millis());
                status.last_error = None;
                status.stats = catalog.stats();

                Ok(catalog)
            }
            Err(e) => {
                tracing::error!("Catalog load failed: {}", e);
                self.status.write().await.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::{CatalogCache, DEFAULT_MAX_CACHE_BYTES};
    use crate::services::classifier::ContentClassifier;
    use crate::services::loader::{FetchOptions, PlaylistSource};
    use std::path::PathBuf;
    use std::time::Duration;

    async fn session_for(dir: &PathBuf, sources: Vec<PlaylistSource>) -> CatalogSession {
        let cache = CatalogCache::new(dir.join("cache"), Duration::from_secs(3600), DEFAULT_MAX_CACHE_BYTES)
            .await
            .unwrap();
        CatalogSession::new(CatalogLoader::new(
            cache,
            ContentClassifier::default(),
            sources,
            FetchOptions::default(),
        ))
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("catalog-session-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_failed_load_keeps_empty_default() {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let empty = dir.join("empty.m3u");
        tokio::fs::write(&empty, "").await.unwrap();
        let session = session_for(&dir, vec![PlaylistSource::File(empty)]).await;

        assert!(session.reload().await.unwrap_err().is_content());
        assert!(session.current().await.is_empty());
        let status = session.status().await;
        assert!(status.last_error.is_some());
        assert!(status.loaded_at.is_none());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_reload_swaps_catalog() {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("list.m3u");
        tokio::fs::write(&path, "#EXTINF:-1 group-title=\"Filmes\",Up\nhttp://example.com/up.mp4\n")
            .await
            .unwrap();
        let session = session_for(&dir, vec![PlaylistSource::File(path.clone())]).await;

        let before = session.current().await;
        let loaded = session.reload().await.unwrap();
        assert!(before.is_empty());
        assert_eq!(loaded.movies.len(), 1);
        assert_eq!(session.current().await.movies[0].title, "Up");

        // Broken source after a good load: previous catalog stays
        tokio::fs::write(&path, "#EXTM3U\n").await.unwrap();
        assert!(session.force_reload().await.is_err());
        assert_eq!(session.current().await.movies.len(), 1);
        assert_eq!(session.status().await.stats.movie_count, 1);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
