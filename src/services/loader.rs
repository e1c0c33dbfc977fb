use reqwest::Client;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::{CatalogError, Result, SourceFailure};
use crate::models::Catalog;
use crate::services::cache::{CacheLookup, CacheWrite, CatalogCache};
use crate::services::classifier::ContentClassifier;
use crate::services::m3u_parser::parse_playlist;
use crate::services::metrics::{CATALOG_LOADS, SOURCE_FAILURES};

/// Query parameters whose values never reach the logs
const SECRET_PARAMS: &[&str] = &["password", "pass", "pwd", "token", "key"];

/// One candidate location for the playlist document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    /// Local playlist file
    File(PathBuf),
    /// Local file whose first non-empty line is the playlist URL
    Link(PathBuf),
    /// HTTP(S) playlist URL
    Remote(String),
}

impl PlaylistSource {
    /// `link:<path>` → Link, `http(s)://...` → Remote, anything else → File
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }
        if let Some(path) = spec.strip_prefix("link:") {
            return Some(PlaylistSource::Link(PathBuf::from(path.trim())));
        }
        if spec.starts_with("http://") || spec.starts_with("https://") {
            return Some(PlaylistSource::Remote(spec.to_string()));
        }
        Some(PlaylistSource::File(PathBuf::from(spec)))
    }

    /// Human readable, credential-free description
    pub fn label(&self) -> String {
        match self {
            PlaylistSource::File(path) => path.display().to_string(),
            PlaylistSource::Link(path) => format!("link:{}", path.display()),
            PlaylistSource::Remote(url) => redact_url(url),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            PlaylistSource::File(_) => "file",
            PlaylistSource::Link(_) => "link",
            PlaylistSource::Remote(_) => "remote",
        }
    }
}

/// Mask userinfo passwords and secret query values
pub fn redact_url(raw: &str) -> String {
    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };

    if url.password().is_some() {
        let _ = url.set_password(Some("***"));
    }

    if url.query().is_some() {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let secret = SECRET_PARAMS.iter().any(|s| k.eq_ignore_ascii_case(s));
                let value = if secret { "***".to_string() } else { v.into_owned() };
                (k.into_owned(), value)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    url.to_string()
}

/// Where a loaded catalog came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CatalogOrigin {
    Cache,
    Source { index: usize, label: String },
}

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub origin: CatalogOrigin,
}

/// HTTP client settings for remote sources
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    /// None = no client-side timeout
    pub timeout: Option<Duration>,
    pub max_playlist_bytes: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: "VLC/3.0.20 LibVLC/3.0.20".to_string(),
            timeout: None,
            max_playlist_bytes: 500 * 1024 * 1024,
        }
    }
}

/// Cache-first playlist loader with ordered source fallback
pub struct CatalogLoader {
    client: Client,
    cache: CatalogCache,
    classifier: ContentClassifier,
    sources: Vec<PlaylistSource>,
    max_playlist_bytes: u64,
}

impl CatalogLoader {
    pub fn new(
        cache: CatalogCache,
        classifier: ContentClassifier,
        sources: Vec<PlaylistSource>,
        options: FetchOptions,
    ) -> Self {
        let mut builder = Client::builder().user_agent(&options.user_agent).gzip(true);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().expect("Failed to create HTTP client");

        Self {
            client,
            cache,
            classifier,
            sources,
            max_playlist_bytes: options.max_playlist_bytes,
        }
    }

    pub fn cache(&self) -> &CatalogCache {
        &self.cache
    }

    pub fn sources(&self) -> &[PlaylistSource] {
        &self.sources
    }

    /// Cached catalog when fresh, otherwise the first source that answers
    pub async fn load(&self) -> Result<LoadedCatalog> {
        match self.cache.read().await {
            CacheLookup::Hit(catalog) => {
                tracing::info!("Catalog loaded from cache");
                CATALOG_LOADS.with_label_values(&["cache"]).inc();
                return Ok(LoadedCatalog {
                    catalog,
                    origin: CatalogOrigin::Cache,
                });
            }
            CacheLookup::Miss(reason) => {
                tracing::info!(reason = reason.as_str(), "Catalog cache miss");
            }
        }

        self.load_from_sources().await
    }

    /// Try every source in order, strictly one at a time.
    ///
    /// Transport failures move on to the next candidate; a body that parses
    /// to nothing ends the attempt with a content error.
    pub async fn load_from_sources(&self) -> Result<LoadedCatalog> {
        if self.sources.is_empty() {
            return Err(CatalogError::NoSources);
        }

        let mut failures: Vec<SourceFailure> = Vec::with_capacity(self.sources.len());

        for (index, source) in self.sources.iter().enumerate() {
            let label = source.label();
            tracing::info!(source = %label, "Fetching playlist");

            let body = match self.fetch(source).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(source = %label, "Playlist source failed: {}", e);
                    SOURCE_FAILURES.with_label_values(&[source.kind()]).inc();
                    failures.push(e.into());
                    continue;
                }
            };

            tracing::info!("Playlist size: {:.2} MB", body.len() as f64 / 1024.0 / 1024.0);

            let catalog = match parse_playlist(&body, &self.classifier) {
                Ok(catalog) => catalog,
                Err(e) => {
                    CATALOG_LOADS.with_label_values(&["content_error"]).inc();
                    return Err(e);
                }
            };

            match self.cache.write(&catalog).await {
                Ok(CacheWrite::Stored { bytes }) => tracing::info!(bytes = bytes, "Catalog cached"),
                Ok(outcome) => tracing::info!("Catalog not cached: {:?}", outcome),
                Err(e) => tracing::error!("Failed to save cache: {}", e),
            }

            CATALOG_LOADS.with_label_values(&["source"]).inc();
            return Ok(LoadedCatalog {
                catalog,
                origin: CatalogOrigin::Source { index, label },
            });
        }

        tracing::error!(attempts = failures.len(), "All playlist sources failed");
        CATALOG_LOADS.with_label_values(&["transport_error"]).inc();
        Err(CatalogError::AllSourcesFailed(failures))
    }

    async fn fetch(&self, source: &PlaylistSource) -> Result<String> {
        match source {
            PlaylistSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CatalogError::transport(source.label(), e.to_string())),
            PlaylistSource::Link(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| CatalogError::transport(source.label(), e.to_string()))?;
                let url = content
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .ok_or_else(|| CatalogError::transport(source.label(), "link file is empty"))?;
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(CatalogError::transport(
                        source.label(),
                        "link file does not contain an http(s) URL",
                    ));
                }
                self.fetch_remote(url).await
            }
            PlaylistSource::Remote(url) => self.fetch_remote(url).await,
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<String> {
        let label = redact_url(url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::transport(&label, format!("network error: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let friendly = match status {
                reqwest::StatusCode::NOT_FOUND => "Playlist não encontrada (404). Verifique a URL.".to_string(),
                reqwest::StatusCode::FORBIDDEN => "Acesso negado (403). A playlist pode exigir autenticação.".to_string(),
                _ => {
                    let reason = status.canonical_reason().unwrap_or("Erro");
                    format!("HTTP {}: {}", status.as_u16(), reason)
                }
            };
            return Err(CatalogError::transport(label, friendly));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_playlist_bytes {
                return Err(self.too_large(label, len));
            }
        }

        // Chunked bodies carry no length up front; count while reading
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CatalogError::transport(&label, format!("read error: {}", e.without_url())))?
        {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > self.max_playlist_bytes {
                return Err(self.too_large(label, body.len() as u64));
            }
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn too_large(&self, label: String, len: u64) -> CatalogError {
        CatalogError::transport(
            label,
            format!(
                "Playlist muito grande: {:.1}MB (limite {:.0}MB)",
                len as f64 / 1024f64 / 1024f64,
                self.max_playlist_bytes as f64 / 1024f64 / 1024f64
            ),
        )
    }
}
