mod config;
mod error;
mod models;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::{
    cache::CatalogCache,
    classifier::{ClassifierRules, ContentClassifier},
    loader::CatalogLoader,
    session::CatalogSession,
    view::CatalogView,
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub session: CatalogSession,
    pub view: CatalogView,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iptv_catalog=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting IPTV Catalog v{}", env!("CARGO_PKG_VERSION"));

    let cache = CatalogCache::new(&config.cache_dir, config.cache_ttl(), config.cache_max_bytes).await?;
    tracing::info!("Catalog cache initialized: {}", config.cache_dir);

    let rules = match &config.classifier_rules_path {
        Some(path) => {
            tracing::info!("Loading classifier rules from {}", path);
            ClassifierRules::from_file(path).await?
        }
        None => ClassifierRules::default(),
    };
    let classifier = ContentClassifier::new(rules)?;

    let sources = config.sources();
    if sources.is_empty() {
        tracing::warn!("No playlist sources configured");
    }
    for (index, source) in sources.iter().enumerate() {
        tracing::info!(index = index, source = %source.label(), "Playlist source");
    }

    let loader = CatalogLoader::new(cache, classifier, sources, config.fetch_options());
    let session = CatalogSession::new(loader);
    let view = CatalogView::new(config.view_options());

    // Build application state
    let state = Arc::new(AppState {
        config,
        session,
        view,
        start_time: Instant::now(),
    });

    // Initial load; the server still starts with an empty catalog on failure
    match state.session.reload().await {
        Ok(catalog) => {
            let stats = catalog.stats();
            tracing::info!(
                movies = stats.movie_count,
                series = stats.series_count,
                live = stats.live_count,
                "Catalog ready"
            );
        }
        Err(e) => tracing::warn!("Initial catalog load failed: {}", e),
    }

    let app = routes::build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
