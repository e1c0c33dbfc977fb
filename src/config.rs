use std::env;
use std::time::Duration;

use crate::services::loader::{FetchOptions, PlaylistSource};
use crate::services::view::{ViewOptions, ITEMS_PER_PAGE};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Sources
    /// Ordered candidates, e.g. "lista.m3u,link:linkM3U.txt"
    pub playlist_sources: Vec<String>,
    /// Last-resort remote playlist, tried after `playlist_sources`
    pub playlist_fallback_url: Option<String>,

    // Fetching
    /// None = no client timeout
    pub fetch_timeout_ms: Option<u64>,
    pub max_playlist_mb: u64,
    pub user_agent: String,

    // Cache
    pub cache_dir: String,
    pub cache_ttl_ms: u64,
    pub cache_max_bytes: usize,

    // Classification
    pub classifier_rules_path: Option<String>,

    // View
    pub items_per_page: usize,
    pub player_page: String,
    pub login_page: String,
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Result<String, env::VarError>) -> Option<String> {
    value.ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),

            // Sources
            playlist_sources: parse_list(
                &env::var("PLAYLIST_SOURCES").unwrap_or_else(|_| "lista.m3u,link:linkM3U.txt".to_string()),
            ),
            playlist_fallback_url: non_empty(env::var("PLAYLIST_FALLBACK_URL")),

            // Fetching
            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ms: &u64| *ms > 0),

            max_playlist_mb: env::var("MAX_PLAYLIST_MB")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),

            // Misc - Use VLC user agent to avoid IPTV server blocks
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "VLC/3.0.20 LibVLC/3.0.20".to_string()),

            // Cache
            cache_dir: env::var("CACHE_DIR").unwrap_or_else(|_| ".catalog-cache".to_string()),
            cache_ttl_ms: env::var("CACHE_TTL_MS")
                .unwrap_or_else(|_| "86400000".to_string())
                .parse()
                .unwrap_or(86_400_000), // 24 hours
            cache_max_bytes: env::var("CACHE_MAX_BYTES")
                .unwrap_or_else(|_| "5242880".to_string())
                .parse()
                .unwrap_or(5 * 1024 * 1024),

            // Classification
            classifier_rules_path: non_empty(env::var("CLASSIFIER_RULES_PATH")),

            // View
            items_per_page: env::var("ITEMS_PER_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(ITEMS_PER_PAGE),
            player_page: env::var("PLAYER_PAGE").unwrap_or_else(|_| "player-page.html".to_string()),
            login_page: env::var("LOGIN_PAGE").unwrap_or_else(|_| "index.html".to_string()),
        }
    }

    /// Candidate sources in try order, remote fallback last
    pub fn sources(&self) -> Vec<PlaylistSource> {
        self.playlist_sources
            .iter()
            .chain(self.playlist_fallback_url.iter())
            .filter_map(|spec| PlaylistSource::parse(spec))
            .collect()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            timeout: self.fetch_timeout_ms.map(Duration::from_millis),
            max_playlist_bytes: self.max_playlist_mb * 1024 * 1024,
        }
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            items_per_page: self.items_per_page,
            player_page: self.player_page.clone(),
            login_page: self.login_page.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
