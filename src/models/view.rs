use serde::{Deserialize, Serialize};

use super::catalog::{Episode, MediaKind};

/// Renderable grid card (movie, series or live channel)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub kind: MediaKind,
    pub title: String,
    /// Item logo, or the per-kind placeholder when the playlist had none
    pub logo: String,
    /// Player link for movies/channels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play_href: Option<String>,
    /// Series key for opening the season list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_key: Option<String>,
}

/// One page of a filtered list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, clamped into `1..=total_pages`
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Shown instead of live channels when nobody is logged in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatedPlaceholder {
    pub title: String,
    pub message: String,
    pub login_href: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LiveView {
    Channels(Page<Card>),
    Gated(GatedPlaceholder),
}

/// Season list of a single series (modal content)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDetail {
    pub key: String,
    pub display_name: String,
    pub logo: String,
    pub seasons: Vec<SeasonView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonView {
    pub season: String,
    pub episodes: Vec<EpisodeView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeView {
    pub title: String,
    pub play_href: String,
}

impl EpisodeView {
    pub fn new(episode: &Episode, play_href: String) -> Self {
        Self {
            title: episode.title.clone(),
            play_href,
        }
    }
}

/// Query parameters for list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub filter: String,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

/// Query parameters for the reload endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ReloadQuery {
    #[serde(default)]
    pub force: bool,
}
