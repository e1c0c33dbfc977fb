use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Media type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    Live,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Series => write!(f, "series"),
            MediaKind::Live => write!(f, "live"),
        }
    }
}

/// One #EXTINF entry waiting for (or just terminated by) its URL line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub url: String,
    /// Always lowercased
    pub group: String,
    pub logo: String,
}

/// Movie or live channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub logo: String,
}

/// Series with episodes bucketed by season ("1", "2", ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    pub display_name: String,
    #[serde(default)]
    pub logo: String,
    pub seasons: BTreeMap<String, Vec<Episode>>,
}

impl SeriesEntry {
    pub fn new(display_name: String, logo: String) -> Self {
        Self {
            display_name,
            logo,
            seasons: BTreeMap::new(),
        }
    }

    pub fn episode_count(&self) -> usize {
        self.seasons.values().map(Vec::len).sum()
    }

    /// Seasons ordered numerically ("2" before "10"); non-numeric keys go last
    pub fn sorted_seasons(&self) -> Vec<(&str, &[Episode])> {
        let mut seasons: Vec<(&str, &[Episode])> = self
            .seasons
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
            .collect();
        seasons.sort_by_key(|(k, _)| (k.parse::<u32>().unwrap_or(u32::MAX), k.to_string()));
        seasons
    }
}

/// Full categorized result of one playlist parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub movies: Vec<MediaItem>,
    /// Keyed by lowercased display name
    #[serde(default)]
    pub series: BTreeMap<String, SeriesEntry>,
    #[serde(default)]
    pub live_channels: Vec<MediaItem>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.series.is_empty() && self.live_channels.is_empty()
    }

    /// Append an episode, creating the series and season bucket on first use.
    /// Display name and logo of an existing series are never overwritten.
    pub fn add_episode(&mut self, display_name: String, logo: &str, season: String, episode: Episode) {
        let key = display_name.to_lowercase();
        self.series
            .entry(key)
            .or_insert_with(|| SeriesEntry::new(display_name, logo.to_string()))
            .seasons
            .entry(season)
            .or_default()
            .push(episode);
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            movie_count: self.movies.len(),
            series_count: self.series.len(),
            episode_count: self.series.values().map(SeriesEntry::episode_count).sum(),
            live_count: self.live_channels.len(),
        }
    }
}

/// Catalog statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub movie_count: usize,
    pub series_count: usize,
    pub episode_count: usize,
    pub live_count: usize,
}

/// Persisted cache slot: `{ "timestamp": <epoch ms>, "data": <Catalog> }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub timestamp: i64,
    pub data: Catalog,
}
