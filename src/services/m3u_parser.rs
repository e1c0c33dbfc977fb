use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::error::{CatalogError, Result};
use crate::models::{Catalog, RawEntry};
use crate::services::classifier::ContentClassifier;

const EXTINF_PREFIX: &str = "#EXTINF:";

/// Title used when neither the trailing comma text nor tvg-name is present
const UNKNOWN_TITLE: &str = "Unknown Channel";

lazy_static! {
    /// Regex to parse EXTINF attributes (tvg-name="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"([\w]+(?:-\w+)*)="([^"]*)""#).unwrap();
}

/// Parsed EXTINF line data
#[derive(Debug, Default)]
struct ExtinfData {
    /// Attribute names lowercased
    attributes: HashMap<String, String>,
    title: String,
}

/// Position of the last comma that is not inside a quoted attribute value
fn title_separator(content: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut last = None;
    for (pos, ch) in content.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => last = Some(pos),
            _ => {}
        }
    }
    last
}

/// Parse an EXTINF line
/// Format: #EXTINF:-1 tvg-name="..." tvg-logo="..." group-title="...",Title
fn parse_extinf(line: &str) -> Option<ExtinfData> {
    let content = line.strip_prefix(EXTINF_PREFIX)?;

    // Title is whatever follows the last unquoted comma
    let (header, comma_title) = match title_separator(content) {
        Some(pos) => (&content[..pos], content[pos + 1..].trim()),
        None => (content, ""),
    };

    let mut attributes = HashMap::new();
    for caps in ATTR_REGEX.captures_iter(header) {
        let key = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
        let value = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        attributes.entry(key).or_insert(value);
    }

    let title = if !comma_title.is_empty() {
        comma_title.to_string()
    } else {
        attributes
            .get("tvg-name")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_TITLE)
            .to_string()
    };

    Some(ExtinfData { attributes, title })
}

impl ExtinfData {
    /// Attach the URL that terminated this entry
    fn into_entry(mut self, url: &str) -> RawEntry {
        RawEntry {
            title: self.title,
            url: url.to_string(),
            group: self
                .attributes
                .remove("group-title")
                .map(|g| g.to_lowercase())
                .unwrap_or_default(),
            logo: self.attributes.remove("tvg-logo").unwrap_or_default(),
        }
    }
}

/// Parse playlist text into a categorized catalog.
///
/// A metadata line always replaces the pending one, so an entry whose URL
/// line never shows up is dropped. An empty catalog is a content error.
pub fn parse_playlist(content: &str, classifier: &ContentClassifier) -> Result<Catalog> {
    let mut catalog = Catalog::default();
    let mut pending: Option<ExtinfData> = None;
    let mut dropped = 0usize;
    let mut found_header = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with(EXTINF_PREFIX) {
            if pending.is_some() {
                dropped += 1;
            }
            pending = parse_extinf(trimmed);
            continue;
        }

        if trimmed.starts_with('#') {
            if trimmed.starts_with("#EXTM3U") {
                found_header = true;
            }
            continue;
        }

        if let Some(extinf) = pending.take() {
            let kind = classifier.categorize(extinf.into_entry(trimmed), &mut catalog);
            tracing::trace!(kind = %kind, "Entry categorized");
        }
    }

    if pending.is_some() {
        dropped += 1;
    }

    if !found_header {
        tracing::debug!("Playlist has no #EXTM3U header");
    }

    if catalog.is_empty() {
        tracing::warn!(dropped_entries = dropped, "Playlist produced an empty catalog");
        return Err(CatalogError::Content);
    }

    let stats = catalog.stats();
    tracing::info!(
        movies = stats.movie_count,
        series = stats.series_count,
        episodes = stats.episode_count,
        live = stats.live_count,
        dropped_entries = dropped,
        "Parsing complete"
    );

    Ok(catalog)
}
