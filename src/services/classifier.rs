use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CatalogError, Result};
use crate::models::{Catalog, Episode, MediaItem, MediaKind, RawEntry};

lazy_static! {
    /// First character of every word
    static ref WORD_START: Regex = Regex::new(r"\b\w").unwrap();
}

/// Capitalize the first letter of every word, leave the rest untouched
pub fn normalize_title(title: &str) -> String {
    WORD_START
        .replace_all(title.trim(), |caps: &regex::Captures| caps[0].to_uppercase())
        .into_owned()
}

/// Indicator table driving the series / movie / live decision.
///
/// Substring indicators are matched against the lowercased group (and title,
/// for movies). Patterns are regular expressions. Every field falls back to the
/// built-in table when absent from a rules file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifierRules {
    /// Group substrings meaning "series"
    pub series_group_indicators: Vec<String>,
    /// Title patterns meaning "this is an episode"
    pub series_title_patterns: Vec<String>,
    /// Must capture (name, season, episode)
    pub episode_pattern: String,
    /// Where to cut a title to get the series name when `episode_pattern` misses
    pub series_marker_pattern: String,
    /// Group/title substrings meaning "movie"
    pub movie_indicators: Vec<String>,
    /// Episode title template, `{n}` is replaced by the episode number
    pub episode_title_template: String,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            series_group_indicators: vec!["serie".to_string(), "série".to_string()],
            series_title_patterns: vec![
                r"(?i)s\d+\s*e\d+".to_string(),
                r"(?i)\b(?:season|temporada)\s*\d+".to_string(),
                r"(?i)\b(?:episode|epis[oó]dio)\s*\d+".to_string(),
            ],
            episode_pattern: r"(?i)^(.*?)\s*S(\d+)\s*E(\d+)".to_string(),
            series_marker_pattern:
                r"(?i)\s(?:s\d+|season\b|temporada\b|episode\b|epis[oó]dio\b)".to_string(),
            movie_indicators: vec!["filme".to_string(), "movie".to_string()],
            episode_title_template: "Episode {n}".to_string(),
        }
    }
}

impl ClassifierRules {
    /// Read a JSON rules file; missing fields keep their defaults
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let rules = serde_json::from_str(&content)?;
        Ok(rules)
    }
}

/// Outcome of classifying one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Series {
        name: String,
        season: String,
        episode_title: String,
    },
    Movie,
    Live,
}

impl Classification {
    pub fn kind(&self) -> MediaKind {
        match self {
            Classification::Series { .. } => MediaKind::Series,
            Classification::Movie => MediaKind::Movie,
            Classification::Live => MediaKind::Live,
        }
    }
}

/// Content classifier for playlist entries
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    rules: ClassifierRules,
    series_groups: Vec<String>,
    movie_indicators: Vec<String>,
    series_title_patterns: Vec<Regex>,
    episode_pattern: Regex,
    series_marker: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| CatalogError::Rules(format!("{}: {}", pattern, e)))
}

/// Leading zeros dropped ("02" -> "2"); digits too long for u64 are only stripped
fn strip_zero_padding(number: &str) -> String {
    match number.parse::<u64>() {
        Ok(n) => n.to_string(),
        Err(_) => {
            let stripped = number.trim_start_matches('0');
            if stripped.is_empty() { "0".to_string() } else { stripped.to_string() }
        }
    }
}

impl ContentClassifier {
    pub fn new(rules: ClassifierRules) -> Result<Self> {
        let series_title_patterns = rules
            .series_title_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>>>()?;
        let episode_pattern = compile(&rules.episode_pattern)?;
        if episode_pattern.captures_len() < 4 {
            return Err(CatalogError::Rules(format!(
                "{}: episode pattern needs 3 capture groups (name, season, episode)",
                rules.episode_pattern
            )));
        }
        let series_marker = compile(&rules.series_marker_pattern)?;

        Ok(Self {
            series_groups: rules.series_group_indicators.iter().map(|s| s.to_lowercase()).collect(),
            movie_indicators: rules.movie_indicators.iter().map(|s| s.to_lowercase()).collect(),
            series_title_patterns,
            episode_pattern,
            series_marker,
            rules,
        })
    }

    /// Series first, then movie, live channel otherwise
    pub fn classify(&self, entry: &RawEntry) -> Classification {
        if self.is_series(entry) {
            return self.series_classification(&entry.title);
        }

        let lower_title = entry.title.to_lowercase();
        let is_movie = self
            .movie_indicators
            .iter()
            .any(|ind| entry.group.contains(ind.as_str()) || lower_title.contains(ind.as_str()));
        if is_movie {
            return Classification::Movie;
        }

        Classification::Live
    }

    fn is_series(&self, entry: &RawEntry) -> bool {
        self.series_groups.iter().any(|ind| entry.group.contains(ind.as_str()))
            || self.series_title_patterns.iter().any(|p| p.is_match(&entry.title))
    }

    fn series_classification(&self, title: &str) -> Classification {
        // Explicit "Name S01 E02"
        if let Some(caps) = self.episode_pattern.captures(title) {
            let name = caps
                .get(1)
                .map(|m| m.as_str())
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(title);
            let season = caps.get(2).map(|m| strip_zero_padding(m.as_str()));
            let episode = caps.get(3).map(|m| strip_zero_padding(m.as_str()));
            if let (Some(season), Some(episode)) = (season, episode) {
                return Classification::Series {
                    name: normalize_title(name),
                    season,
                    episode_title: self.rules.episode_title_template.replace("{n}", &episode),
                };
            }
        }

        let head = match self.series_marker.find(title) {
            Some(m) if m.start() > 0 => &title[..m.start()],
            _ => title,
        };
        let name = if head.trim().is_empty() { title } else { head };

        Classification::Series {
            name: normalize_title(name),
            season: "1".to_string(),
            episode_title: normalize_title(title),
        }
    }

    /// Classify one finalized entry and append it to the catalog
    pub fn categorize(&self, entry: RawEntry, catalog: &mut Catalog) -> MediaKind {
        let classification = self.classify(&entry);
        let kind = classification.kind();

        match classification {
            Classification::Series {
                name,
                season,
                episode_title,
            } => {
                let episode = Episode {
                    title: episode_title,
                    url: entry.url,
                    logo: entry.logo.clone(),
                };
                catalog.add_episode(name, &entry.logo, season, episode);
            }
            Classification::Movie => catalog.movies.push(MediaItem {
                title: normalize_title(&entry.title),
                url: entry.url,
                logo: entry.logo,
            }),
            Classification::Live => catalog.live_channels.push(MediaItem {
                title: normalize_title(&entry.title),
                url: entry.url,
                logo: entry.logo,
            }),
        }

        kind
    }
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(ClassifierRules::default()).expect("built-in classifier rules must compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, group: &str) -> RawEntry {
        RawEntry {
            title: title.to_string(),
            url: "http://example.com/stream".to_string(),
            group: group.to_lowercase(),
            logo: String::new(),
        }
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  the matrix "), "The Matrix");
        assert_eq!(normalize_title("o auto da compadecida"), "O Auto Da Compadecida");
        assert_eq!(normalize_title("CNN international"), "CNN International");
        assert_eq!(normalize_title("élite"), "Élite");
    }

    #[test]
    fn test_classify_series_by_pattern() {
        let classifier = ContentClassifier::default();
        assert_eq!(
            classifier.classify(&entry("Show Name S02 E05", "")),
            Classification::Series {
                name: "Show Name".to_string(),
                season: "2".to_string(),
                episode_title: "Episode 5".to_string(),
            }
        );
        assert_eq!(
            classifier.classify(&entry("breaking bad S01E03", "Netflix")),
            Classification::Series {
                name: "Breaking Bad".to_string(),
                season: "1".to_string(),
                episode_title: "Episode 3".to_string(),
            }
        );
    }

    #[test]
    fn test_classify_series_by_group_without_numbers() {
        let classifier = ContentClassifier::default();
        assert_eq!(
            classifier.classify(&entry("the office especial de natal", "Séries | Comédia")),
            Classification::Series {
                name: "The Office Especial De Natal".to_string(),
                season: "1".to_string(),
                episode_title: "The Office Especial De Natal".to_string(),
            }
        );
        assert_eq!(
            classifier.classify(&entry("chaves temporada 3", "Series")),
            Classification::Series {
                name: "Chaves".to_string(),
                season: "1".to_string(),
                episode_title: "Chaves Temporada 3".to_string(),
            }
        );
    }

    #[test]
    fn test_episode_without_name_keeps_title() {
        let classifier = ContentClassifier::default();
        assert_eq!(
            classifier.classify(&entry("S01 E02", "Series")),
            Classification::Series {
                name: "S01 E02".to_string(),
                season: "1".to_string(),
                episode_title: "Episode 2".to_string(),
            }
        );

        let mut catalog = Catalog::default();
        classifier.categorize(entry("s01 e02", "Series"), &mut catalog);
        assert!(catalog.series.contains_key("s01 e02"));
        assert!(!catalog.series.contains_key(""));
    }

    #[test]
    fn test_series_wins_over_movie() {
        let classifier = ContentClassifier::default();
        let kind = classifier.classify(&entry("Harry Potter S01 E01", "Filmes")).kind();
        assert_eq!(kind, MediaKind::Series);
    }

    #[test]
    fn test_classify_movie_and_live() {
        let classifier = ContentClassifier::default();
        assert_eq!(classifier.classify(&entry("the matrix", "Filmes")), Classification::Movie);
        assert_eq!(classifier.classify(&entry("Avatar", "MOVIES 4K")), Classification::Movie);
        assert_eq!(classifier.classify(&entry("Filme da Sessão", "")), Classification::Movie);
        assert_eq!(classifier.classify(&entry("Globo HD", "Canais Abertos")), Classification::Live);
        assert_eq!(classifier.classify(&entry("Sem grupo", "")), Classification::Live);
    }

    #[test]
    fn test_categorize_appends_in_order() {
        let classifier = ContentClassifier::default();
        let mut catalog = Catalog::default();
        classifier.categorize(entry("Dark S01 E02", "Series"), &mut catalog);
        classifier.categorize(entry("Dark S01 E01", "Series"), &mut catalog);
        classifier.categorize(entry("Dark S2 E1", "Series"), &mut catalog);
        classifier.categorize(entry("the matrix", "Filmes"), &mut catalog);

        let dark = &catalog.series["dark"];
        let titles: Vec<&str> = dark.seasons["1"].iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Episode 2", "Episode 1"]);
        assert_eq!(dark.seasons["2"].len(), 1);
        assert_eq!(catalog.movies[0].title, "The Matrix");
        assert!(catalog.live_channels.is_empty());
    }

    #[test]
    fn test_custom_rules() {
        let rules = ClassifierRules {
            series_group_indicators: vec!["shows".to_string()],
            movie_indicators: vec!["cinema".to_string()],
            episode_title_template: "Episódio {n}".to_string(),
            ..ClassifierRules::default()
        };
        let classifier = ContentClassifier::new(rules).unwrap();
        assert_eq!(classifier.classify(&entry("Friends", "TV Shows")).kind(), MediaKind::Series);
        assert_eq!(classifier.classify(&entry("Up", "Cinema")), Classification::Movie);
        assert_eq!(classifier.classify(&entry("Up", "Filmes")), Classification::Live);
        match classifier.classify(&entry("Lost S1 E4", "")) {
            Classification::Series { episode_title, .. } => assert_eq!(episode_title, "Episódio 4"),
            other => panic!("expected series, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = ClassifierRules {
            series_title_patterns: vec!["(unclosed".to_string()],
            ..ClassifierRules::default()
        };
        assert!(matches!(ContentClassifier::new(rules), Err(CatalogError::Rules(_))));

        let rules = ClassifierRules {
            episode_pattern: r"S(\d+)E(\d+)".to_string(),
            ..ClassifierRules::default()
        };
        assert!(matches!(ContentClassifier::new(rules), Err(CatalogError::Rules(_))));
    }

    #[test]
    fn test_rules_partial_json_keeps_defaults() {
        let rules: ClassifierRules = serde_json::from_str(r#"{"movieIndicators": ["vod"]}"#).unwrap();
        assert_eq!(rules.movie_indicators, vec!["vod".to_string()]);
        assert_eq!(rules.series_group_indicators, ClassifierRules::default().series_group_indicators);
    }
}
