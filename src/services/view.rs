use crate::models::{
    Card, Catalog, EpisodeView, GatedPlaceholder, LiveView, MediaItem, MediaKind, Page, SeasonView,
    SeriesDetail,
};

pub const ITEMS_PER_PAGE: usize = 20;

const PLACEHOLDER_MOVIE: &str = "https://via.placeholder.com/200x300?text=Filme";
const PLACEHOLDER_SERIES: &str = "https://via.placeholder.com/200x300?text=S%C3%A9rie";
const PLACEHOLDER_LIVE: &str = "https://via.placeholder.com/200x300?text=TV";

/// "Is somebody logged in?" as answered by the caller.
///
/// Advisory only: nothing here verifies who the user is.
pub trait AuthGate {
    fn is_logged_in(&self) -> bool;
}

impl AuthGate for bool {
    fn is_logged_in(&self) -> bool {
        *self
    }
}

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub items_per_page: usize,
    /// Player page receiving `?videoUrl=<encoded url>`
    pub player_page: String,
    pub login_page: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            items_per_page: ITEMS_PER_PAGE,
            player_page: "player-page.html".to_string(),
            login_page: "index.html".to_string(),
        }
    }
}

/// Slice `items` into 1-based pages, clamping `page` into range
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        total_pages,
        total,
        has_prev: page > 1,
        has_next: page < total_pages,
    }
}

fn matches_filter(text: &str, lower_filter: &str) -> bool {
    lower_filter.is_empty() || text.to_lowercase().contains(lower_filter)
}

/// Filtered, paginated card lists over a catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    options: ViewOptions,
}

impl CatalogView {
    pub fn new(options: ViewOptions) -> Self {
        Self { options }
    }

    pub fn play_href(&self, url: &str) -> String {
        format!("{}?videoUrl={}", self.options.player_page, urlencoding::encode(url))
    }

    fn item_card(&self, kind: MediaKind, item: &MediaItem, placeholder: &str) -> Card {
        Card {
            kind,
            title: item.title.clone(),
            logo: if item.logo.is_empty() { placeholder.to_string() } else { item.logo.clone() },
            play_href: Some(self.play_href(&item.url)),
            series_key: None,
        }
    }

    pub fn movies(&self, catalog: &Catalog, filter: &str, page: usize) -> Page<Card> {
        let lower_filter = filter.trim().to_lowercase();
        let cards = catalog
            .movies
            .iter()
            .filter(|item| matches_filter(&item.title, &lower_filter))
            .map(|item| self.item_card(MediaKind::Movie, item, PLACEHOLDER_MOVIE))
            .collect();
        paginate(cards, page, self.options.items_per_page)
    }

    pub fn series(&self, catalog: &Catalog, filter: &str, page: usize) -> Page<Card> {
        let lower_filter = filter.trim().to_lowercase();
        let cards = catalog
            .series
            .iter()
            .filter(|(_, entry)| matches_filter(&entry.display_name, &lower_filter))
            .map(|(key, entry)| Card {
                kind: MediaKind::Series,
                title: entry.display_name.clone(),
                logo: if entry.logo.is_empty() {
                    PLACEHOLDER_SERIES.to_string()
                } else {
                    entry.logo.clone()
                },
                play_href: None,
                series_key: Some(key.clone()),
            })
            .collect();
        paginate(cards, page, self.options.items_per_page)
    }

    /// Live channels, or the login placeholder when the gate is closed
    pub fn live_channels(
        &self,
        catalog: &Catalog,
        filter: &str,
        gate: &impl AuthGate,
        page: usize,
    ) -> LiveView {
        if !gate.is_logged_in() {
            return LiveView::Gated(GatedPlaceholder {
                title: "Conteúdo Premium".to_string(),
                message: "Faça login para ter acesso aos canais de TV ao Vivo.".to_string(),
                login_href: self.options.login_page.clone(),
            });
        }

        let lower_filter = filter.trim().to_lowercase();
        let cards = catalog
            .live_channels
            .iter()
            .filter(|item| matches_filter(&item.title, &lower_filter))
            .map(|item| self.item_card(MediaKind::Live, item, PLACEHOLDER_LIVE))
            .collect();
        LiveView::Channels(paginate(cards, page, self.options.items_per_page))
    }

    /// Seasons in numeric order with playable episodes
    pub fn series_detail(&self, catalog: &Catalog, key: &str) -> Option<SeriesDetail> {
        let key = key.to_lowercase();
        let entry = catalog.series.get(&key)?;

        let seasons = entry
            .sorted_seasons()
            .into_iter()
            .map(|(season, episodes)| SeasonView {
                season: season.to_string(),
                episodes: episodes
                    .iter()
                    .map(|ep| EpisodeView::new(ep, self.play_href(&ep.url)))
                    .collect(),
            })
            .collect();

        Some(SeriesDetail {
            key,
            display_name: entry.display_name.clone(),
            logo: entry.logo.clone(),
            seasons,
        })
    }
}
