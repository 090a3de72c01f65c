use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

mod criteria;

pub use criteria::{
    default_criteria, CategoryProfile, Criterion, CriterionKey, CriterionSpec, ScoringRule,
    MAX_WEIGHT, MIN_WEIGHT,
};

/// Media category a comparison runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Film,
    Series,
}

impl Category {
    /// Base year for the absolute recency score. Films are scored on the
    /// 1900..current window, series on 1990..current.
    pub fn base_year(&self) -> i32 {
        match self {
            Category::Film => 1900,
            Category::Series => 1990,
        }
    }

    /// Storage key for the persisted weight configuration of this category
    pub fn criteria_key(&self) -> &'static str {
        match self {
            Category::Film => "film_criteria",
            Category::Series => "series_criteria",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Film => write!(f, "film"),
            Category::Series => write!(f, "series"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "film" => Ok(Category::Film),
            "series" => Ok(Category::Series),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Curated list endpoints usable to populate the selectable item pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Popular,
    TopRated,
    Trending,
}

impl Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::Popular => write!(f, "popular"),
            ListKind::TopRated => write!(f, "top_rated"),
            ListKind::Trending => write!(f, "trending"),
        }
    }
}

/// One film or series as consumed by the comparison engine
///
/// Summary records from search/list endpoints frequently omit the
/// category-specific attributes (runtime, revenue, budget, seasons, episodes,
/// episode runtime); those are backfilled from the detail endpoint by the
/// resolver. Absent attributes score as 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub id: u64,
    pub category: Category,
    pub title: String,
    /// Absolute rating on the provider's 0-10 scale
    #[serde(default)]
    pub rating: f64,
    /// Raw release date string (`YYYY-MM-DD`); first-air date for series
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub poster_path: Option<String>,
    // Film attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<u64>,
    // Series attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_runtime: Option<u32>,
}

impl MediaItem {
    /// Release year derived from the leading `YYYY` of the date string, 0 when
    /// absent or unparseable (which clamps the recency score to 0)
    pub fn release_year(&self) -> i32 {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
            .unwrap_or(0)
    }

    /// Revenue / budget ratio; 0 when the budget is 0 or absent
    pub fn roi(&self) -> f64 {
        match (self.revenue, self.budget) {
            (Some(revenue), Some(budget)) if budget > 0 => revenue as f64 / budget as f64,
            _ => 0.0,
        }
    }

    /// Whether any backfillable attribute of this item's category is absent
    pub fn missing_details(&self) -> bool {
        match self.category {
            Category::Film => {
                self.runtime.is_none() || self.revenue.is_none() || self.budget.is_none()
            }
            Category::Series => {
                self.seasons.is_none() || self.episodes.is_none() || self.episode_runtime.is_none()
            }
        }
    }

    /// Fills attributes absent on this record from a fetched detail record.
    /// Already-known values are kept; a backfill never contradicts them.
    pub fn merge_details(&mut self, details: &DetailAttributes) {
        self.runtime = self.runtime.or(details.runtime);
        self.revenue = self.revenue.or(details.revenue);
        self.budget = self.budget.or(details.budget);
        self.seasons = self.seasons.or(details.seasons);
        self.episodes = self.episodes.or(details.episodes);
        self.episode_runtime = self.episode_runtime.or(details.episode_runtime);
    }
}

/// The backfillable attribute subset of a detail record, cached per item id
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailAttributes {
    pub runtime: Option<u32>,
    pub revenue: Option<u64>,
    pub budget: Option<u64>,
    pub seasons: Option<u32>,
    pub episodes: Option<u32>,
    pub episode_runtime: Option<u32>,
}

/// One recorded comparison, appended the first time a selection's full
/// breakdown is opened
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonHistoryEntry {
    pub category: Category,
    /// Display names of the compared items, in selection order
    pub titles: Vec<String>,
    /// Item ids, in selection order
    pub ids: Vec<u64>,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged envelope around TMDB list responses
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage<T> {
    pub results: Vec<T>,
}

/// Film record as returned by TMDB search/list/detail endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub revenue: Option<u64>,
    #[serde(default)]
    pub budget: Option<u64>,
}

impl From<TmdbMovie> for MediaItem {
    fn from(movie: TmdbMovie) -> Self {
        MediaItem {
            id: movie.id,
            category: Category::Film,
            title: movie.title,
            rating: movie.vote_average,
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            popularity: movie.popularity,
            vote_count: movie.vote_count,
            poster_path: movie.poster_path,
            runtime: movie.runtime,
            revenue: movie.revenue,
            budget: movie.budget,
            seasons: None,
            episodes: None,
            episode_runtime: None,
        }
    }
}

/// Series record as returned by TMDB search/list/detail endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbShow {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub number_of_seasons: Option<u32>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    /// TMDB reports a list of typical runtimes; the first value is used
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
}

impl From<TmdbShow> for MediaItem {
    fn from(show: TmdbShow) -> Self {
        let episode_runtime = show.episode_run_time.first().copied();
        MediaItem {
            id: show.id,
            category: Category::Series,
            title: show.name,
            rating: show.vote_average,
            release_date: show.first_air_date.filter(|d| !d.is_empty()),
            popularity: show.popularity,
            vote_count: show.vote_count,
            poster_path: show.poster_path,
            runtime: None,
            revenue: None,
            budget: None,
            seasons: show.number_of_seasons,
            episodes: show.number_of_episodes,
            episode_runtime,
        }
    }
}

impl From<&TmdbMovie> for DetailAttributes {
    fn from(movie: &TmdbMovie) -> Self {
        DetailAttributes {
            runtime: movie.runtime,
            revenue: movie.revenue,
            budget: movie.budget,
            ..Default::default()
        }
    }
}

impl From<&TmdbShow> for DetailAttributes {
    fn from(show: &TmdbShow) -> Self {
        DetailAttributes {
            seasons: show.number_of_seasons,
            episodes: show.number_of_episodes,
            episode_runtime: show.episode_run_time.first().copied(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(id: u64) -> MediaItem {
        MediaItem {
            id,
            category: Category::Film,
            title: format!("Film {}", id),
            rating: 7.5,
            release_date: Some("2010-07-16".to_string()),
            popularity: 40.0,
            vote_count: 1000,
            poster_path: None,
            runtime: None,
            revenue: None,
            budget: None,
            seasons: None,
            episodes: None,
            episode_runtime: None,
        }
    }

    #[test]
    fn test_release_year_parsed_from_date() {
        let item = film(1);
        assert_eq!(item.release_year(), 2010);
    }

    #[test]
    fn test_release_year_absent_is_zero() {
        let mut item = film(1);
        item.release_date = None;
        assert_eq!(item.release_year(), 0);

        item.release_date = Some("not-a-date".to_string());
        assert_eq!(item.release_year(), 0);
    }

    #[test]
    fn test_roi_undefined_without_budget() {
        let mut item = film(1);
        item.revenue = Some(825_000_000);
        assert_eq!(item.roi(), 0.0);

        item.budget = Some(0);
        assert_eq!(item.roi(), 0.0);

        item.budget = Some(160_000_000);
        assert!((item.roi() - 5.15625).abs() < 1e-9);
    }

    #[test]
    fn test_missing_details_per_category() {
        let mut item = film(1);
        assert!(item.missing_details());

        item.runtime = Some(148);
        item.revenue = Some(825_000_000);
        item.budget = Some(160_000_000);
        assert!(!item.missing_details());

        // A series record with all three series attributes is complete even
        // though the film attributes are absent
        let show: MediaItem = TmdbShow {
            id: 2,
            name: "Show".to_string(),
            first_air_date: Some("2008-01-20".to_string()),
            vote_average: 8.9,
            popularity: 200.0,
            vote_count: 9000,
            poster_path: None,
            number_of_seasons: Some(5),
            number_of_episodes: Some(62),
            episode_run_time: vec![47, 60],
        }
        .into();
        assert!(!show.missing_details());
        assert_eq!(show.episode_runtime, Some(47));
    }

    #[test]
    fn test_merge_details_never_contradicts_known_values() {
        let mut item = film(1);
        item.runtime = Some(148);

        item.merge_details(&DetailAttributes {
            runtime: Some(90),
            revenue: Some(825_000_000),
            budget: Some(160_000_000),
            ..Default::default()
        });

        assert_eq!(item.runtime, Some(148));
        assert_eq!(item.revenue, Some(825_000_000));
        assert_eq!(item.budget, Some(160_000_000));
    }

    #[test]
    fn test_tmdb_movie_deserialization() {
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "release_date": "2010-07-16",
            "vote_average": 8.4,
            "popularity": 90.2,
            "vote_count": 34000,
            "poster_path": "/inception.jpg"
        }"#;

        let movie: TmdbMovie = serde_json::from_str(json).unwrap();
        let item: MediaItem = movie.into();
        assert_eq!(item.id, 27205);
        assert_eq!(item.category, Category::Film);
        assert_eq!(item.release_year(), 2010);
        assert_eq!(item.runtime, None);
        assert!(item.missing_details());
    }

    #[test]
    fn test_tmdb_show_detail_attributes() {
        let json = r#"{
            "id": 1396,
            "name": "Breaking Bad",
            "first_air_date": "2008-01-20",
            "vote_average": 8.9,
            "number_of_seasons": 5,
            "number_of_episodes": 62,
            "episode_run_time": [47]
        }"#;

        let show: TmdbShow = serde_json::from_str(json).unwrap();
        let details = DetailAttributes::from(&show);
        assert_eq!(details.seasons, Some(5));
        assert_eq!(details.episodes, Some(62));
        assert_eq!(details.episode_runtime, Some(47));
        assert_eq!(details.runtime, None);
    }

    #[test]
    fn test_category_serde() {
        assert_eq!(serde_json::to_string(&Category::Film).unwrap(), "\"film\"");
        assert_eq!(
            serde_json::to_string(&Category::Series).unwrap(),
            "\"series\""
        );
    }
}
