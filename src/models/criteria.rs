use serde::{Deserialize, Serialize};

use super::{Category, MediaItem};

/// Lowest accepted importance weight
pub const MIN_WEIGHT: u8 = 1;
/// Highest accepted importance weight
pub const MAX_WEIGHT: u8 = 10;

/// Identifies which attribute a criterion scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKey {
    Rating,
    Year,
    Popularity,
    Runtime,
    Votes,
    Revenue,
    Roi,
    Seasons,
    Episodes,
    EpRuntime,
}

/// How a criterion maps raw values onto the 0-10 comparability scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringRule {
    /// The item's own rating, clamped to [0,10]. Ratings are globally
    /// comparable and are not re-normalized against the current selection.
    AbsoluteRating,
    /// Recency on a fixed per-category timeline (base year .. current year),
    /// clamped to [0,10], so a selection of only old items does not score its
    /// newest member as maximally recent.
    AbsoluteYear,
    /// Min-max scaling across exactly the items being compared
    MinMax,
}

impl CriterionKey {
    /// Raw attribute value this criterion scores; absent attributes read as 0
    pub fn extract(&self, item: &MediaItem) -> f64 {
        match self {
            CriterionKey::Rating => item.rating,
            CriterionKey::Year => item.release_year() as f64,
            CriterionKey::Popularity => item.popularity,
            CriterionKey::Runtime => item.runtime.unwrap_or(0) as f64,
            CriterionKey::Votes => item.vote_count as f64,
            CriterionKey::Revenue => item.revenue.unwrap_or(0) as f64,
            CriterionKey::Roi => item.roi(),
            CriterionKey::Seasons => item.seasons.unwrap_or(0) as f64,
            CriterionKey::Episodes => item.episodes.unwrap_or(0) as f64,
            CriterionKey::EpRuntime => item.episode_runtime.unwrap_or(0) as f64,
        }
    }

    pub fn rule(&self) -> ScoringRule {
        match self {
            CriterionKey::Rating => ScoringRule::AbsoluteRating,
            CriterionKey::Year => ScoringRule::AbsoluteYear,
            _ => ScoringRule::MinMax,
        }
    }
}

/// One scoring dimension with a fixed key, display name, and built-in default
/// importance weight
#[derive(Debug, Clone, Copy)]
pub struct CriterionSpec {
    pub key: CriterionKey,
    pub name: &'static str,
    pub default_weight: u8,
}

/// Per-category descriptor the generic engine is parameterized by: the
/// exhaustive criterion set (in display order) and the recency base year
#[derive(Debug, Clone, Copy)]
pub struct CategoryProfile {
    pub category: Category,
    pub criteria: &'static [CriterionSpec],
}

const FILM_CRITERIA: &[CriterionSpec] = &[
    CriterionSpec {
        key: CriterionKey::Rating,
        name: "Rating",
        default_weight: 7,
    },
    CriterionSpec {
        key: CriterionKey::Year,
        name: "Release year",
        default_weight: 5,
    },
    CriterionSpec {
        key: CriterionKey::Popularity,
        name: "Popularity",
        default_weight: 6,
    },
    CriterionSpec {
        key: CriterionKey::Runtime,
        name: "Runtime (min)",
        default_weight: 5,
    },
    CriterionSpec {
        key: CriterionKey::Votes,
        name: "Total votes",
        default_weight: 4,
    },
    CriterionSpec {
        key: CriterionKey::Revenue,
        name: "Box office revenue",
        default_weight: 5,
    },
    CriterionSpec {
        key: CriterionKey::Roi,
        name: "Return on investment",
        default_weight: 6,
    },
];

const SERIES_CRITERIA: &[CriterionSpec] = &[
    CriterionSpec {
        key: CriterionKey::Rating,
        name: "Rating",
        default_weight: 7,
    },
    CriterionSpec {
        key: CriterionKey::Year,
        name: "First air year",
        default_weight: 5,
    },
    CriterionSpec {
        key: CriterionKey::Popularity,
        name: "Popularity",
        default_weight: 6,
    },
    CriterionSpec {
        key: CriterionKey::Votes,
        name: "Total votes",
        default_weight: 5,
    },
    CriterionSpec {
        key: CriterionKey::Seasons,
        name: "Seasons",
        default_weight: 4,
    },
    CriterionSpec {
        key: CriterionKey::Episodes,
        name: "Episode count",
        default_weight: 5,
    },
    CriterionSpec {
        key: CriterionKey::EpRuntime,
        name: "Episode runtime (min)",
        default_weight: 3,
    },
];

const FILM_PROFILE: CategoryProfile = CategoryProfile {
    category: Category::Film,
    criteria: FILM_CRITERIA,
};

const SERIES_PROFILE: CategoryProfile = CategoryProfile {
    category: Category::Series,
    criteria: SERIES_CRITERIA,
};

impl Category {
    pub fn profile(&self) -> &'static CategoryProfile {
        match self {
            Category::Film => &FILM_PROFILE,
            Category::Series => &SERIES_PROFILE,
        }
    }
}

/// A criterion with its user-settable importance weight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Criterion {
    pub key: CriterionKey,
    pub name: String,
    pub weight: u8,
}

/// The built-in default weight configuration for a category, in display order
pub fn default_criteria(category: Category) -> Vec<Criterion> {
    category
        .profile()
        .criteria
        .iter()
        .map(|spec| Criterion {
            key: spec.key,
            name: spec.name.to_string(),
            weight: spec.default_weight,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_film_defaults_match_builtins() {
        let defaults = default_criteria(Category::Film);
        assert_eq!(defaults.len(), 7);

        let weight = |key| {
            defaults
                .iter()
                .find(|c| c.key == key)
                .map(|c| c.weight)
                .unwrap()
        };
        assert_eq!(weight(CriterionKey::Rating), 7);
        assert_eq!(weight(CriterionKey::Year), 5);
        assert_eq!(weight(CriterionKey::Popularity), 6);
        assert_eq!(weight(CriterionKey::Runtime), 5);
        assert_eq!(weight(CriterionKey::Votes), 4);
        assert_eq!(weight(CriterionKey::Revenue), 5);
        assert_eq!(weight(CriterionKey::Roi), 6);
    }

    #[test]
    fn test_series_defaults_match_builtins() {
        let defaults = default_criteria(Category::Series);
        assert_eq!(defaults.len(), 7);

        let weight = |key| {
            defaults
                .iter()
                .find(|c| c.key == key)
                .map(|c| c.weight)
                .unwrap()
        };
        assert_eq!(weight(CriterionKey::Rating), 7);
        assert_eq!(weight(CriterionKey::Year), 5);
        assert_eq!(weight(CriterionKey::Popularity), 6);
        assert_eq!(weight(CriterionKey::Votes), 5);
        assert_eq!(weight(CriterionKey::Seasons), 4);
        assert_eq!(weight(CriterionKey::Episodes), 5);
        assert_eq!(weight(CriterionKey::EpRuntime), 3);
    }

    #[test]
    fn test_default_weights_within_bounds() {
        for category in [Category::Film, Category::Series] {
            for criterion in default_criteria(category) {
                assert!(criterion.weight >= MIN_WEIGHT && criterion.weight <= MAX_WEIGHT);
            }
        }
    }

    #[test]
    fn test_criterion_key_serde_tags() {
        assert_eq!(
            serde_json::to_string(&CriterionKey::EpRuntime).unwrap(),
            "\"ep_runtime\""
        );
        assert_eq!(
            serde_json::from_str::<CriterionKey>("\"roi\"").unwrap(),
            CriterionKey::Roi
        );
    }

    #[test]
    fn test_absolute_rules_limited_to_rating_and_year() {
        for category in [Category::Film, Category::Series] {
            for spec in category.profile().criteria {
                match spec.key {
                    CriterionKey::Rating => assert_eq!(spec.key.rule(), ScoringRule::AbsoluteRating),
                    CriterionKey::Year => assert_eq!(spec.key.rule(), ScoringRule::AbsoluteYear),
                    _ => assert_eq!(spec.key.rule(), ScoringRule::MinMax),
                }
            }
        }
    }
}
