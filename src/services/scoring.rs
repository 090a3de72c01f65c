use serde::Serialize;

use crate::models::{Criterion, CriterionKey, MediaItem, ScoringRule};
use crate::services::normalize::{self, rating_score, recency_score};

/// One item's normalized score on one criterion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    pub key: CriterionKey,
    pub score: f64,
}

/// Scoring result for one compared item. Derived on every recomputation,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub item: MediaItem,
    /// Per-criterion 0-10 scores, in the order the criteria were given
    pub criterion_scores: Vec<CriterionScore>,
    /// Weighted aggregate on the 0-10 scale
    pub aggregate10: f64,
    /// Weighted aggregate rounded onto the 0-100 band
    pub aggregate100: i64,
}

/// Scores every item against every criterion and combines the normalized
/// scores under the criterion weights.
///
/// `aggregate10 = Σ(weight_c × score_c) / Σ(weight_c)`, with the divisor
/// floored at 1 (unreachable under the weight invariant, guarded anyway).
/// Output order matches input order; sorting is the presenter's concern.
pub fn score(items: &[MediaItem], criteria: &[Criterion], current_year: i32) -> Vec<ScoreRow> {
    // One normalized vector per criterion, each aligned with `items`
    let per_criterion: Vec<Vec<f64>> = criteria
        .iter()
        .map(|criterion| match criterion.key.rule() {
            ScoringRule::AbsoluteRating => items.iter().map(|i| rating_score(i.rating)).collect(),
            ScoringRule::AbsoluteYear => items
                .iter()
                .map(|i| recency_score(i.release_year(), i.category.base_year(), current_year))
                .collect(),
            ScoringRule::MinMax => {
                let raw: Vec<f64> = items.iter().map(|i| criterion.key.extract(i)).collect();
                normalize::min_max_scores(&raw)
            }
        })
        .collect();

    let total_weight: u32 = criteria.iter().map(|c| c.weight as u32).sum();
    let divisor = total_weight.max(1) as f64;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let criterion_scores: Vec<CriterionScore> = criteria
                .iter()
                .zip(&per_criterion)
                .map(|(criterion, scores)| CriterionScore {
                    key: criterion.key,
                    score: scores[index],
                })
                .collect();

            let weighted_sum: f64 = criteria
                .iter()
                .zip(&criterion_scores)
                .map(|(criterion, cs)| criterion.weight as f64 * cs.score)
                .sum();

            let aggregate10 = weighted_sum / divisor;
            let aggregate100 = (aggregate10 * 10.0).round() as i64;

            ScoreRow {
                item: item.clone(),
                criterion_scores,
                aggregate10,
                aggregate100,
            }
        })
        .collect()
}
