use crate::services::scoring::ScoreRow;

/// Orders score rows best-first.
///
/// Stable descending sort on the 0-100 aggregate; ties keep their input
/// order, which is the only thing that makes the final ordering reproducible
/// for a fixed snapshot.
pub fn rank(mut rows: Vec<ScoreRow>) -> Vec<ScoreRow> {
    rows.sort_by(|a, b| b.aggregate100.cmp(&a.aggregate100));
    rows
}

/// The highest-ranked row, if any
pub fn top_pick(ranked: &[ScoreRow]) -> Option<&ScoreRow> {
    ranked.first()
}

/// Stable key identifying a selection independent of its ordering: the
/// sorted, comma-joined item ids. Used to suppress duplicate history
/// emission for the same set within a session.
pub fn selection_key(ids: &[u64]) -> String {
    let mut sorted: Vec<u64> = ids.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
