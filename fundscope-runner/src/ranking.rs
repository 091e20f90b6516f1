//! Ranking: orders scored funds by aggregate score.

use std::cmp::Ordering;

use crate::score::ScoredRecord;

/// Descending by value, missing values last.
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort best `score_all` first. The sort is stable: equal scores keep their
/// input order.
pub fn rank(records: &mut [ScoredRecord]) {
    records.sort_by(|a, b| descending(a.scores.score_all, b.scores.score_all));
}
