use std::collections::HashSet;

use crate::models::{Candidate, Handle, RankedSet};
use crate::ranking::config::RankerConfig;

/// Try to keep the previously shown candidates in place.
///
/// `scored` is the full candidate list in descending score order and
/// `fresh_top` its first K entries. Candidates from `previous` that still
/// score at least `retention_ratio` of the lowest fresh top-K score are
/// retained in current score order; the retained list is returned when it
/// holds at least `retain_fraction` of K entries.
pub fn retain_previous(
    scored: &[Candidate],
    fresh_top: &[Candidate],
    previous: &RankedSet,
    config: &RankerConfig,
) -> Option<Vec<Candidate>> {
    if previous.is_empty() || fresh_top.is_empty() {
        return None;
    }

    let previous_handles: HashSet<Handle> = previous.handles().into_iter().collect();
    let min_fresh = fresh_top
        .iter()
        .map(|c| c.score)
        .fold(f64::INFINITY, f64::min);
    let min_score = min_fresh * config.retention_ratio;

    let retained: Vec<Candidate> = scored
        .iter()
        .filter(|c| previous_handles.contains(&c.handle) && c.score >= min_score)
        .take(config.top_k)
        .cloned()
        .collect();

    let required = config.top_k as f64 * config.retain_fraction;
    if !retained.is_empty() && retained.len() as f64 >= required {
        Some(retained)
    } else {
        None
    }
}
