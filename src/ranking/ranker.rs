use std::time::Instant;

use log::debug;

use crate::models::{Candidate, RankedSet, WeightVector};
use crate::ranking::{config::RankerConfig, hysteresis::retain_previous, learning, scoring};

/// Scores candidates, selects the top K with hysteresis, and adapts its
/// weights from user choices.
pub struct CandidateRanker {
    config: RankerConfig,
    weights: WeightVector,
    last_selection: Option<RankedSet>,
    feedback_events: u64,
}

impl CandidateRanker {
    pub fn new(config: RankerConfig, weights: WeightVector) -> Self {
        Self {
            config,
            weights: weights.sanitized(),
            last_selection: None,
            feedback_events: 0,
        }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    pub fn weights(&self) -> WeightVector {
        self.weights
    }

    pub fn set_weights(&mut self, weights: WeightVector) {
        self.weights = weights.sanitized();
    }

    pub fn reset_weights(&mut self) {
        self.weights = WeightVector::default();
    }

    pub fn set_top_k(&mut self, top_k: usize) {
        self.config.top_k = top_k.max(1);
    }

    pub fn set_hysteresis_window(&mut self, window: std::time::Duration) {
        self.config.hysteresis_window = window;
    }

    pub fn feedback_events(&self) -> u64 {
        self.feedback_events
    }

    pub fn last_selection(&self) -> Option<&RankedSet> {
        self.last_selection.as_ref()
    }

    /// Forget the previous selection so the next ranking starts fresh.
    pub fn clear_history(&mut self) {
        self.last_selection = None;
    }

    pub fn score(&self, candidate: &Candidate) -> f64 {
        scoring::score_candidate(candidate, &self.weights, self.config.size_saturation_area)
    }

    /// Score every candidate with the current weights and sort descending.
    pub fn score_all(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut scored: Vec<Candidate> = candidates
            .into_iter()
            .map(|candidate| {
                let score = self.score(&candidate);
                candidate.with_score(score)
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }

    /// Rank `candidates` and return at most `top_k` of them.
    ///
    /// Within the hysteresis window of the previous ranking, the previous
    /// selection is kept when enough of it still scores competitively.
    pub fn select_top_k(&mut self, candidates: Vec<Candidate>, now: Instant) -> RankedSet {
        if candidates.is_empty() {
            return RankedSet::empty(now);
        }

        let scored = self.score_all(candidates);
        let fresh: Vec<Candidate> = scored.iter().take(self.config.top_k).cloned().collect();

        let selected = match &self.last_selection {
            Some(previous)
                if now.saturating_duration_since(previous.produced_at())
                    < self.config.hysteresis_window =>
            {
                match retain_previous(&scored, &fresh, previous, &self.config) {
                    Some(retained) => {
                        debug!("hysteresis kept {} previous candidates", retained.len());
                        retained
                    }
                    None => fresh,
                }
            }
            _ => fresh,
        };

        let ranked = RankedSet::new(selected, now);
        self.last_selection = Some(ranked.clone());
        ranked
    }

    /// Learn from a committed choice among `all_scored`. Returns whether
    /// the weights changed.
    pub fn learn_from_feedback(&mut self, chosen: &Candidate, all_scored: &[Candidate]) -> bool {
        self.feedback_events += 1;
        let changed = learning::learn_from_feedback(
            &mut self.weights,
            chosen,
            all_scored,
            self.config.learning_rate,
            self.config.size_saturation_area,
        );
        if changed {
            debug!("weights adapted: {:?}", self.weights);
        }
        changed
    }
}

impl Default for CandidateRanker {
    fn default() -> Self {
        Self::new(RankerConfig::default(), WeightVector::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElementKind, Handle, RawCandidate, Rect};
    use std::time::Duration;

    fn candidate(handle: u64, distance: f64, alignment: f64) -> Candidate {
        let rect = Rect::new(0.0, 0.0, 40.0, 20.0);
        Candidate::from_raw(RawCandidate::new(handle, rect, ElementKind::Button, "b"))
            .with_geometry(distance, alignment)
    }

    fn ranker(top_k: usize) -> CandidateRanker {
        CandidateRanker::new(
            RankerConfig {
                top_k,
                ..RankerConfig::default()
            },
            WeightVector::default(),
        )
    }

    fn handles(set: &RankedSet) -> Vec<Handle> {
        set.handles()
    }

    #[test]
    fn test_never_exceeds_top_k() {
        for top_k in 1..=9 {
            let mut ranker = ranker(top_k);
            let candidates: Vec<Candidate> =
                (0..20).map(|i| candidate(i, 50.0 + i as f64 * 10.0, 0.9)).collect();
            let set = ranker.select_top_k(candidates, Instant::now());
            assert!(set.len() <= top_k);
        }
    }

    #[test]
    fn test_orders_by_score() {
        let mut ranker = ranker(3);
        let set = ranker.select_top_k(
            vec![candidate(1, 400.0, 0.9), candidate(2, 50.0, 1.0), candidate(3, 200.0, 0.95)],
            Instant::now(),
        );
        assert_eq!(handles(&set), vec![Handle(2), Handle(3), Handle(1)]);
        let scores: Vec<f64> = set.candidates().iter().map(|c| c.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_empty_input_gives_empty_set() {
        let mut ranker = ranker(3);
        assert!(ranker.select_top_k(Vec::new(), Instant::now()).is_empty());
        assert!(ranker.last_selection().is_none());
    }

    #[test]
    fn test_hysteresis_returns_previous_set_for_unchanged_input() {
        let mut ranker = ranker(2);
        let t0 = Instant::now();
        let input = vec![candidate(1, 100.0, 1.0), candidate(2, 150.0, 0.95), candidate(3, 500.0, 0.9)];

        let first = ranker.select_top_k(input.clone(), t0);
        let second = ranker.select_top_k(input, t0 + Duration::from_millis(300));
        assert_eq!(handles(&first), handles(&second));
    }

    #[test]
    fn test_hysteresis_suppresses_small_reshuffles() {
        let mut ranker = ranker(2);
        let t0 = Instant::now();
        let first = ranker.select_top_k(
            vec![candidate(1, 100.0, 1.0), candidate(2, 110.0, 0.99), candidate(3, 120.0, 0.98)],
            t0,
        );
        assert_eq!(handles(&first), vec![Handle(1), Handle(2)]);

        // Candidate 3 now edges ahead of 2; the shown set stays put.
        let second = ranker.select_top_k(
            vec![candidate(1, 100.0, 1.0), candidate(2, 120.0, 0.98), candidate(3, 110.0, 0.99)],
            t0 + Duration::from_millis(200),
        );
        assert_eq!(handles(&second), vec![Handle(1), Handle(2)]);
    }

    #[test]
    fn test_hysteresis_expires_after_window() {
        let mut ranker = ranker(2);
        let t0 = Instant::now();
        ranker.select_top_k(
            vec![candidate(1, 100.0, 1.0), candidate(2, 110.0, 0.99), candidate(3, 120.0, 0.98)],
            t0,
        );

        let later = ranker.select_top_k(
            vec![candidate(1, 100.0, 1.0), candidate(2, 120.0, 0.98), candidate(3, 110.0, 0.99)],
            t0 + Duration::from_millis(900),
        );
        assert_eq!(handles(&later), vec![Handle(1), Handle(3)]);
    }

    #[test]
    fn test_scores_follow_weight_changes() {
        let mut ranker = ranker(2);
        let c = candidate(1, 100.0, 0.9);
        let before = ranker.score(&c);

        let mut weights = ranker.weights();
        weights.alignment = 6.0;
        ranker.set_weights(weights);

        let set = ranker.select_top_k(vec![c.clone()], Instant::now());
        assert!(set.candidates()[0].score > before);
        assert_eq!(set.candidates()[0].score, ranker.score(&c));
    }

    #[test]
    fn test_feedback_counts_and_resets() {
        let mut ranker = ranker(2);
        let all = ranker.score_all(vec![candidate(1, 50.0, 1.0), candidate(2, 400.0, 0.8)]);
        let chosen = all[1].clone();

        assert!(ranker.learn_from_feedback(&chosen, &all));
        assert_eq!(ranker.feedback_events(), 1);
        assert_ne!(ranker.weights(), WeightVector::default());

        ranker.reset_weights();
        assert_eq!(ranker.weights(), WeightVector::default());
    }
}
