use crate::models::{Candidate, Feature, WeightVector};
use crate::ranking::scoring::{score_candidate, FeatureValues};

/// Pairwise perceptron-style update from one user choice.
///
/// When `chosen` is not the top scorer under the current `weights`, every
/// learnable weight moves toward whatever separated the choice from the top
/// candidate: up by `rate × (chosen − top)` where the choice had the larger
/// feature value, down by `0.5 × rate × (top − chosen)` otherwise. Weights
/// stay within `[MIN_WEIGHT, MAX_WEIGHT]`; risk is never touched.
///
/// Returns whether the weights changed.
pub fn learn_from_feedback(
    weights: &mut WeightVector,
    chosen: &Candidate,
    all_scored: &[Candidate],
    learning_rate: f64,
    size_saturation_area: f64,
) -> bool {
    let current = *weights;
    let Some(top) = all_scored.iter().max_by(|a, b| {
        score_candidate(a, &current, size_saturation_area)
            .total_cmp(&score_candidate(b, &current, size_saturation_area))
    }) else {
        return false;
    };

    if top.handle == chosen.handle {
        return false;
    }

    let chosen_features = FeatureValues::of(chosen, size_saturation_area);
    let top_features = FeatureValues::of(top, size_saturation_area);

    for feature in Feature::LEARNABLE {
        let chosen_value = chosen_features.get(feature);
        let top_value = top_features.get(feature);
        let weight = weights.get(feature);

        let updated = if chosen_value > top_value {
            weight + learning_rate * (chosen_value - top_value)
        } else {
            weight - 0.5 * learning_rate * (top_value - chosen_value)
        };
        weights.set(feature, updated);
    }

    true
}
