use crate::models::{Candidate, Feature, WeightVector};

/// Normalized feature values of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureValues {
    pub alignment: f64,
    pub size: f64,
    pub distance: f64,
    pub priority: f64,
}

impl FeatureValues {
    pub fn of(candidate: &Candidate, size_saturation_area: f64) -> Self {
        Self {
            alignment: candidate.alignment,
            size: score_size(candidate.area, size_saturation_area),
            distance: score_distance(candidate.distance),
            priority: f64::from(candidate.priority) / 10.0,
        }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Alignment => self.alignment,
            Feature::Size => self.size,
            Feature::Distance => self.distance,
            Feature::Priority => self.priority,
        }
    }
}

/// Weighted linear score with a flat risk penalty.
///
/// Pure: the same candidate and weights always yield the same score.
pub fn score_candidate(
    candidate: &Candidate,
    weights: &WeightVector,
    size_saturation_area: f64,
) -> f64 {
    let features = FeatureValues::of(candidate, size_saturation_area);
    let risk_penalty = if candidate.is_risky { weights.risk } else { 0.0 };

    weights.alignment * features.alignment
        + weights.size * features.size
        + weights.distance * features.distance
        + weights.priority * features.priority
        - risk_penalty
}

/// Size saturates at `saturation_area` so large containers cannot dominate.
fn score_size(area: f64, saturation_area: f64) -> f64 {
    if saturation_area <= 0.0 {
        return 1.0;
    }
    (area.max(0.0) / saturation_area).min(1.0)
}

/// Logarithmic decay: 1.0 at the pointer, ~0.14 at 600px.
fn score_distance(distance: f64) -> f64 {
    1.0 / (1.0 + (1.0 + distance.max(0.0)).ln())
}
