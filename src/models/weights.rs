use serde::{Deserialize, Serialize};

pub const MIN_WEIGHT: f64 = 0.1;
pub const MAX_WEIGHT: f64 = 10.0;

/// Features whose weights the online learner may adjust. Risk is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Alignment,
    Size,
    Distance,
    Priority,
}

impl Feature {
    pub const LEARNABLE: [Feature; 4] = [
        Feature::Alignment,
        Feature::Size,
        Feature::Distance,
        Feature::Priority,
    ];
}

/// Scoring weights, persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightVector {
    pub alignment: f64,
    pub size: f64,
    pub distance: f64,
    pub priority: f64,
    pub risk: f64,
}

impl Default for WeightVector {
    fn default() -> Self {
        Self {
            alignment: 3.0,
            size: 1.0,
            distance: 1.5,
            priority: 2.0,
            risk: 5.0,
        }
    }
}

impl WeightVector {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Alignment => self.alignment,
            Feature::Size => self.size,
            Feature::Distance => self.distance,
            Feature::Priority => self.priority,
        }
    }

    /// Set a learnable weight, clamped to `[MIN_WEIGHT, MAX_WEIGHT]`.
    pub fn set(&mut self, feature: Feature, value: f64) {
        let value = clamp_weight(value);
        match feature {
            Feature::Alignment => self.alignment = value,
            Feature::Size => self.size = value,
            Feature::Distance => self.distance = value,
            Feature::Priority => self.priority = value,
        }
    }

    /// Repair weights loaded from storage: learnable weights are clamped and
    /// non-finite values fall back to defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let mut repaired = self;
        for feature in Feature::LEARNABLE {
            let value = self.get(feature);
            let value = if value.is_finite() {
                value
            } else {
                defaults.get(feature)
            };
            repaired.set(feature, value);
        }
        if !repaired.risk.is_finite() || repaired.risk < 0.0 {
            repaired.risk = defaults.risk;
        }
        repaired
    }

    pub fn within_bounds(&self) -> bool {
        Feature::LEARNABLE
            .iter()
            .all(|feature| (MIN_WEIGHT..=MAX_WEIGHT).contains(&self.get(*feature)))
    }
}

fn clamp_weight(value: f64) -> f64 {
    value.clamp(MIN_WEIGHT, MAX_WEIGHT)
}
