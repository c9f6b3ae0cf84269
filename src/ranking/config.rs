use std::time::Duration;

/// Configuration for candidate ranking with tunable thresholds.
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Maximum size of a ranked set
    pub top_k: usize,

    /// A new ranking within this window of the previous one may keep the
    /// previous selection
    pub hysteresis_window: Duration,

    /// Retained candidates must score at least this fraction of the lowest
    /// fresh top-K score
    pub retention_ratio: f64,

    /// Fraction of `top_k` that must survive for the previous selection to stick
    pub retain_fraction: f64,

    /// Step size of the pairwise weight update
    pub learning_rate: f64,

    /// Area (px²) at which the size feature saturates
    pub size_saturation_area: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            hysteresis_window: Duration::from_millis(800),
            retention_ratio: 0.7,
            retain_fraction: 0.5,
            learning_rate: 0.1,
            size_saturation_area: 10_000.0,
        }
    }
}
