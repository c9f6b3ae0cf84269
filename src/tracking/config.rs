use std::time::Duration;

/// Tunables for pointer motion estimation. Defaults are set for users with
/// tremor: long history, wide smoothing window, high noise floor.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Samples older than this are evicted from history.
    pub history_window: Duration,

    /// Number of most recent samples used for the displacement estimate.
    pub velocity_samples: usize,

    /// Below this many samples the pointer is considered still.
    pub min_samples: usize,

    /// Net displacement (px) across the velocity window below which motion
    /// is treated as jitter.
    pub min_movement_px: f64,

    /// Speed (px/s) that must be exceeded to declare the pointer moving.
    pub moving_speed_threshold: f64,

    /// Speed (px/s) under which no direction is derived for the cone filter.
    pub min_direction_speed: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_window: Duration::from_millis(1200),
            velocity_samples: 10,
            min_samples: 3,
            min_movement_px: 30.0,
            moving_speed_threshold: 20.0,
            min_direction_speed: 10.0,
        }
    }
}
