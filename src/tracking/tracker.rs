//! Pointer motion tracking.
//!
//! Keeps a time-windowed history of pointer samples and derives a smoothed
//! velocity from net displacement across the most recent samples, so that
//! tremor-induced back-and-forth cancels out instead of registering as
//! motion. The cone and proximity filters read that state without mutating
//! it.

use std::collections::VecDeque;
use std::time::Instant;

use crate::models::{Candidate, Point};

use super::config::TrackerConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub timestamp: Instant,
}

/// Velocity in px/s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

impl Velocity {
    pub fn speed(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit direction vector, or `None` when the velocity is zero.
    pub fn direction(&self) -> Option<Point> {
        let speed = self.speed();
        if speed <= f64::EPSILON {
            return None;
        }
        Some(Point::new(self.x / speed, self.y / speed))
    }
}

pub struct MotionTracker {
    config: TrackerConfig,
    history: VecDeque<MotionSample>,
    position: Option<Point>,
    velocity: Velocity,
    is_moving: bool,
}

impl MotionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            history: VecDeque::new(),
            position: None,
            velocity: Velocity::default(),
            is_moving: false,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn record(&mut self, x: f64, y: f64) {
        self.record_at(x, y, Instant::now());
    }

    /// Append a sample taken at `at` and evict samples that fell out of the
    /// history window.
    pub fn record_at(&mut self, x: f64, y: f64, at: Instant) {
        self.position = Some(Point::new(x, y));
        self.history.push_back(MotionSample { x, y, timestamp: at });
        self.prune(at);
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Recompute velocity and the moving/still classification.
    pub fn tick_at(&mut self, now: Instant) {
        self.prune(now);
        self.compute_velocity();
    }

    fn prune(&mut self, now: Instant) {
        let window = self.config.history_window;
        while let Some(oldest) = self.history.front() {
            if now.saturating_duration_since(oldest.timestamp) >= window {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }

    fn compute_velocity(&mut self) {
        if self.history.len() < self.config.min_samples {
            self.set_still();
            return;
        }

        let window_start = self
            .history
            .len()
            .saturating_sub(self.config.velocity_samples);
        let (Some(first), Some(last)) = (self.history.get(window_start), self.history.back())
        else {
            self.set_still();
            return;
        };

        let dx = last.x - first.x;
        let dy = last.y - first.y;
        let displacement = dx.hypot(dy);
        let elapsed_secs = last
            .timestamp
            .saturating_duration_since(first.timestamp)
            .as_secs_f64();

        // Net displacement only; intermediate jitter is ignored.
        if displacement < self.config.min_movement_px || elapsed_secs <= 0.0 {
            self.set_still();
            return;
        }

        self.velocity = Velocity {
            x: dx / elapsed_secs,
            y: dy / elapsed_secs,
        };
        self.is_moving = self.velocity.speed() > self.config.moving_speed_threshold;
    }

    fn set_still(&mut self) {
        self.velocity = Velocity::default();
        self.is_moving = false;
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn samples(&self) -> impl Iterator<Item = &MotionSample> {
        self.history.iter()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.position = None;
        self.set_still();
    }

    /// Keep candidates inside the prediction cone ahead of the pointer.
    ///
    /// Returns nothing while the pointer is still: without directional intent
    /// there is nothing to predict. Survivors carry `distance`, `alignment`
    /// (cosine between heading and the vector to the candidate center) and
    /// `aheadness`.
    pub fn filter_by_trajectory(
        &self,
        candidates: &[Candidate],
        cone_angle_deg: f64,
        max_distance: f64,
    ) -> Vec<Candidate> {
        if !self.is_moving {
            return Vec::new();
        }
        let Some(origin) = self.position else {
            return Vec::new();
        };
        if self.velocity.speed() < self.config.min_direction_speed {
            return Vec::new();
        }
        let Some(direction) = self.velocity.direction() else {
            return Vec::new();
        };

        // Angle to the heading may be at most `cone_angle_deg`.
        let min_alignment = cone_angle_deg.to_radians().cos();

        candidates
            .iter()
            .filter_map(|candidate| {
                let to_x = candidate.center.x - origin.x;
                let to_y = candidate.center.y - origin.y;
                let distance = to_x.hypot(to_y);

                if distance <= f64::EPSILON || distance > max_distance {
                    return None;
                }

                let alignment =
                    ((direction.x * to_x + direction.y * to_y) / distance).clamp(-1.0, 1.0);
                if alignment < min_alignment {
                    return None;
                }

                Some(candidate.clone().with_geometry(distance, alignment))
            })
            .collect()
    }

    /// Keep every candidate within `radius` of the pointer, regardless of
    /// heading. Alignment is 1.0 while still, otherwise the cosine to the
    /// heading floored at zero.
    pub fn filter_by_proximity(&self, candidates: &[Candidate], radius: f64) -> Vec<Candidate> {
        let Some(origin) = self.position else {
            return Vec::new();
        };
        let direction = if self.is_moving {
            self.velocity.direction()
        } else {
            None
        };

        candidates
            .iter()
            .filter_map(|candidate| {
                let distance = origin.distance_to(candidate.center);
                if distance > radius {
                    return None;
                }

                let alignment = match direction {
                    Some(dir) if distance > f64::EPSILON => {
                        let to_x = (candidate.center.x - origin.x) / distance;
                        let to_y = (candidate.center.y - origin.y) / distance;
                        (dir.x * to_x + dir.y * to_y).clamp(0.0, 1.0)
                    }
                    _ => 1.0,
                };

                Some(candidate.clone().with_geometry(distance, alignment))
            })
            .collect()
    }
}

impl Default for MotionTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElementKind, Handle, RawCandidate, Rect};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::time::Duration;

    fn candidate_at(handle: u64, x: f64, y: f64) -> Candidate {
        let rect = Rect::new(x - 20.0, y - 10.0, 40.0, 20.0);
        Candidate::from_raw(RawCandidate::new(handle, rect, ElementKind::Button, "btn"))
    }

    /// Ten samples moving +10px along x every 20ms, ending at (290, 300).
    fn moving_right(tracker: &mut MotionTracker, t0: Instant) -> Instant {
        let mut at = t0;
        for i in 0..10 {
            at = t0 + Duration::from_millis(20 * i);
            tracker.record_at(200.0 + 10.0 * i as f64, 300.0, at);
        }
        tracker.tick_at(at);
        at
    }

    #[test]
    fn test_few_samples_is_still() {
        let mut tracker = MotionTracker::default();
        let t0 = Instant::now();
        tracker.record_at(0.0, 0.0, t0);
        tracker.record_at(100.0, 0.0, t0 + Duration::from_millis(50));
        tracker.tick_at(t0 + Duration::from_millis(60));

        assert!(!tracker.is_moving());
        assert_eq!(tracker.velocity(), Velocity::default());
    }

    #[test]
    fn test_steady_motion_is_moving() {
        let mut tracker = MotionTracker::default();
        moving_right(&mut tracker, Instant::now());

        assert!(tracker.is_moving());
        let velocity = tracker.velocity();
        assert!((velocity.x - 500.0).abs() < 1e-6);
        assert!(velocity.y.abs() < 1e-9);
        assert_eq!(tracker.position(), Some(Point::new(290.0, 300.0)));
    }

    #[test]
    fn test_tremor_jitter_is_not_motion() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tracker = MotionTracker::default();
        let t0 = Instant::now();
        let mut at = t0;

        for i in 0..60 {
            at = t0 + Duration::from_millis(16 * i);
            let jitter_x: f64 = rng.gen_range(-4.0..4.0);
            let jitter_y: f64 = rng.gen_range(-4.0..4.0);
            tracker.record_at(500.0 + jitter_x, 500.0 + jitter_y, at);
        }
        tracker.tick_at(at);

        assert!(!tracker.is_moving());
        assert_eq!(tracker.velocity(), Velocity::default());
    }

    #[test]
    fn test_slow_drift_under_threshold_is_still() {
        let mut tracker = MotionTracker::new(TrackerConfig {
            moving_speed_threshold: 100.0,
            ..TrackerConfig::default()
        });
        let t0 = Instant::now();
        let mut at = t0;
        // 36px over 0.9s: displacement passes, speed (40px/s) does not.
        for i in 0..10 {
            at = t0 + Duration::from_millis(100 * i);
            tracker.record_at(100.0 + 4.0 * i as f64, 100.0, at);
        }
        tracker.tick_at(at);
        assert!(!tracker.is_moving());
    }

    #[test]
    fn test_history_only_keeps_recent_samples() {
        let mut tracker = MotionTracker::default();
        let t0 = Instant::now();
        tracker.record_at(0.0, 0.0, t0);
        tracker.record_at(5.0, 0.0, t0 + Duration::from_millis(600));
        tracker.record_at(10.0, 0.0, t0 + Duration::from_millis(1300));

        assert_eq!(tracker.history_len(), 2);
        let cutoff = t0 + Duration::from_millis(100);
        assert!(tracker.samples().all(|s| s.timestamp > cutoff));
    }

    #[test]
    fn test_tick_prunes_after_pointer_rests() {
        let mut tracker = MotionTracker::default();
        let last = moving_right(&mut tracker, Instant::now());
        assert!(tracker.is_moving());

        tracker.tick_at(last + Duration::from_secs(3));
        assert_eq!(tracker.history_len(), 0);
        assert!(!tracker.is_moving());
    }

    #[test]
    fn test_trajectory_filter_empty_when_still() {
        let mut tracker = MotionTracker::default();
        let t0 = Instant::now();
        for i in 0..5 {
            tracker.record_at(300.0, 300.0, t0 + Duration::from_millis(20 * i));
        }
        tracker.tick_at(t0 + Duration::from_millis(100));

        let candidates = vec![candidate_at(1, 310.0, 300.0), candidate_at(2, 400.0, 300.0)];
        assert!(tracker.filter_by_trajectory(&candidates, 180.0, 10_000.0).is_empty());
    }

    #[test]
    fn test_trajectory_filter_keeps_cone_only() {
        let mut tracker = MotionTracker::default();
        moving_right(&mut tracker, Instant::now());

        let off_30 = 200.0 * 30.0_f64.to_radians().tan();
        let candidates = vec![
            candidate_at(1, 490.0, 300.0),          // straight ahead, 200px
            candidate_at(2, 90.0, 300.0),           // behind
            candidate_at(3, 490.0, 500.0),          // 45 degrees off heading
            candidate_at(4, 1000.0, 300.0),         // ahead but too far
            candidate_at(5, 490.0, 300.0 + off_30), // 30 degrees off heading
        ];

        let kept = tracker.filter_by_trajectory(&candidates, 40.0, 600.0);
        let handles: Vec<Handle> = kept.iter().map(|c| c.handle).collect();
        assert_eq!(handles, vec![Handle(1), Handle(5)]);
        let ahead = &kept[0];
        assert!((ahead.distance - 200.0).abs() < 1e-9);
        assert!((ahead.alignment - 1.0).abs() < 1e-9);
        assert!((ahead.aheadness - 200.0).abs() < 1e-9);
        assert!((kept[1].alignment - 30.0_f64.to_radians().cos()).abs() < 1e-9);

        let narrow = tracker.filter_by_trajectory(&candidates, 20.0, 600.0);
        let handles: Vec<Handle> = narrow.iter().map(|c| c.handle).collect();
        assert_eq!(handles, vec![Handle(1)]);

        let wide = tracker.filter_by_trajectory(&candidates, 50.0, 600.0);
        let handles: Vec<Handle> = wide.iter().map(|c| c.handle).collect();
        assert_eq!(handles, vec![Handle(1), Handle(3), Handle(5)]);
        assert!(wide.iter().all(|c| c.alignment >= 50.0_f64.to_radians().cos()));
    }

    #[test]
    fn test_proximity_filter_ignores_heading() {
        let mut tracker = MotionTracker::default();
        moving_right(&mut tracker, Instant::now());

        let candidates = vec![
            candidate_at(1, 390.0, 300.0), // ahead, 100px
            candidate_at(2, 190.0, 300.0), // behind, 100px
            candidate_at(3, 290.0, 800.0), // 500px away
        ];

        let kept = tracker.filter_by_proximity(&candidates, 150.0);
        assert_eq!(kept.len(), 2);
        assert!((kept[0].alignment - 1.0).abs() < 1e-9);
        assert_eq!(kept[1].alignment, 0.0);
    }

    #[test]
    fn test_proximity_filter_while_still() {
        let mut tracker = MotionTracker::default();
        tracker.record_at(100.0, 100.0, Instant::now());
        tracker.tick();

        let kept = tracker.filter_by_proximity(&[candidate_at(1, 150.0, 100.0)], 60.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].alignment, 1.0);
        assert!((kept[0].distance - 50.0).abs() < 1e-9);
    }
}
