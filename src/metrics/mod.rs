mod types;

pub use types::{SelectionMethod, SelectionRecord, SessionMetrics};

use std::time::{Duration, Instant};

use chrono::Utc;

use crate::models::{Candidate, Point};

const MAX_RECORDED_TEXT_CHARS: usize = 50;

/// Per-session usage metrics for evaluating prediction quality.
pub struct MetricsCollector {
    metrics: SessionMetrics,
    session_anchor: Instant,
    selection_anchor: Instant,
    last_position: Option<Point>,
}

impl MetricsCollector {
    pub fn new(now: Instant) -> Self {
        Self {
            metrics: SessionMetrics::empty(Utc::now()),
            session_anchor: now,
            selection_anchor: now,
            last_position: None,
        }
    }

    /// Time-to-select runs from the session start or the previous selection.
    pub fn record_selection(
        &mut self,
        candidate: &Candidate,
        method: SelectionMethod,
        succeeded: bool,
        now: Instant,
    ) {
        let time_to_select = now.saturating_duration_since(self.selection_anchor);
        self.selection_anchor = now;

        self.metrics.selections.push(SelectionRecord {
            timestamp: Utc::now(),
            element: candidate.kind.as_str().to_string(),
            text: candidate
                .display_text()
                .chars()
                .take(MAX_RECORDED_TEXT_CHARS)
                .collect(),
            method,
            time_to_select_ms: duration_ms(time_to_select),
            is_risky: candidate.is_risky,
            succeeded,
        });

        match method {
            SelectionMethod::Voice => self.metrics.voice_commands += 1,
            SelectionMethod::Keyboard => self.metrics.keyboard_commands += 1,
            SelectionMethod::Badge => self.metrics.badge_clicks += 1,
        }
    }

    /// A click that landed on none of the shown candidates.
    pub fn record_misclick(&mut self) {
        self.metrics.misclicks += 1;
    }

    pub fn record_pointer(&mut self, x: f64, y: f64) {
        let position = Point::new(x, y);
        if let Some(last) = self.last_position {
            self.metrics.total_pointer_distance += last.distance_to(position);
        }
        self.last_position = Some(position);
    }

    pub fn snapshot(&self, now: Instant) -> SessionMetrics {
        let mut snapshot = self.metrics.clone();
        snapshot.session_duration_ms = duration_ms(now.saturating_duration_since(self.session_anchor));
        snapshot
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ElementKind, RawCandidate, Rect};

    fn candidate(text: &str) -> Candidate {
        Candidate::from_raw(RawCandidate::new(1, Rect::new(0.0, 0.0, 10.0, 10.0), ElementKind::Link, text))
    }

    #[test]
    fn test_selection_timing_and_counts() {
        let t0 = Instant::now();
        let mut collector = MetricsCollector::new(t0);

        collector.record_selection(&candidate("Home"), SelectionMethod::Keyboard, true, t0 + Duration::from_millis(1200));
        collector.record_selection(&candidate("News"), SelectionMethod::Voice, true, t0 + Duration::from_millis(2000));
        collector.record_selection(&candidate("About"), SelectionMethod::Badge, false, t0 + Duration::from_millis(2500));

        let snapshot = collector.snapshot(t0 + Duration::from_secs(3));
        let times: Vec<u64> = snapshot.selections.iter().map(|s| s.time_to_select_ms).collect();
        assert_eq!(times, vec![1200, 800, 500]);
        assert_eq!(snapshot.keyboard_commands, 1);
        assert_eq!(snapshot.voice_commands, 1);
        assert_eq!(snapshot.badge_clicks, 1);
        assert_eq!(snapshot.session_duration_ms, 3000);
        assert_eq!(snapshot.selections[0].element, "link");
    }

    #[test]
    fn test_text_is_truncated() {
        let t0 = Instant::now();
        let mut collector = MetricsCollector::new(t0);
        let long = "é".repeat(80);

        collector.record_selection(&candidate(&long), SelectionMethod::Keyboard, true, t0);
        assert_eq!(collector.snapshot(t0).selections[0].text.chars().count(), 50);
    }

    #[test]
    fn test_pointer_distance_accumulates() {
        let t0 = Instant::now();
        let mut collector = MetricsCollector::new(t0);
        collector.record_pointer(0.0, 0.0);
        collector.record_pointer(3.0, 4.0);
        collector.record_pointer(3.0, 10.0);
        collector.record_misclick();

        let snapshot = collector.snapshot(t0);
        assert!((snapshot.total_pointer_distance - 11.0).abs() < 1e-9);
        assert_eq!(snapshot.misclicks, 1);

        collector.reset(t0);
        assert_eq!(collector.snapshot(t0).total_pointer_distance, 0.0);
    }
}
