//! The prediction pipeline and its input handlers.
//!
//! `HintEngine` owns one tracker, classifier, ranker, selection controller
//! and metrics collector. The host feeds it pointer samples, candidate
//! snapshots and discrete inputs; once per tick it filters, tags and ranks
//! the current snapshot and pushes changes to a [`RenderSink`].

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::{
    metrics::{MetricsCollector, SelectionMethod, SessionMetrics},
    models::{intake_candidates, Candidate, Handle, RankedSet, RawCandidate, Rect, WeightVector},
    ranking::{CandidateRanker, RankerConfig},
    risk::RiskClassifier,
    selection::{
        ActionExecutor, ActionOutcome, CancelReason, SelectOutcome, SelectionConfig,
        SelectionController, SelectionStatus,
    },
    settings::{BadgeSize, HintSettings, PredictionMode},
    tracking::{MotionTracker, TrackerConfig},
};

use crate::{log_debug, log_info};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

pub const DEFAULT_CHECKPOINT_EVERY: u64 = 5;

const STATUS_ACTIVE: &str = "Hints Active";
const STATUS_EXECUTED: &str = "Command executed";

/// Receives everything the engine wants shown.
pub trait RenderSink {
    fn emit(&mut self, event: EngineEvent);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionView {
    pub ordinal: usize,
    pub handle: Handle,
    pub rect: Rect,
    pub text: String,
    pub is_risky: bool,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum EngineEvent {
    #[serde(rename_all = "camelCase")]
    Predictions {
        badge_size: BadgeSize,
        predictions: Vec<PredictionView>,
    },
    Status {
        message: String,
        transient: bool,
    },
    #[serde(rename_all = "camelCase")]
    ActionExecuted {
        ordinal: usize,
        method: SelectionMethod,
        outcome: ActionOutcome,
    },
    ConfirmationRequired {
        ordinal: usize,
        handle: Handle,
        text: String,
    },
    Cancelled {
        reason: CancelReason,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechEvent {
    pub transcript: String,
    #[serde(default = "default_final")]
    pub is_final: bool,
    #[serde(default)]
    pub confidence: f64,
}

fn default_final() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Enter,
    Escape,
    Other,
}

impl Key {
    pub fn parse(name: &str) -> Self {
        match name {
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            _ => match name.as_bytes() {
                [digit @ b'1'..=b'9'] => Key::Digit(digit - b'0'),
                _ => Key::Other,
            },
        }
    }
}

pub struct HintEngine {
    tracker: MotionTracker,
    classifier: RiskClassifier,
    ranker: CandidateRanker,
    controller: SelectionController,
    metrics: MetricsCollector,
    settings: HintSettings,
    executor: Box<dyn ActionExecutor + Send>,
    sink: Box<dyn RenderSink + Send>,
    enabled: bool,
    snapshot: Vec<Candidate>,
    last_filtered: Vec<Candidate>,
    shown: Vec<Handle>,
    checkpoint_every: u64,
    checkpoint_due: bool,
}

impl HintEngine {
    pub fn new(
        settings: HintSettings,
        weights: WeightVector,
        executor: Box<dyn ActionExecutor + Send>,
        sink: Box<dyn RenderSink + Send>,
        now: Instant,
    ) -> Self {
        let ranker_config = RankerConfig {
            top_k: settings.top_k,
            hysteresis_window: settings.hysteresis_window(),
            ..RankerConfig::default()
        };

        let mut engine = Self {
            tracker: MotionTracker::new(TrackerConfig::default()),
            classifier: RiskClassifier::default(),
            ranker: CandidateRanker::new(ranker_config, weights),
            controller: SelectionController::new(SelectionConfig::default()),
            metrics: MetricsCollector::new(now),
            settings: settings.clone(),
            executor,
            sink,
            enabled: true,
            snapshot: Vec::new(),
            last_filtered: Vec::new(),
            shown: Vec::new(),
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            checkpoint_due: false,
        };
        engine.apply_settings(settings);
        engine
    }

    /// Checkpoint after this many feedback events (at least one).
    pub fn set_checkpoint_every(&mut self, events: u64) {
        self.checkpoint_every = events.max(1);
    }

    pub fn settings(&self) -> &HintSettings {
        &self.settings
    }

    pub fn weights(&self) -> WeightVector {
        self.ranker.weights()
    }

    pub fn feedback_events(&self) -> u64 {
        self.ranker.feedback_events()
    }

    pub fn selection_status(&self) -> SelectionStatus {
        self.controller.status()
    }

    pub fn current(&self) -> Option<&RankedSet> {
        self.controller.ranked()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn metrics(&self, now: Instant) -> SessionMetrics {
        self.metrics.snapshot(now)
    }

    /// Weights to persist, once enough feedback has accumulated.
    pub fn take_checkpoint(&mut self) -> Option<WeightVector> {
        if std::mem::take(&mut self.checkpoint_due) {
            Some(self.ranker.weights())
        } else {
            None
        }
    }

    /// Settings take effect on the next tick.
    pub fn apply_settings(&mut self, settings: HintSettings) {
        self.ranker.set_top_k(settings.top_k);
        self.ranker.set_hysteresis_window(settings.hysteresis_window());
        self.classifier.set_enabled(settings.risk_confirmation);
        self.controller.set_risk_confirmation(settings.risk_confirmation);
        self.settings = settings;
        log_info!("settings applied: {:?}", self.settings);
    }

    pub fn reset_weights(&mut self) {
        self.ranker.reset_weights();
        self.checkpoint_due = true;
        log_info!("weights reset to defaults");
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.tracker.clear();
            self.ranker.clear_history();
            self.controller.reset();
            self.last_filtered.clear();
            self.publish(Vec::new());
        }
        self.status(if enabled { STATUS_ACTIVE } else { "Hints Paused" }, false);
    }

    pub fn on_pointer(&mut self, x: f64, y: f64, at: Instant) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.tracker.record_at(x, y, at);
        self.metrics.record_pointer(x, y);
    }

    /// Replace the candidate snapshot used by the next tick.
    pub fn on_candidates(&mut self, raw: Vec<RawCandidate>) {
        self.snapshot = intake_candidates(raw);
        log_debug!("candidate snapshot: {} entries", self.snapshot.len());
    }

    /// Run one pipeline pass. Returns the new set when what is shown changed.
    pub fn tick(&mut self, at: Instant) -> Option<RankedSet> {
        if let Some(outcome) = self.controller.poll_timeout(at) {
            self.report(outcome, SelectionMethod::Keyboard, at);
        }
        if !self.enabled {
            return None;
        }

        self.tracker.tick_at(at);

        let filtered = match self.settings.prediction_mode {
            PredictionMode::Trajectory => self.tracker.filter_by_trajectory(
                &self.snapshot,
                self.settings.cone_angle,
                self.settings.max_distance,
            ),
            PredictionMode::Proximity => self
                .tracker
                .filter_by_proximity(&self.snapshot, self.settings.proximity_radius),
        };
        let tagged = self.classifier.tag(filtered);
        self.last_filtered = tagged.clone();

        let ranked = self.ranker.select_top_k(tagged, at);
        self.controller.set_ranked(ranked.clone());

        let handles = ranked.handles();
        if handles == self.shown {
            return None;
        }
        log_debug!("predictions changed: {:?}", handles);
        self.publish(ranked.candidates().to_vec());
        Some(ranked)
    }

    pub fn on_key(&mut self, key: Key, at: Instant) -> bool {
        if !self.enabled {
            return false;
        }
        let awaiting = self.controller.status() == SelectionStatus::AwaitingConfirmation;
        let outcome = match key {
            Key::Digit(digit) if (1..=self.controller.available()).contains(&usize::from(digit)) => {
                self.controller.select(usize::from(digit), at, self.executor.as_mut())
            }
            Key::Enter if awaiting => self.controller.confirm(at, self.executor.as_mut()),
            Key::Escape if awaiting => self.controller.cancel(),
            _ => return false,
        };
        self.report(outcome, SelectionMethod::Keyboard, at);
        true
    }

    pub fn on_badge_click(&mut self, ordinal: usize, at: Instant) -> bool {
        if !self.enabled {
            return false;
        }
        let outcome = self.controller.select(ordinal, at, self.executor.as_mut());
        self.report(outcome, SelectionMethod::Badge, at)
    }

    /// A click that hit none of the shown candidates.
    pub fn on_stray_click(&mut self) {
        self.metrics.record_misclick();
    }

    pub fn on_speech(&mut self, event: SpeechEvent, at: Instant) -> bool {
        if !self.enabled || !self.settings.voice_enabled {
            return false;
        }
        if !event.is_final {
            self.status(&format!("Heard: \"{}\"", event.transcript), true);
            return false;
        }

        match self
            .controller
            .handle_voice(&event.transcript, at, self.executor.as_mut())
        {
            Some(outcome) => self.report(outcome, SelectionMethod::Voice, at),
            None => {
                self.status(&format!("Unknown command: \"{}\"", event.transcript), true);
                false
            }
        }
    }

    /// Speech recognition is gone; keyboard and badges keep working.
    pub fn on_speech_unavailable(&mut self, reason: &str) {
        log::warn!("speech unavailable: {}", reason);
        self.status(&format!("Voice unavailable ({reason}), keyboard still active"), false);
    }

    fn report(&mut self, outcome: SelectOutcome, method: SelectionMethod, at: Instant) -> bool {
        match outcome {
            SelectOutcome::Executed {
                candidate,
                ordinal,
                outcome,
            } => {
                self.metrics
                    .record_selection(&candidate, method, outcome.is_success(), at);
                self.learn(&candidate);
                self.sink.emit(EngineEvent::ActionExecuted {
                    ordinal,
                    method,
                    outcome,
                });
                self.status(STATUS_EXECUTED, false);
                true
            }
            SelectOutcome::ConfirmationRequired { candidate, ordinal } => {
                self.sink.emit(EngineEvent::ConfirmationRequired {
                    ordinal,
                    handle: candidate.handle,
                    text: candidate.display_text().to_string(),
                });
                self.status(&format!("Press {ordinal} again or say \"confirm\""), false);
                true
            }
            SelectOutcome::Cancelled(reason) => {
                self.sink.emit(EngineEvent::Cancelled { reason });
                self.status("Cancelled", false);
                true
            }
            SelectOutcome::Rejected(reason) => {
                log_debug!("selection rejected: {:?}", reason);
                false
            }
        }
    }

    fn learn(&mut self, chosen: &Candidate) {
        let changed = self.ranker.learn_from_feedback(chosen, &self.last_filtered);
        if changed {
            log_debug!("weights now {:?}", self.ranker.weights());
        }
        if self.ranker.feedback_events() % self.checkpoint_every == 0 {
            self.checkpoint_due = true;
        }
    }

    fn publish(&mut self, candidates: Vec<Candidate>) {
        self.shown = candidates.iter().map(|c| c.handle).collect();
        let predictions = candidates
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| PredictionView {
                ordinal: index + 1,
                handle: candidate.handle,
                rect: candidate.rect,
                text: candidate.display_text().to_string(),
                is_risky: candidate.is_risky,
                score: candidate.score,
            })
            .collect();
        self.sink.emit(EngineEvent::Predictions {
            badge_size: self.settings.badge_size,
            predictions,
        });
    }

    fn status(&mut self, message: &str, transient: bool) {
        self.sink.emit(EngineEvent::Status {
            message: message.to_string(),
            transient,
        });
    }
}
