use std::time::{Duration, Instant};

use log::{debug, info};
use serde::Serialize;

use crate::models::{Candidate, RankedSet};

use super::{
    action::{execute_action, ActionExecutor, ActionOutcome},
    state::{PendingConfirmation, SelectionState, SelectionStatus},
    voice::{parse_voice_command, VoiceCommand},
};

#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Window in which a second press of the same ordinal confirms.
    pub confirmation_window: Duration,
    /// Age at which a pending confirmation lapses on its own.
    pub pending_timeout: Duration,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            confirmation_window: Duration::from_millis(800),
            pending_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelReason {
    User,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    OrdinalOutOfRange { ordinal: usize, available: usize },
    NothingPending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Executed {
        candidate: Candidate,
        ordinal: usize,
        outcome: ActionOutcome,
    },
    ConfirmationRequired {
        candidate: Candidate,
        ordinal: usize,
    },
    Cancelled(CancelReason),
    Rejected(RejectReason),
}

/// Turns ordinal selections into committed actions, holding risky
/// candidates until they are confirmed.
pub struct SelectionController {
    config: SelectionConfig,
    state: SelectionState,
    ranked: Option<RankedSet>,
    risk_confirmation: bool,
}

impl SelectionController {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            state: SelectionState::new(),
            ranked: None,
            risk_confirmation: true,
        }
    }

    pub fn status(&self) -> SelectionStatus {
        self.state.status()
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.state.pending()
    }

    pub fn ranked(&self) -> Option<&RankedSet> {
        self.ranked.as_ref()
    }

    pub fn available(&self) -> usize {
        self.ranked.as_ref().map_or(0, RankedSet::len)
    }

    /// With confirmation off, risky candidates execute on the first select.
    pub fn set_risk_confirmation(&mut self, enabled: bool) {
        self.risk_confirmation = enabled;
        if !enabled {
            self.state.reset();
        }
    }

    /// Replace the set that ordinals refer to. A pending confirmation keeps
    /// its own copy of the candidate and survives the swap.
    pub fn set_ranked(&mut self, ranked: RankedSet) {
        self.ranked = Some(ranked);
    }

    pub fn select(
        &mut self,
        ordinal: usize,
        now: Instant,
        executor: &mut dyn ActionExecutor,
    ) -> SelectOutcome {
        self.expire_stale(now);

        let Some(candidate) = self.ranked.as_ref().and_then(|r| r.get(ordinal)).cloned() else {
            return SelectOutcome::Rejected(RejectReason::OrdinalOutOfRange {
                ordinal,
                available: self.available(),
            });
        };

        if let Some(pending) = self.state.take_pending() {
            let same_target = pending.ordinal == ordinal && pending.candidate.handle == candidate.handle;
            if same_target && pending.age(now) < self.config.confirmation_window {
                debug!("double press confirmed ordinal {}", ordinal);
                return self.execute(pending.candidate, pending.ordinal, executor);
            }
            debug!("discarding pending ordinal {} for ordinal {}", pending.ordinal, ordinal);
        }

        if candidate.is_risky && self.risk_confirmation {
            info!("ordinal {} is risky, awaiting confirmation", ordinal);
            self.state.begin_confirmation(candidate.clone(), ordinal, now);
            return SelectOutcome::ConfirmationRequired { candidate, ordinal };
        }

        self.execute(candidate, ordinal, executor)
    }

    pub fn confirm(&mut self, now: Instant, executor: &mut dyn ActionExecutor) -> SelectOutcome {
        if let Some(expired) = self.expire_stale(now) {
            return expired;
        }
        match self.state.take_pending() {
            Some(pending) => self.execute(pending.candidate, pending.ordinal, executor),
            None => SelectOutcome::Rejected(RejectReason::NothingPending),
        }
    }

    /// Always clears, whether or not anything was pending.
    pub fn cancel(&mut self) -> SelectOutcome {
        if let Some(pending) = self.state.take_pending() {
            info!("cancelled pending ordinal {}", pending.ordinal);
        }
        SelectOutcome::Cancelled(CancelReason::User)
    }

    /// Returns `None` when the transcript is not a command for the current
    /// state, including ordinals outside the ranked set. Confirm and cancel
    /// act on the pending state even when nothing is shown.
    pub fn handle_voice(
        &mut self,
        transcript: &str,
        now: Instant,
        executor: &mut dyn ActionExecutor,
    ) -> Option<SelectOutcome> {
        match parse_voice_command(transcript, self.status() == SelectionStatus::AwaitingConfirmation)? {
            VoiceCommand::Confirm => Some(self.confirm(now, executor)),
            VoiceCommand::Cancel => Some(self.cancel()),
            VoiceCommand::Select(ordinal) if (1..=self.available()).contains(&ordinal) => {
                Some(self.select(ordinal, now, executor))
            }
            VoiceCommand::Select(ordinal) => {
                debug!("voice ordinal {} outside 1..={}", ordinal, self.available());
                None
            }
        }
    }

    /// Lapse a pending confirmation older than the timeout.
    pub fn poll_timeout(&mut self, now: Instant) -> Option<SelectOutcome> {
        self.expire_stale(now)
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.ranked = None;
    }

    fn expire_stale(&mut self, now: Instant) -> Option<SelectOutcome> {
        let stale = self
            .state
            .pending()
            .is_some_and(|pending| pending.age(now) >= self.config.pending_timeout);
        if !stale {
            return None;
        }
        if let Some(pending) = self.state.take_pending() {
            info!("pending ordinal {} timed out", pending.ordinal);
        }
        Some(SelectOutcome::Cancelled(CancelReason::TimedOut))
    }

    fn execute(
        &mut self,
        candidate: Candidate,
        ordinal: usize,
        executor: &mut dyn ActionExecutor,
    ) -> SelectOutcome {
        self.state.reset();
        let outcome = execute_action(&candidate, executor);
        SelectOutcome::Executed {
            candidate,
            ordinal,
            outcome,
        }
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}
