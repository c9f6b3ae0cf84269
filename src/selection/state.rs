use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::models::Candidate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SelectionStatus {
    Idle,
    AwaitingConfirmation,
}

impl Default for SelectionStatus {
    fn default() -> Self {
        SelectionStatus::Idle
    }
}

/// A risky selection waiting for a second press or an explicit confirm.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    pub candidate: Candidate,
    /// 1-based position in the ranked set when the selection was made.
    pub ordinal: usize,
    pub issued_at: Instant,
}

impl PendingConfirmation {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.issued_at)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pending: Option<PendingConfirmation>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SelectionStatus {
        if self.pending.is_some() {
            SelectionStatus::AwaitingConfirmation
        } else {
            SelectionStatus::Idle
        }
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    /// Replaces any earlier pending confirmation.
    pub fn begin_confirmation(&mut self, candidate: Candidate, ordinal: usize, now: Instant) {
        self.pending = Some(PendingConfirmation {
            candidate,
            ordinal,
            issued_at: now,
        });
    }

    pub fn take_pending(&mut self) -> Option<PendingConfirmation> {
        self.pending.take()
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }
}
