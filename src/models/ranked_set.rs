use std::time::Instant;

use crate::models::{Candidate, Handle};

/// Ordered top-K predictions produced by one ranking pass.
///
/// Replaced wholesale each cycle; ordinals are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSet {
    candidates: Vec<Candidate>,
    produced_at: Instant,
}

impl RankedSet {
    pub fn new(candidates: Vec<Candidate>, produced_at: Instant) -> Self {
        Self {
            candidates,
            produced_at,
        }
    }

    pub fn empty(produced_at: Instant) -> Self {
        Self::new(Vec::new(), produced_at)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn produced_at(&self) -> Instant {
        self.produced_at
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate at a 1-based ordinal.
    pub fn get(&self, ordinal: usize) -> Option<&Candidate> {
        ordinal
            .checked_sub(1)
            .and_then(|index| self.candidates.get(index))
    }

    pub fn handles(&self) -> Vec<Handle> {
        self.candidates.iter().map(|c| c.handle).collect()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.candidates.iter().any(|c| c.handle == handle)
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}
