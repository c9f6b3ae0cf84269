use anyhow::{Context, Result};
use log::{error, info};
use serde::Serialize;

use crate::models::{Candidate, Handle};

/// Performs the host-side effects of committing to a candidate.
pub trait ActionExecutor {
    fn scroll_into_view(&mut self, handle: Handle) -> Result<()>;
    fn focus(&mut self, handle: Handle) -> Result<()>;
    fn activate(&mut self, handle: Handle) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ActionOutcome {
    Focused { handle: Handle },
    Activated { handle: Handle },
    Failed { handle: Handle, reason: String },
}

impl ActionOutcome {
    pub fn handle(&self) -> Handle {
        match self {
            ActionOutcome::Focused { handle }
            | ActionOutcome::Activated { handle }
            | ActionOutcome::Failed { handle, .. } => *handle,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ActionOutcome::Failed { .. })
    }
}

/// Scroll the candidate into view, then focus text-entry controls and
/// activate everything else. Errors are logged and returned as
/// `ActionOutcome::Failed`.
pub fn execute_action(candidate: &Candidate, executor: &mut dyn ActionExecutor) -> ActionOutcome {
    let handle = candidate.handle;
    let focus_only = candidate.kind.is_text_entry();

    let result = (|| -> Result<()> {
        executor
            .scroll_into_view(handle)
            .with_context(|| format!("failed to scroll {:?} into view", handle))?;
        if focus_only {
            executor
                .focus(handle)
                .with_context(|| format!("failed to focus {:?}", handle))?;
        } else {
            executor
                .activate(handle)
                .with_context(|| format!("failed to activate {:?}", handle))?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            info!("action performed on {:?} ({})", handle, candidate.display_text());
            if focus_only {
                ActionOutcome::Focused { handle }
            } else {
                ActionOutcome::Activated { handle }
            }
        }
        Err(err) => {
            error!("action on {:?} failed: {:#}", handle, err);
            ActionOutcome::Failed {
                handle,
                reason: format!("{:#}", err),
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Call, RecordingExecutor};
    use super::*;
    use crate::models::{ElementKind, RawCandidate, Rect};

    fn candidate(handle: u64, kind: ElementKind) -> Candidate {
        Candidate::from_raw(RawCandidate::new(handle, Rect::new(0.0, 0.0, 50.0, 20.0), kind, "x"))
    }

    #[test]
    fn test_text_entry_is_focused() {
        let mut executor = RecordingExecutor::default();
        let outcome = execute_action(&candidate(4, ElementKind::TextArea), &mut executor);

        assert_eq!(outcome, ActionOutcome::Focused { handle: Handle(4) });
        assert_eq!(executor.calls, vec![Call::Scroll(Handle(4)), Call::Focus(Handle(4))]);
    }

    #[test]
    fn test_button_is_activated() {
        let mut executor = RecordingExecutor::default();
        let outcome = execute_action(&candidate(2, ElementKind::Button), &mut executor);

        assert_eq!(outcome, ActionOutcome::Activated { handle: Handle(2) });
        assert_eq!(executor.activated(), vec![Handle(2)]);
    }

    #[test]
    fn test_failure_is_reported_not_raised() {
        let mut executor = RecordingExecutor {
            broken: vec![Handle(9)],
            ..Default::default()
        };
        let outcome = execute_action(&candidate(9, ElementKind::Link), &mut executor);

        match outcome {
            ActionOutcome::Failed { handle, reason } => {
                assert_eq!(handle, Handle(9));
                assert!(reason.contains("element detached"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
