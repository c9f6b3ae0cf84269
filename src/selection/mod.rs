pub mod action;
pub mod controller;
pub mod state;
pub mod voice;

pub use action::{execute_action, ActionExecutor, ActionOutcome};
pub use controller::{CancelReason, RejectReason, SelectOutcome, SelectionConfig, SelectionController};
pub use state::{PendingConfirmation, SelectionState, SelectionStatus};
pub use voice::{parse_voice_command, VoiceCommand};
