pub mod controller;
pub mod events;
pub mod loop_worker;

pub use controller::SessionController;
pub use events::{apply_event, InputEvent};
pub use loop_worker::{session_loop, SessionReport};
