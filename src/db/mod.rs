mod connection;
mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{StoredSession, StoredWeights};
pub use repositories::sessions::MAX_STORED_SESSIONS;
