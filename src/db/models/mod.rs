pub mod session;
pub mod weights;

pub use session::StoredSession;
pub use weights::StoredWeights;
