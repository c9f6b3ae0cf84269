pub mod config;
pub mod hysteresis;
pub mod learning;
pub mod ranker;
pub mod scoring;

pub use config::RankerConfig;
pub use ranker::CandidateRanker;
pub use scoring::{score_candidate, FeatureValues};
