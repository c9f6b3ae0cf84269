pub mod candidate;
pub mod ranked_set;
pub mod weights;

pub use candidate::{
    intake_candidates, Candidate, ElementKind, FormContext, Handle, Point, RawCandidate, Rect,
    MAX_CANDIDATES,
};
pub use ranked_set::RankedSet;
pub use weights::{Feature, WeightVector, MAX_WEIGHT, MIN_WEIGHT};
