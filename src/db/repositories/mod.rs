pub mod sessions;
pub mod weights;
