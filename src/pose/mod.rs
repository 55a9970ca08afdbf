pub mod landmark;
pub mod landmark_set;

pub use landmark::{Detection, KeypointIndex, Landmark};
pub use landmark_set::LandmarkSet;
