pub mod adapter;
pub mod connections;
pub mod engine;
pub mod landmark;

pub use adapter::PoseDetector;
pub use connections::{POSE_CONNECTIONS, DRAW_VISIBILITY, VISIBLE_POINT};
pub use engine::{DetectorOptions, PoseEngine, RawDetection, RawLandmark, ReplayEngine};
pub use landmark::{Landmark, LandmarkSet, LANDMARK_COUNT};
