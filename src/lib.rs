pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod media;
pub mod pose;
pub mod render;
pub mod session;

pub use analysis::AnalysisResult;
pub use config::Configuration;
pub use error::AppError;

pub use media::MediaAsset;
pub use pose::{LandmarkSet, PoseDetector};
pub use render::SkeletonRenderer;
pub use session::{SessionController, SessionPhase};
