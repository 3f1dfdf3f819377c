pub mod controller;

pub use controller::{DetectionOutcome, SessionController};

/// Lifecycle of one upload → detect → analyze cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    MediaSelected,
    Detecting,
    Ready,
    NoPoseDetected,
    DetectionFailed,
    Analyzing,
    ResultReady,
    AnalysisFailed,
}
