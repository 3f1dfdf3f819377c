use crate::error::DetectorError;
use async_trait::async_trait;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use tokio::sync::mpsc;

/// Options passed verbatim to the underlying detector at initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    pub static_image_mode: bool,
    /// 0, 1 or 2; higher is slower and more accurate.
    pub model_complexity: u8,
    pub enable_segmentation: bool,
    pub smooth_landmarks: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            static_image_mode: true,
            model_complexity: 1,
            enable_segmentation: false,
            smooth_landmarks: false,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
        }
    }
}

/// One raw keypoint exactly as the engine reports it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawLandmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default)]
    pub visibility: f32,
}

/// One engine callback payload. `None` means the engine ran but found no
/// pose, which is a normal outcome rather than a failure.
pub type RawDetection = Option<Vec<RawLandmark>>;

/// The external landmark-detection capability.
///
/// The engine has a single results channel shared across all `send` calls
/// and no request correlation of its own, so callers must not overlap sends;
/// the adapter enforces that. `results` hands out the receiving end exactly
/// once.
#[async_trait]
pub trait PoseEngine: Send {
    async fn initialize(&mut self, options: &DetectorOptions) -> Result<(), DetectorError>;

    /// Take the shared results channel. Subsequent calls return `None`.
    fn results(&mut self) -> Option<mpsc::Receiver<RawDetection>>;

    /// Submit exactly one image. The outcome arrives on the results channel.
    async fn send(&mut self, image: &RgbaImage) -> Result<(), DetectorError>;

    /// Release the underlying detector resource.
    fn close(&mut self);
}

/// Engine that replays recorded detector output, one queued detection per
/// `send`. Stands in for the real model in the CLI and in tests.
pub struct ReplayEngine {
    queue: VecDeque<RawDetection>,
    tx: mpsc::Sender<RawDetection>,
    rx: Option<mpsc::Receiver<RawDetection>>,
    initialized: bool,
}

impl ReplayEngine {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        let (tx, rx) = mpsc::channel(8);
        Self {
            queue: detections.into(),
            tx,
            rx: Some(rx),
            initialized: false,
        }
    }

    /// Load a single recorded detection from a JSON sidecar file: a bare
    /// array of `{x, y, z, visibility}` objects.
    pub fn from_recording<P: AsRef<Path>>(path: P) -> Result<Self, DetectorError> {
        let data = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DetectorError::InitFailed(e.to_string()))?;
        let landmarks: Vec<RawLandmark> = serde_json::from_str(&data)
            .map_err(|e| DetectorError::InitFailed(e.to_string()))?;
        Ok(Self::new(vec![Some(landmarks)]))
    }
}

#[async_trait]
impl PoseEngine for ReplayEngine {
    async fn initialize(&mut self, options: &DetectorOptions) -> Result<(), DetectorError> {
        tracing::debug!(
            "replay engine initialized (static_image_mode={}, model_complexity={})",
            options.static_image_mode,
            options.model_complexity
        );
        self.initialized = true;
        Ok(())
    }

    fn results(&mut self) -> Option<mpsc::Receiver<RawDetection>> {
        self.rx.take()
    }

    async fn send(&mut self, _image: &RgbaImage) -> Result<(), DetectorError> {
        if !self.initialized {
            return Err(DetectorError::NotInitialized);
        }
        // Replaying past the recording reports "no pose" rather than failing.
        let detection = self.queue.pop_front().unwrap_or(None);
        self.tx
            .send(detection)
            .await
            .map_err(|e| DetectorError::SendFailed(e.to_string()))
    }

    fn close(&mut self) {
        self.queue.clear();
        self.initialized = false;
    }
}
