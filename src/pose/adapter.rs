use crate::error::DetectorError;
use crate::pose::engine::{DetectorOptions, PoseEngine, RawDetection};
use crate::pose::landmark::{Landmark, LandmarkSet};
use image::DynamicImage;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Landmark detector adapter.
///
/// Wraps the callback-style [`PoseEngine`] as a request/response operation:
/// each `detect` performs exactly one send and awaits exactly one message
/// from the engine's shared results channel. The engine carries no request
/// ids, so calls must never overlap; taking `&mut self` makes a second
/// in-flight `detect` unrepresentable, and the channel is drained before
/// each send so a result abandoned by a cancelled call can never be
/// attributed to the next one.
pub struct PoseDetector {
    engine: Box<dyn PoseEngine>,
    results_rx: mpsc::Receiver<RawDetection>,
    options: DetectorOptions,
    is_ready: bool,
}

impl PoseDetector {
    pub fn new(
        mut engine: Box<dyn PoseEngine>,
        options: DetectorOptions,
    ) -> Result<Self, DetectorError> {
        let results_rx = engine.results().ok_or_else(|| {
            DetectorError::InitFailed("engine results channel already taken".to_string())
        })?;
        Ok(Self {
            engine,
            results_rx,
            options,
            is_ready: false,
        })
    }

    /// Prepare the underlying engine. Idempotent once ready.
    pub async fn initialize(&mut self) -> Result<(), DetectorError> {
        if self.is_ready {
            return Ok(());
        }
        self.engine.initialize(&self.options).await?;
        self.is_ready = true;
        debug!("pose detector ready");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Run detection on one image.
    ///
    /// Returns an empty set when the engine finds no pose; that is a normal
    /// outcome, not an error. A failure to hand the image to the engine is
    /// [`DetectorError::SendFailed`].
    pub async fn detect(&mut self, image: &DynamicImage) -> Result<LandmarkSet, DetectorError> {
        if !self.is_ready {
            return Err(DetectorError::NotInitialized);
        }

        // Drop any result a cancelled earlier call left behind.
        while let Ok(stale) = self.results_rx.try_recv() {
            warn!("discarding stale detector result ({} points)",
                stale.map(|lms| lms.len()).unwrap_or(0));
        }

        self.engine.send(&image.to_rgba8()).await?;

        match self.results_rx.recv().await {
            Some(Some(raw)) => {
                debug!("detected {} landmarks", raw.len());
                Ok(LandmarkSet::from_landmarks(
                    raw.iter()
                        .map(|lm| Landmark::new(lm.x, lm.y, lm.z, lm.visibility))
                        .collect(),
                ))
            }
            Some(None) => {
                debug!("no pose found");
                Ok(LandmarkSet::empty())
            }
            None => Err(DetectorError::ChannelClosed),
        }
    }
}

impl Drop for PoseDetector {
    fn drop(&mut self) {
        self.engine.close();
    }
}
