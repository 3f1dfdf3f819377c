use crate::analysis::AnalysisResult;
use crate::api::AnalysisApi;
use crate::error::{AppError, RenderError, SessionError};
use crate::media::{MediaAsset, MediaKind};
use crate::pose::{LandmarkSet, PoseDetector, VISIBLE_POINT};
use crate::render::SkeletonRenderer;
use crate::session::SessionPhase;
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What one detection pass produced, tagged for replay/discard decisions.
#[derive(Debug, Clone)]
pub enum DetectionOutcome {
    Landmarks(LandmarkSet),
    Failed(String),
}

/// Analysis session controller.
///
/// Owns the per-session state machine and coordinates the detector adapter,
/// the render engine and the remote analysis service. Every asynchronous
/// boundary error is folded into `current_error`; nothing escapes to the
/// presentation layer as a panic or raw error value.
pub struct SessionController {
    id: Uuid,
    detector: PoseDetector,
    analysis: Arc<dyn AnalysisApi>,
    renderer: SkeletonRenderer,
    phase: SessionPhase,
    media: Option<MediaAsset>,
    landmarks: LandmarkSet,
    result: Option<AnalysisResult>,
    error: Option<String>,
    /// Monotonically increasing selection token. A detection outcome tagged
    /// with an older token is stale and must not be applied.
    selection_seq: u64,
}

impl SessionController {
    pub fn new(
        detector: PoseDetector,
        analysis: Arc<dyn AnalysisApi>,
        renderer: SkeletonRenderer,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            detector,
            analysis,
            renderer,
            phase: SessionPhase::Idle,
            media: None,
            landmarks: LandmarkSet::empty(),
            result: None,
            error: None,
            selection_seq: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn media(&self) -> Option<&MediaAsset> {
        self.media.as_ref()
    }

    pub fn selection_token(&self) -> u64 {
        self.selection_seq
    }

    /// User-facing confident-point count (0.5 threshold, not the 0.1 draw
    /// threshold).
    pub fn visible_points(&self) -> usize {
        self.landmarks.visible_count(VISIBLE_POINT)
    }

    /// Accept a new media file. Supersedes whatever the session was doing:
    /// prior landmarks, result and error text are cleared and the selection
    /// token is bumped so any in-flight detection becomes stale.
    ///
    /// Returns the new selection token, or `None` if the file was rejected
    /// (unsupported MIME type; the session state is left untouched).
    pub fn select_media(&mut self, bytes: Vec<u8>, mime: &str) -> Option<u64> {
        let asset = match MediaAsset::from_bytes(bytes, mime) {
            Ok(asset) => asset,
            Err(e) => {
                warn!(session = %self.id, "rejected media: {e}");
                self.error = Some(e.to_string());
                return None;
            }
        };

        self.selection_seq += 1;
        self.landmarks = LandmarkSet::empty();
        self.result = None;
        self.error = None;
        let kind = asset.kind();
        self.media = Some(asset);
        self.phase = match kind {
            // Detection runs for images; video is carried but never detected.
            MediaKind::Image => SessionPhase::Detecting,
            MediaKind::Video => SessionPhase::MediaSelected,
        };
        info!(session = %self.id, token = self.selection_seq, "media selected ({kind:?})");
        Some(self.selection_seq)
    }

    /// Run detection for the current selection and apply the outcome.
    ///
    /// The outcome is tagged with the token captured before the await, so a
    /// selection that supersedes this one while the detector is running
    /// causes the result to be discarded on arrival.
    pub async fn run_detection(&mut self) {
        if self.phase != SessionPhase::Detecting {
            debug!(session = %self.id, "run_detection ignored in {:?}", self.phase);
            return;
        }
        let Some(image) = self.media.as_ref().and_then(|m| m.image()).cloned() else {
            self.error = Some("no image to detect".to_string());
            self.phase = SessionPhase::DetectionFailed;
            return;
        };
        let token = self.selection_seq;

        if let Err(e) = self.detector.initialize().await {
            self.apply_detection(token, DetectionOutcome::Failed(e.to_string()));
            return;
        }
        let outcome = match self.detector.detect(&image).await {
            Ok(set) => DetectionOutcome::Landmarks(set),
            Err(e) => DetectionOutcome::Failed(e.to_string()),
        };
        self.apply_detection(token, outcome);
    }

    /// Apply a detection outcome if it is still current. Idempotent: applying
    /// the same (token, outcome) pair twice yields the same state. Stale
    /// tokens are discarded without touching the landmark set.
    pub fn apply_detection(&mut self, token: u64, outcome: DetectionOutcome) {
        if token != self.selection_seq {
            warn!(
                session = %self.id,
                "discarding stale detection (token {token}, current {})", self.selection_seq
            );
            return;
        }
        match outcome {
            DetectionOutcome::Landmarks(set) if !set.is_empty() => {
                info!(session = %self.id, "detection ready: {} landmarks", set.len());
                self.landmarks = set;
                self.error = None;
                self.phase = SessionPhase::Ready;
            }
            DetectionOutcome::Landmarks(_) => {
                info!(session = %self.id, "no pose detected");
                self.landmarks = LandmarkSet::empty();
                self.error = Some("No pose detected - try another image".to_string());
                self.phase = SessionPhase::NoPoseDetected;
            }
            DetectionOutcome::Failed(message) => {
                warn!(session = %self.id, "detection failed: {message}");
                self.landmarks = LandmarkSet::empty();
                self.error = Some(message);
                self.phase = SessionPhase::DetectionFailed;
            }
        }
    }

    /// Convenience path for callers without interleaved selections.
    pub async fn select_and_detect(&mut self, bytes: Vec<u8>, mime: &str) {
        if self.select_media(bytes, mime).is_some() {
            self.run_detection().await;
        }
    }

    /// Submit the current landmark set for remote scoring.
    ///
    /// Guarded: an empty landmark set never produces a network call, and
    /// only the `Ready` phase may submit. The set is snapshotted before the
    /// await so the submission sees it exactly as it was at call time.
    pub async fn analyze(&mut self) {
        if self.landmarks.is_empty() {
            warn!(session = %self.id, "analyze rejected: no landmarks");
            self.error = Some(SessionError::EmptyLandmarkSet.to_string());
            return;
        }
        if self.phase != SessionPhase::Ready {
            warn!(session = %self.id, "analyze rejected in {:?}", self.phase);
            self.error = Some(SessionError::InvalidPhase(self.phase).to_string());
            return;
        }
        let snapshot = self.landmarks.clone();
        let data_url = match self.media.as_ref().map(|m| m.to_jpeg_data_url()) {
            Some(Ok(url)) => url,
            Some(Err(e)) => {
                self.error = Some(e.to_string());
                return;
            }
            None => {
                self.error = Some(SessionError::NoMedia.to_string());
                return;
            }
        };

        self.phase = SessionPhase::Analyzing;
        self.error = None;
        match self.analysis.analyze(&snapshot, &data_url).await {
            Ok(result) => {
                info!(session = %self.id, score = result.score, "analysis complete");
                self.result = Some(result);
                self.phase = SessionPhase::ResultReady;
            }
            Err(e) => {
                warn!(session = %self.id, "analysis failed: {e}");
                self.error = Some(e.to_string());
                self.phase = SessionPhase::AnalysisFailed;
            }
        }
    }

    /// Back to pristine `Idle` from any state. The selection token keeps
    /// increasing so outcomes from before the reset stay stale.
    pub fn reset(&mut self) {
        info!(session = %self.id, "session reset");
        self.selection_seq += 1;
        self.media = None;
        self.landmarks = LandmarkSet::empty();
        self.result = None;
        self.error = None;
        self.phase = SessionPhase::Idle;
    }

    /// Draw the current media with its skeleton overlay.
    pub fn render_overlay(&self) -> Result<RgbaImage, AppError> {
        let image = self
            .media
            .as_ref()
            .and_then(|m| m.image())
            .ok_or_else(|| RenderError::TargetUnavailable("no image selected".to_string()))?;
        let landmarks = (!self.landmarks.is_empty()).then_some(&self.landmarks);
        Ok(self.renderer.render(image, landmarks)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Level;
    use crate::error::ApiError;
    use crate::pose::engine::{DetectorOptions, RawLandmark, ReplayEngine};
    use crate::pose::Landmark;
    use async_trait::async_trait;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([0, 0, 0, 255]),
        ));
        let mut out = Vec::new();
        img.to_rgb8()
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Jpeg)
            .unwrap();
        out
    }

    fn raw(x: f32, y: f32, visibility: f32) -> RawLandmark {
        RawLandmark { x, y, z: 0.0, visibility }
    }

    /// Counts invocations and replays one canned response.
    struct FakeAnalysis {
        calls: AtomicUsize,
        response: Result<AnalysisResult, String>,
    }

    impl FakeAnalysis {
        fn ok(result: AnalysisResult) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Ok(result),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Err(message.to_string()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalysisApi for FakeAnalysis {
        async fn analyze(
            &self,
            _keypoints: &LandmarkSet,
            _image_data_url: &str,
        ) -> Result<AnalysisResult, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().map_err(|m| ApiError::Status {
                status: 500,
                message: m,
            })
        }
    }

    fn canned_result() -> AnalysisResult {
        serde_json::from_value(serde_json::json!({
            "score": 87.0,
            "confidence": 0.93,
            "pose_name": "downdog",
            "quality_metrics": {"alignment": 90.0}
        }))
        .unwrap()
    }

    fn controller_with(
        detections: Vec<Option<Vec<RawLandmark>>>,
        analysis: Arc<dyn AnalysisApi>,
    ) -> SessionController {
        let detector = PoseDetector::new(
            Box::new(ReplayEngine::new(detections)),
            DetectorOptions::default(),
        )
        .unwrap();
        SessionController::new(detector, analysis, SkeletonRenderer::new(600, 600))
    }

    fn two_visible_points() -> Vec<RawLandmark> {
        vec![raw(0.25, 0.5, 0.9), raw(0.75, 0.5, 0.9)]
    }

    #[tokio::test]
    async fn full_pipeline_select_detect_render_analyze() {
        let analysis = FakeAnalysis::ok(canned_result());
        let mut controller =
            controller_with(vec![Some(two_visible_points())], analysis.clone());

        controller.select_and_detect(jpeg_bytes(400, 300), "image/jpeg").await;
        assert_eq!(controller.phase(), SessionPhase::Ready);
        assert_eq!(controller.landmarks().len(), 2);
        assert_eq!(controller.visible_points(), 2);

        let overlay = controller.render_overlay().unwrap();
        assert_eq!(overlay.dimensions(), (600, 450));
        // the (0, 1) skeleton edge midpoint is stroked green
        assert_eq!(*overlay.get_pixel(300, 225), Rgba([0, 255, 0, 255]));

        controller.analyze().await;
        assert_eq!(controller.phase(), SessionPhase::ResultReady);
        assert_eq!(analysis.calls(), 1);
        let result = controller.result().unwrap();
        assert_eq!(result.score, 87.0);
        assert_eq!(result.confidence, 0.93);
        assert_eq!(result.pose_name, "downdog");
        assert_eq!(result.level, Level::Beginner);
        assert_eq!(result.quality_metrics["alignment"], 90.0);
    }

    #[tokio::test]
    async fn unsupported_mime_is_user_error_without_state_change() {
        let analysis = FakeAnalysis::ok(canned_result());
        let mut controller = controller_with(vec![], analysis);
        assert!(controller.select_media(vec![1, 2, 3], "application/pdf").is_none());
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(controller.current_error().unwrap().contains("application/pdf"));
    }

    #[tokio::test]
    async fn no_pose_parks_in_no_pose_detected() {
        let analysis = FakeAnalysis::ok(canned_result());
        let mut controller = controller_with(vec![None], analysis.clone());
        controller.select_and_detect(jpeg_bytes(64, 64), "image/jpeg").await;
        assert_eq!(controller.phase(), SessionPhase::NoPoseDetected);
        assert!(controller.landmarks().is_empty());
        assert!(controller.current_error().is_some());

        // analyze from here must not issue a network call
        let phase_before = controller.phase();
        controller.analyze().await;
        assert_eq!(analysis.calls(), 0);
        assert_eq!(controller.phase(), phase_before);
        assert!(controller.current_error().unwrap().contains("No pose"));
    }

    #[tokio::test]
    async fn video_is_accepted_but_not_detected() {
        let analysis = FakeAnalysis::ok(canned_result());
        let mut controller = controller_with(vec![], analysis);
        controller.select_and_detect(vec![0, 0, 0], "video/mp4").await;
        assert_eq!(controller.phase(), SessionPhase::MediaSelected);
        assert!(controller.landmarks().is_empty());
    }

    #[tokio::test]
    async fn stale_detection_is_discarded() {
        let analysis = FakeAnalysis::ok(canned_result());
        let mut controller = controller_with(vec![], analysis);

        let t1 = controller.select_media(jpeg_bytes(64, 64), "image/jpeg").unwrap();
        let t2 = controller.select_media(jpeg_bytes(64, 64), "image/jpeg").unwrap();
        assert!(t1 < t2);

        let stale = DetectionOutcome::Landmarks(LandmarkSet::from_landmarks(vec![
            Landmark::new(0.5, 0.5, 0.0, 0.9),
        ]));
        controller.apply_detection(t1, stale);
        // t1's landmarks never reach t2's session state
        assert!(controller.landmarks().is_empty());
        assert_eq!(controller.phase(), SessionPhase::Detecting);
    }

    #[tokio::test]
    async fn apply_detection_is_idempotent() {
        let analysis = FakeAnalysis::ok(canned_result());
        let mut controller = controller_with(vec![], analysis);
        let token = controller.select_media(jpeg_bytes(64, 64), "image/jpeg").unwrap();

        let outcome = DetectionOutcome::Landmarks(LandmarkSet::from_landmarks(
            two_visible_points()
                .iter()
                .map(|r| Landmark::new(r.x, r.y, r.z, r.visibility))
                .collect(),
        ));
        controller.apply_detection(token, outcome.clone());
        let phase = controller.phase();
        let landmarks = controller.landmarks().clone();

        controller.apply_detection(token, outcome);
        assert_eq!(controller.phase(), phase);
        assert_eq!(*controller.landmarks(), landmarks);
    }

    #[tokio::test]
    async fn detection_failure_surfaces_message() {
        let analysis = FakeAnalysis::ok(canned_result());
        let mut controller = controller_with(vec![], analysis);
        let token = controller.select_media(jpeg_bytes(64, 64), "image/jpeg").unwrap();
        controller.apply_detection(token, DetectionOutcome::Failed("engine exploded".into()));
        assert_eq!(controller.phase(), SessionPhase::DetectionFailed);
        assert_eq!(controller.current_error(), Some("engine exploded"));
    }

    #[tokio::test]
    async fn analysis_failure_parks_with_server_message() {
        let analysis = FakeAnalysis::failing("model not loaded");
        let mut controller =
            controller_with(vec![Some(two_visible_points())], analysis.clone());
        controller.select_and_detect(jpeg_bytes(64, 64), "image/jpeg").await;
        controller.analyze().await;
        assert_eq!(controller.phase(), SessionPhase::AnalysisFailed);
        assert!(controller.current_error().unwrap().contains("model not loaded"));
        assert_eq!(analysis.calls(), 1);
        assert!(controller.result().is_none());
    }

    #[tokio::test]
    async fn reset_returns_to_pristine_idle_from_any_state() {
        let analysis = FakeAnalysis::ok(canned_result());
        let mut controller =
            controller_with(vec![Some(two_visible_points())], analysis);
        controller.select_and_detect(jpeg_bytes(64, 64), "image/jpeg").await;
        controller.analyze().await;
        assert_eq!(controller.phase(), SessionPhase::ResultReady);

        let token_before = controller.selection_token();
        controller.reset();
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(controller.media().is_none());
        assert!(controller.landmarks().is_empty());
        assert!(controller.result().is_none());
        assert!(controller.current_error().is_none());
        assert!(controller.selection_token() > token_before);
    }

    #[tokio::test]
    async fn new_selection_clears_previous_result() {
        let analysis = FakeAnalysis::ok(canned_result());
        let mut controller = controller_with(
            vec![Some(two_visible_points()), Some(two_visible_points())],
            analysis,
        );
        controller.select_and_detect(jpeg_bytes(64, 64), "image/jpeg").await;
        controller.analyze().await;
        assert!(controller.result().is_some());

        controller.select_and_detect(jpeg_bytes(64, 64), "image/jpeg").await;
        assert!(controller.result().is_none());
        assert_eq!(controller.phase(), SessionPhase::Ready);
    }
}
