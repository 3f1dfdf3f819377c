use crate::analysis::AnalysisResult;
use crate::api::client::ApiClient;
use crate::error::ApiError;
use crate::pose::LandmarkSet;
use async_trait::async_trait;
use tracing::info;

/// Remote analysis service boundary, abstracted so the session controller
/// can be exercised against a fake.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Submit one landmark set (plus the JPEG data URL of the source image)
    /// for scoring. Exactly one network call per invocation.
    async fn analyze(
        &self,
        keypoints: &LandmarkSet,
        image_data_url: &str,
    ) -> Result<AnalysisResult, ApiError>;
}

#[derive(Clone)]
pub struct HttpAnalysisApi {
    client: ApiClient,
}

impl HttpAnalysisApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Alternate submission form: ship the original file as multipart.
    pub async fn analyze_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<AnalysisResult, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        self.client.post_multipart("/analyze", form).await
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisApi {
    async fn analyze(
        &self,
        keypoints: &LandmarkSet,
        image_data_url: &str,
    ) -> Result<AnalysisResult, ApiError> {
        info!("submitting {} keypoints for analysis", keypoints.len());
        self.client
            .post_json(
                "/analyze",
                &serde_json::json!({
                    "keypoints": keypoints,
                    "image": image_data_url,
                }),
            )
            .await
    }
}
