use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Media Error: {0}")]
    Media(#[from] MediaError),
    #[error("Detector Error: {0}")]
    Detector(#[from] DetectorError),
    #[error("Render Error: {0}")]
    Render(#[from] RenderError),
    #[error("Api Error: {0}")]
    Api(#[from] ApiError),
    #[error("Session Error: {0}")]
    Session(#[from] SessionError),
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),
}

// Media intake / normalization errors
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid dimension: {width}x{height}")]
    InvalidDimension { width: i64, height: i64 },
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

// Landmark detector adapter errors. "No pose found" is not an error and is
// reported as an empty landmark set instead.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Detector is not initialized")]
    NotInitialized,
    #[error("Failed to initialize detector: {0}")]
    InitFailed(String),
    #[error("Failed to send image to detector: {0}")]
    SendFailed(String),
    #[error("Detector result channel closed")]
    ChannelClosed,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render target unavailable: {0}")]
    TargetUnavailable(String),
}

// Remote service boundary errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Server responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Session invalidated (401)")]
    Unauthorized,
    #[error("Failed to decode response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

// Session controller guard failures, surfaced to the user inline
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No pose detected for analysis")]
    EmptyLandmarkSet,
    #[error("Operation not valid in phase {0:?}")]
    InvalidPhase(crate::session::SessionPhase),
    #[error("No media selected")]
    NoMedia,
}
