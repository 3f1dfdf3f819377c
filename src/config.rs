use crate::error::AppError;
use serde::Deserialize;
use std::path::Path;

/// Overlay display bounds. Uploads are fit into this box before the
/// skeleton is drawn.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

fn default_max_width() -> u32 {
    800
}
fn default_max_height() -> u32 {
    800
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where the auth token and user blob are persisted between runs.
    #[serde(default)]
    pub token_path: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub detector: crate::pose::DetectorOptions,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Configuration {
    /// Load from a config file, falling back to defaults for anything the
    /// file does not set. A missing file yields the full default config.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            let path = path.as_ref();
            builder = builder.add_source(
                config::File::with_name(&path.to_string_lossy()).required(false),
            );
        }
        let settings = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;
        settings
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }
}
