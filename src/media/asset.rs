use crate::error::MediaError;
use base64::Engine as _;
use image::DynamicImage;
use std::io::Cursor;

/// Declared kind of an uploaded media file, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        if mime.starts_with("image/") {
            Some(MediaKind::Image)
        } else if mime.starts_with("video/") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// One user-selected media source, owned by the session for the lifetime of
/// a single analysis cycle.
///
/// Images are decoded eagerly so dimension and pixel access never fail later
/// in the pipeline; the raw bytes are kept for multipart upload. Video is
/// carried as opaque bytes only (no detection path exists for it).
#[derive(Debug, Clone)]
pub enum MediaAsset {
    Image {
        bytes: Vec<u8>,
        mime: String,
        image: DynamicImage,
    },
    Video {
        bytes: Vec<u8>,
        mime: String,
    },
}

impl MediaAsset {
    /// Accept a file by declared MIME type. Anything that is neither
    /// `image/*` nor `video/*` is rejected as unsupported.
    pub fn from_bytes(bytes: Vec<u8>, mime: &str) -> Result<Self, MediaError> {
        match MediaKind::from_mime(mime) {
            Some(MediaKind::Image) => {
                let image = image::load_from_memory(&bytes)?;
                Ok(MediaAsset::Image {
                    bytes,
                    mime: mime.to_string(),
                    image,
                })
            }
            Some(MediaKind::Video) => Ok(MediaAsset::Video {
                bytes,
                mime: mime.to_string(),
            }),
            None => Err(MediaError::UnsupportedMediaType(mime.to_string())),
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaAsset::Image { .. } => MediaKind::Image,
            MediaAsset::Video { .. } => MediaKind::Video,
        }
    }

    pub fn mime(&self) -> &str {
        match self {
            MediaAsset::Image { mime, .. } => mime,
            MediaAsset::Video { mime, .. } => mime,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            MediaAsset::Image { bytes, .. } => bytes,
            MediaAsset::Video { bytes, .. } => bytes,
        }
    }

    /// Decoded pixels, image assets only.
    pub fn image(&self) -> Option<&DynamicImage> {
        match self {
            MediaAsset::Image { image, .. } => Some(image),
            MediaAsset::Video { .. } => None,
        }
    }

    /// Re-encode the decoded image as a base64 JPEG data URL, the form the
    /// analysis endpoint accepts alongside the keypoints.
    pub fn to_jpeg_data_url(&self) -> Result<String, MediaError> {
        let image = match self {
            MediaAsset::Image { image, .. } => image,
            MediaAsset::Video { mime, .. } => {
                return Err(MediaError::UnsupportedMediaType(mime.clone()))
            }
        };
        let mut jpeg = Vec::new();
        image
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&jpeg);
        Ok(format!("data:image/jpeg;base64,{encoded}"))
    }
}
