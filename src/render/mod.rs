//! Geometry/render engine: paints a source image scaled into the display
//! bounds and overlays the detected skeleton on top.

use crate::error::RenderError;
use crate::media;
use crate::pose::{LandmarkSet, DRAW_VISIBILITY, POSE_CONNECTIONS};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use tracing::debug;

/// Overlay palette: green bones, red joints with a white contrasting
/// outline.
mod colors {
    use image::Rgba;

    pub const BONE: Rgba<u8> = Rgba([0, 255, 0, 255]);
    pub const JOINT: Rgba<u8> = Rgba([255, 0, 0, 255]);
    pub const JOINT_OUTLINE: Rgba<u8> = Rgba([255, 255, 255, 255]);
}

const JOINT_RADIUS: i32 = 3;

/// Is the edge `(i, j)` drawable: both endpoints exist and both clear the
/// draw threshold.
pub fn edge_visible(landmarks: &LandmarkSet, i: usize, j: usize) -> bool {
    match (landmarks.get(i), landmarks.get(j)) {
        (Some(a), Some(b)) => a.visibility > DRAW_VISIBILITY && b.visibility > DRAW_VISIBILITY,
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct SkeletonRenderer {
    max_width: u32,
    max_height: u32,
}

impl SkeletonRenderer {
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Render the source into a fresh surface sized by the media normalizer,
    /// then overlay the skeleton if a nonempty landmark set is present.
    ///
    /// An empty or absent landmark set renders the image alone; that is not
    /// an error. Failure to produce a usable surface is
    /// [`RenderError::TargetUnavailable`].
    pub fn render(
        &self,
        source: &DynamicImage,
        landmarks: Option<&LandmarkSet>,
    ) -> Result<RgbaImage, RenderError> {
        let (width, height) =
            media::fit(source.width(), source.height(), self.max_width, self.max_height)
                .map_err(|e| RenderError::TargetUnavailable(e.to_string()))?;

        // Scale to fill the surface exactly, no letterboxing.
        let mut surface = source.resize_exact(width, height, FilterType::Triangle).to_rgba8();
        debug!("render surface {}x{}", width, height);

        if let Some(landmarks) = landmarks {
            if !landmarks.is_empty() {
                self.draw_connections(&mut surface, landmarks);
                self.draw_landmarks(&mut surface, landmarks);
            }
        }

        Ok(surface)
    }

    /// Stroke each connection-graph edge whose endpoints are both visible,
    /// in table order.
    fn draw_connections(&self, surface: &mut RgbaImage, landmarks: &LandmarkSet) {
        let (width, height) = surface.dimensions();
        for &(start, end) in POSE_CONNECTIONS.iter() {
            if !edge_visible(landmarks, start, end) {
                continue;
            }
            let from = landmarks[start].to_pixel(width, height);
            let to = landmarks[end].to_pixel(width, height);
            draw_line_segment_mut(surface, from, to, colors::BONE);
        }
    }

    /// Filled marker with a contrasting outline at every visible landmark.
    fn draw_landmarks(&self, surface: &mut RgbaImage, landmarks: &LandmarkSet) {
        let (width, height) = surface.dimensions();
        for landmark in landmarks.iter() {
            if landmark.visibility <= DRAW_VISIBILITY {
                continue;
            }
            let (x, y) = landmark.to_pixel(width, height);
            let center = (x.round() as i32, y.round() as i32);
            draw_filled_circle_mut(surface, center, JOINT_RADIUS, colors::JOINT);
            draw_hollow_circle_mut(surface, center, JOINT_RADIUS, colors::JOINT_OUTLINE);
        }
    }
}
