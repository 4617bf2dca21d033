//! Frame capture and GIF generation for relaxation runs and transitions

use std::path::Path;

use image::{Frame, RgbaImage};

use crate::io::configuration::VIEWER_MIN_FRAME_DELAY_MS;
use crate::io::error::{Result, StippleError};
use crate::io::image::{Surface, render_stipples_on};
use crate::spatial::stipple::Stipple;

/// Captures rendered stipple sets for animated export
///
/// Each captured frame is rendered immediately, so the capture holds pixels
/// rather than stipple sets and can be exported at any time.
pub struct VisualizationCapture {
    frames: Vec<RgbaImage>,
    width: u32,
    height: u32,
    surface: Surface,
}

impl VisualizationCapture {
    /// Capture frames of the given canvas size
    pub fn new(width: u32, height: u32, expected_frames: usize) -> Self {
        Self {
            frames: Vec::with_capacity(expected_frames),
            width,
            height,
            surface: Surface::Paper,
        }
    }

    /// Render captured frames on `surface` instead of paper
    #[must_use]
    pub const fn on_surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    /// Render and store one stipple set
    pub fn capture(&mut self, stipples: &[Stipple]) {
        self.frames.push(render_stipples_on(
            stipples,
            self.width,
            self.height,
            self.surface,
        ));
    }

    /// Number of captured frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Export the captured frames as a GIF with automatic frame skipping
    ///
    /// Delays below what viewers honor are raised to the viewer minimum and
    /// intermediate frames are dropped so the apparent speed is kept. The last
    /// frame is always kept and held longer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No frames were captured
    /// - File system operations fail
    /// - GIF encoding fails
    pub fn export_gif(&self, output_path: &Path, frame_delay_ms: u32) -> Result<()> {
        if self.frames.is_empty() {
            return Err(StippleError::InvalidSourceData {
                reason: "No frames captured for visualization".to_string(),
            });
        }

        let frame_delay_ms = frame_delay_ms.max(1);
        let effective_delay_ms = frame_delay_ms.max(VIEWER_MIN_FRAME_DELAY_MS);
        let skip_factor = if frame_delay_ms < VIEWER_MIN_FRAME_DELAY_MS {
            VIEWER_MIN_FRAME_DELAY_MS.div_ceil(frame_delay_ms) as usize
        } else {
            1
        };

        let frames = self.generate_frames(effective_delay_ms, skip_factor);

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StippleError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        let file = std::fs::File::create(output_path).map_err(|e| StippleError::FileSystem {
            path: output_path.to_path_buf(),
            operation: "create file",
            source: e,
        })?;

        let mut encoder = image::codecs::gif::GifEncoder::new(file);
        encoder
            .encode_frames(frames)
            .map_err(|e| StippleError::ImageExport {
                path: output_path.to_path_buf(),
                source: e,
            })?;

        log::debug!(
            "exported {} of {} frames to {}",
            self.frames.len().div_ceil(skip_factor),
            self.frames.len(),
            output_path.display()
        );
        Ok(())
    }

    fn generate_frames(&self, delay_ms: u32, skip_factor: usize) -> Vec<Frame> {
        let last = self.frames.len().saturating_sub(1);
        let mut frames: Vec<Frame> = self
            .frames
            .iter()
            .enumerate()
            .filter(|&(index, _)| index % skip_factor == 0 || index == last)
            .map(|(_, canvas)| {
                Frame::from_parts(
                    canvas.clone(),
                    0,
                    0,
                    image::Delay::from_numer_denom_ms(delay_ms, 1),
                )
            })
            .collect();

        // Final frame displays longer for better visibility
        if let Some(final_canvas) = self.frames.last() {
            frames.push(Frame::from_parts(
                final_canvas.clone(),
                0,
                0,
                image::Delay::from_numer_denom_ms(delay_ms * 25, 1),
            ));
        }

        frames
    }
}
