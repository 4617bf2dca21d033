//! Image loading and stipple rasterization for the host layer

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::io::configuration::{BACKGROUND_COLOR, INVERSE_BACKGROUND_COLOR};
use crate::io::error::{Result, StippleError};
use crate::math::Point;
use crate::spatial::density::DensityMode;
use crate::spatial::stipple::Stipple;

/// What the dots are drawn on and how their inks combine with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    /// White background, inks absorb light
    #[default]
    Paper,
    /// Black background, inks emit light
    Slate,
}

impl Surface {
    /// Background color of a blank canvas
    pub const fn background(self) -> [u8; 4] {
        match self {
            Self::Paper => BACKGROUND_COLOR,
            Self::Slate => INVERSE_BACKGROUND_COLOR,
        }
    }
}

impl From<DensityMode> for Surface {
    fn from(mode: DensityMode) -> Self {
        match mode {
            DensityMode::Grayscale | DensityMode::Color => Self::Paper,
            DensityMode::Inverse => Self::Slate,
        }
    }
}

/// Load any supported image format as RGBA
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|decoded| decoded.to_rgba8())
        .map_err(|source| StippleError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Render stipples as filled discs on blank paper
///
/// Inks combine multiplicatively, so overlapping cyan, magenta and yellow
/// dots darken toward black as they would on paper. Disc edges are
/// anti-aliased by pixel coverage.
pub fn render_stipples(stipples: &[Stipple], width: u32, height: u32) -> RgbaImage {
    render_stipples_on(stipples, width, height, Surface::Paper)
}

/// Render stipples as filled discs on a blank canvas of the given surface
///
/// On slate the inks add light instead, so white dots brighten a black canvas.
pub fn render_stipples_on(
    stipples: &[Stipple],
    width: u32,
    height: u32,
    surface: Surface,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(surface.background()));
    render_stipples_over(&mut canvas, stipples, surface);
    canvas
}

/// Render stipples onto an existing canvas
pub fn render_stipples_over(canvas: &mut RgbaImage, stipples: &[Stipple], surface: Surface) {
    for stipple in stipples.iter().filter(|s| !s.deleted) {
        draw_disc(canvas, stipple, surface);
    }
}

fn draw_disc(canvas: &mut RgbaImage, stipple: &Stipple, surface: Surface) {
    let radius = (stipple.size / 2.0).max(0.5);
    let center = stipple.position;
    if !center.is_finite() {
        return;
    }

    let reach = radius + 1.0;
    let min_x = (center.x - reach).floor().max(0.0) as u32;
    let min_y = (center.y - reach).floor().max(0.0) as u32;
    let max_x = ((center.x + reach).ceil().max(0.0) as u32).min(canvas.width().saturating_sub(1));
    let max_y = ((center.y + reach).ceil().max(0.0) as u32).min(canvas.height().saturating_sub(1));

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let distance = Point::new(x as f32, y as f32).distance(center);
            let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }
            if let Some(pixel) = canvas.get_pixel_mut_checked(x, y) {
                match surface {
                    Surface::Paper => absorb_ink(pixel, stipple.color, coverage),
                    Surface::Slate => emit_ink(pixel, stipple.color, coverage),
                }
            }
        }
    }
}

fn absorb_ink(pixel: &mut Rgba<u8>, ink: [u8; 4], coverage: f32) {
    let strength = coverage * f32::from(ink[3]) / 255.0;
    for (channel, &component) in pixel.0.iter_mut().zip(&ink).take(3) {
        let absorbed = strength * (1.0 - f32::from(component) / 255.0);
        *channel = (f32::from(*channel) * (1.0 - absorbed)).round() as u8;
    }
}

// Screen blend, the mirror image of absorb_ink
fn emit_ink(pixel: &mut Rgba<u8>, ink: [u8; 4], coverage: f32) {
    let strength = coverage * f32::from(ink[3]) / 255.0;
    for (channel, &component) in pixel.0.iter_mut().zip(&ink).take(3) {
        let emitted = strength * f32::from(component) / 255.0;
        let dark = 255.0 - f32::from(*channel);
        *channel = (255.0 - dark * (1.0 - emitted)).round() as u8;
    }
}

/// Draw recorded Voronoi cell boundaries over a canvas
pub fn draw_cell_edges(canvas: &mut RgbaImage, stipples: &[Stipple], color: [u8; 4]) {
    for [from, to] in stipples.iter().flat_map(|s| s.edges.iter()) {
        let steps = from.distance(*to).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let point = from.lerp(*to, step as f32 / steps as f32);
            if point.x < 0.0 || point.y < 0.0 {
                continue;
            }
            let (x, y) = (point.x.round() as u32, point.y.round() as u32);
            if let Some(pixel) = canvas.get_pixel_mut_checked(x, y) {
                *pixel = Rgba(color);
            }
        }
    }
}

/// Save a canvas as PNG, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn save_png(canvas: &RgbaImage, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StippleError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    canvas
        .save_with_format(output_path, image::ImageFormat::Png)
        .map_err(|e| StippleError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}
