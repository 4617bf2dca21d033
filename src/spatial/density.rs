//! Density field extraction from raster images
//!
//! A density field stores the ink coverage of every pixel in `[0, 1]`. Samples
//! outside the frame read as zero; there is no wraparound.

use image::RgbaImage;
use ndarray::Array2;

use crate::io::configuration::MAX_IMAGE_DIMENSION;
use crate::io::error::{Result, StippleError};
use crate::math::Point;

/// Whether a run tracks one grayscale density or one density per ink channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DensityMode {
    /// Single black ink driven by inverted luminance
    #[default]
    Grayscale,
    /// Cyan, magenta and yellow inks driven by the inverted RGB channels
    Color,
    /// Single white ink driven by luminance, drawn light on dark
    Inverse,
}

impl DensityMode {
    /// Density sources stippled in this mode, in drawing order
    pub fn sources(self) -> Vec<DensitySource> {
        match self {
            Self::Grayscale => vec![DensitySource::Luminance],
            Self::Inverse => vec![DensitySource::Inverted],
            Self::Color => InkChannel::ALL
                .iter()
                .map(|&channel| DensitySource::Channel(channel))
                .collect(),
        }
    }
}

/// Subtractive ink channel derived from one RGB component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InkChannel {
    /// Absorbs red
    Cyan,
    /// Absorbs green
    Magenta,
    /// Absorbs blue
    Yellow,
}

impl InkChannel {
    /// Every channel in drawing order
    pub const ALL: [Self; 3] = [Self::Cyan, Self::Magenta, Self::Yellow];

    const fn component(self) -> usize {
        match self {
            Self::Cyan => 0,
            Self::Magenta => 1,
            Self::Yellow => 2,
        }
    }

    /// Display color of stipples in this channel
    pub const fn ink(self) -> [u8; 4] {
        match self {
            Self::Cyan => [0, 255, 255, 255],
            Self::Magenta => [255, 0, 255, 255],
            Self::Yellow => [255, 255, 0, 255],
        }
    }
}

/// How pixel colors turn into density
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensitySource {
    /// `1 - luminance`, carrying all of the ink
    Luminance,
    /// `1 - component` of one channel, carrying a third of the ink
    Channel(InkChannel),
    /// Luminance itself, so light regions attract white dots
    Inverted,
}

impl DensitySource {
    /// Share of the total ink carried by this source
    ///
    /// Black-and-white fields carry everything; color channels split it so a
    /// neutral black pixel sums to 1.0 across the three channels.
    pub const fn density_sum(self) -> f32 {
        match self {
            Self::Luminance | Self::Inverted => 1.0,
            Self::Channel(_) => 1.0 / 3.0,
        }
    }

    /// Display color of stipples drawn from this source
    pub const fn ink(self) -> [u8; 4] {
        match self {
            Self::Luminance => [0, 0, 0, 255],
            Self::Channel(channel) => channel.ink(),
            Self::Inverted => [255, 255, 255, 255],
        }
    }

    fn pixel_density(self, rgba: [u8; 4]) -> f32 {
        let [r, g, b, a] = rgba.map(|c| f32::from(c) / 255.0);
        let luminance = 0.114f32.mul_add(b, 0.299f32.mul_add(r, 0.587 * g));
        let coverage = match self {
            Self::Luminance => 1.0 - luminance,
            Self::Inverted => luminance,
            Self::Channel(channel) => {
                1.0 - [r, g, b].get(channel.component()).copied().unwrap_or(1.0)
            }
        };
        (coverage * a * self.density_sum()).clamp(0.0, 1.0)
    }
}

/// Immutable per-pixel ink density snapshot of one image
#[derive(Debug, Clone, PartialEq)]
pub struct DensityField {
    /// Density per pixel, indexed `[row, col]`
    values: Array2<f32>,
    density_sum: f32,
    ink: [u8; 4],
}

impl DensityField {
    /// Extract a density field from an RGBA image
    ///
    /// Transparent pixels carry no ink.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is empty or exceeds the maximum dimension
    pub fn from_rgba(image: &RgbaImage, source: DensitySource) -> Result<Self> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        validate_dimensions(width, height)?;

        let mut values = Array2::zeros((height, width));
        for (x, y, pixel) in image.enumerate_pixels() {
            if let Some(value) = values.get_mut([y as usize, x as usize]) {
                *value = source.pixel_density(pixel.0);
            }
        }

        Ok(Self {
            values,
            density_sum: source.density_sum(),
            ink: source.ink(),
        })
    }

    /// Wrap precomputed densities (indexed `[row, col]`), clamping them to `[0, 1]`
    ///
    /// # Errors
    ///
    /// Returns an error if the array is empty or exceeds the maximum dimension
    pub fn from_values(mut values: Array2<f32>) -> Result<Self> {
        let (height, width) = values.dim();
        validate_dimensions(width, height)?;
        values.mapv_inplace(|v| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 });
        Ok(Self {
            values,
            density_sum: 1.0,
            ink: DensitySource::Luminance.ink(),
        })
    }

    /// Field of constant density
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or too large
    pub fn uniform(width: usize, height: usize, density: f32) -> Result<Self> {
        validate_dimensions(width, height)?;
        Self::from_values(Array2::from_elem((height, width), density))
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    /// Fraction of the total ink this field carries (1.0 in black-and-white mode)
    pub const fn density_sum(&self) -> f32 {
        self.density_sum
    }

    /// Display color of stipples drawn against this field
    pub const fn ink(&self) -> [u8; 4] {
        self.ink
    }

    /// Field holding the ink this one leaves out, `density_sum - density` per pixel
    ///
    /// The complement keeps this field's ink until recolored with [`Self::with_ink`].
    #[must_use]
    pub fn complement(&self) -> Self {
        let density_sum = self.density_sum;
        Self {
            values: self.values.mapv(|v| (density_sum - v).max(0.0)),
            density_sum,
            ink: self.ink,
        }
    }

    /// Same densities drawn with a different ink
    #[must_use]
    pub const fn with_ink(mut self, ink: [u8; 4]) -> Self {
        self.ink = ink;
        self
    }

    /// Density of pixel `(x, y)`, zero outside the frame
    pub fn sample(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 {
            return 0.0;
        }
        self.values
            .get([y as usize, x as usize])
            .copied()
            .unwrap_or(0.0)
    }

    /// Density of the pixel nearest to a sub-pixel position
    pub fn sample_at(&self, point: Point) -> f32 {
        if !point.is_finite() {
            return 0.0;
        }
        self.sample(point.x.round() as i64, point.y.round() as i64)
    }

    /// Sum of all pixel densities
    pub fn total(&self) -> f64 {
        self.values.iter().map(|&v| f64::from(v)).sum()
    }
}

fn validate_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(StippleError::InvalidSourceData {
            reason: format!("image has no pixels ({width}x{height})"),
        });
    }
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(StippleError::InvalidSourceData {
            reason: format!(
                "image {width}x{height} exceeds the maximum dimension {MAX_IMAGE_DIMENSION}"
            ),
        });
    }
    Ok(())
}
