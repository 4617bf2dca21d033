//! Seeded randomness for split placement and initial sampling

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::math::Point;
use crate::math::polygon::Rect;
use crate::spatial::density::DensityField;

/// Seeded random source, injected so identical seeds reproduce identical runs
#[derive(Debug, Clone)]
pub struct Jitter {
    rng: StdRng,
}

impl Jitter {
    /// Create a deterministic random source
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform offset in the square `[-amplitude, amplitude]²`
    pub fn offset(&mut self, amplitude: f32) -> Point {
        if amplitude <= 0.0 || !amplitude.is_finite() {
            return Point::ZERO;
        }
        Point::new(
            self.rng.random_range(-amplitude..=amplitude),
            self.rng.random_range(-amplitude..=amplitude),
        )
    }

    /// `point` displaced by a uniform offset of at most `amplitude` per axis
    pub fn perturb(&mut self, point: Point, amplitude: f32) -> Point {
        point + self.offset(amplitude)
    }

    /// Uniform position inside `rect`
    pub fn point_in(&mut self, rect: &Rect) -> Point {
        Point::new(
            rect.min.x + self.rng.random::<f32>() * rect.width(),
            rect.min.y + self.rng.random::<f32>() * rect.height(),
        )
    }

    /// Sample up to `count` positions with probability proportional to density
    ///
    /// Rejection sampling gives up after `max_attempts`; the shortfall is
    /// filled uniformly so blank images still receive the requested points.
    pub fn sample_density(
        &mut self,
        field: &DensityField,
        count: usize,
        max_attempts: usize,
    ) -> Vec<Point> {
        let rect = Rect::from_image_size(field.width(), field.height());
        let mut points = Vec::with_capacity(count);

        let mut attempts = 0;
        while points.len() < count && attempts < max_attempts {
            attempts += 1;
            let candidate = self.point_in(&rect);
            if self.rng.random::<f32>() < field.sample_at(candidate) {
                points.push(candidate);
            }
        }

        while points.len() < count {
            points.push(self.point_in(&rect));
        }

        points
    }
}
