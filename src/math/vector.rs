//! Two-dimensional float vectors for stipple positions and cell geometry
//!
//! Positions are `glam::Vec2`. Pixel `(x, y)` is sampled at the integer
//! coordinate `(x, y)`, so a stipple centered on a pixel has integral
//! coordinates.

use glam::Vec2;

/// Position or offset in image space
pub type Point = Vec2;

/// Planar helpers `glam::Vec2` does not provide
pub trait PointExt {
    /// Move toward `target` by at most `max_step`, landing on it when closer
    fn step_toward(self, target: Self, max_step: f32) -> Self;

    /// Z component of the 3D cross product, positive for a counter-clockwise turn
    fn cross(self, other: Self) -> f32;
}

impl PointExt for Vec2 {
    fn step_toward(self, target: Self, max_step: f32) -> Self {
        let delta = target - self;
        let distance = delta.length();
        if distance <= max_step || distance <= f32::EPSILON {
            target
        } else {
            self + delta * (max_step / distance)
        }
    }

    fn cross(self, other: Self) -> f32 {
        self.perp_dot(other)
    }
}
