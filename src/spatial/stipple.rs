//! Stipple data model shared by the relaxation loop and transitions

use crate::math::{Point, PointExt};

/// Animation state of a stipple gliding toward a target instead of snapping
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    /// Whether the stipple is in animation mode
    pub moving: bool,
    /// Position being approached
    pub target_position: Point,
    /// Dot diameter being approached
    pub target_size: f32,
    /// Largest position and size change per frame, in pixels
    pub speed: f32,
}

/// A rendered dot approximating local image density
#[derive(Debug, Clone, PartialEq)]
pub struct Stipple {
    /// Dot center in image space
    pub position: Point,
    /// Dot diameter in pixels
    pub size: f32,
    /// RGBA display color
    pub color: [u8; 4],
    /// Animation state
    pub motion: Motion,
    /// Boundary segments of the stipple's last Voronoi cell, when recorded
    pub edges: Vec<[Point; 2]>,
    /// Marked for removal at the next compaction
    pub deleted: bool,
}

impl Stipple {
    /// Stationary stipple
    pub const fn new(position: Point, size: f32, color: [u8; 4]) -> Self {
        Self {
            position,
            size,
            color,
            motion: Motion {
                moving: false,
                target_position: position,
                target_size: size,
                speed: 0.0,
            },
            edges: Vec::new(),
            deleted: false,
        }
    }

    /// Whether the stipple glides toward its targets
    pub const fn is_moving(&self) -> bool {
        self.motion.moving
    }

    /// Enter animation mode toward the given position and size
    pub const fn glide_to(&mut self, target_position: Point, target_size: f32, speed: f32) {
        self.motion = Motion {
            moving: true,
            target_position,
            target_size,
            speed,
        };
    }

    /// Retarget a moving stipple without changing its speed
    pub const fn retarget(&mut self, target_position: Point, target_size: f32) {
        self.motion.target_position = target_position;
        self.motion.target_size = target_size;
    }

    /// Advance one frame toward the targets, leaving animation mode on arrival
    ///
    /// Returns the distance travelled.
    pub fn advance_motion(&mut self) -> f32 {
        if !self.motion.moving {
            return 0.0;
        }
        let speed = self.motion.speed;
        let next = self.position.step_toward(self.motion.target_position, speed);
        let travelled = next.distance(self.position);
        self.position = next;

        let size_delta = self.motion.target_size - self.size;
        self.size += size_delta.clamp(-speed, speed);

        if self.position == self.motion.target_position
            && (self.size - self.motion.target_size).abs() <= f32::EPSILON
        {
            self.size = self.motion.target_size;
            self.motion.moving = false;
        }
        travelled
    }
}
