//! Mathematical utilities for the stippling engine

/// Easing curves for animated transitions
pub mod easing;
/// Convex polygon clipping and triangle rasterization tests
pub mod polygon;
/// Point type and planar helpers
pub mod vector;

pub use vector::{Point, PointExt};
