//! Spatial data structures for the stippling engine
//!
//! This module contains the raster-side state of a run:
//! - Density fields extracted from source images
//! - Per-pixel ownership maps
//! - The stipple data model
//! - Bucket grids for neighbor queries

/// Density fields derived from image pixels
pub mod density;
/// Per-pixel owner index raster
pub mod index_map;
/// Fixed-radius neighbor queries over point sets
pub mod neighbors;
/// Stipple data model and animation state
pub mod stipple;

pub use density::{DensityField, DensityMode, DensitySource, InkChannel};
pub use index_map::IndexMap;
pub use stipple::{Motion, Stipple};
