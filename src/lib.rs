//! Weighted Voronoi stippling of raster images
//!
//! Stipples are relaxed toward the density-weighted centroids of their
//! Voronoi cells, splitting where a cell holds too much ink and disappearing
//! where it holds too little, until positions settle. Two converged sets can
//! be matched and animated into one another.

#![forbid(unsafe_code)]

/// Voronoi tessellation, cell accumulation, relaxation and the convergence driver
pub mod algorithm;
/// Correspondence matching and frame-stepped transitions
pub mod animation;
/// Host layer: errors, configuration, image I/O, progress and the CLI
pub mod io;
/// Points, convex polygons and easing curves
pub mod math;
/// Density fields, index maps and the stipple data model
pub mod spatial;

pub use algorithm::stippler::{StippleConfig, Stippler, compute_stipples, step_iteration};
pub use animation::transition::{TransitionConfig, begin_transition};
pub use io::error::{Result, StippleError};
