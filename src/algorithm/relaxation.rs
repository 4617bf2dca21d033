//! Centroidal relaxation and density-driven population control
//!
//! Every iteration each stipple is classified against its cell's total
//! density. Below the lower bound it is deleted, above the upper bound it is
//! split in two along the cell's principal axis, and in between it moves to the
//! weighted centroid. Separate bounds keep a cell sitting near one threshold
//! from alternating between split and delete.

use std::f32::consts::{PI, SQRT_2};

use crate::algorithm::accumulator::Cell;
use crate::algorithm::jitter::Jitter;
use crate::algorithm::stippler::StippleConfig;
use crate::algorithm::voronoi::Tessellation;
use crate::io::configuration::{SPLIT_JITTER_FRACTION, SPLIT_OFFSET_FRACTION};
use crate::math::Point;
use crate::math::polygon::Rect;
use crate::spatial::stipple::Stipple;

/// Recoverable condition observed during an iteration
///
/// None of these abort a run; they are reported so hosts can log them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Diagnostic {
    /// Fewer than two stipples; the tessellation was skipped
    DegenerateInput {
        /// Number of stipples supplied
        stipple_count: usize,
    },
    /// A cell held no ink and moved to its geometric centroid
    ZeroDensityCell {
        /// Index of the stipple owning the cell
        index: usize,
    },
    /// A stipple left the image and was clamped back onto it
    OutOfBoundsSample {
        /// Index of the stipple in the iteration's input
        index: usize,
    },
    /// The iteration budget ran out before positions settled
    NonConvergence {
        /// Iterations performed
        iterations: usize,
        /// Total displacement of the last iteration
        displacement: f32,
    },
}

/// What population control decided for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDecision {
    /// Too little ink to justify a dot
    Delete,
    /// Density within bounds, relax toward the centroid
    Move,
    /// Too much ink for one dot
    Split,
}

/// Summary of one relaxation iteration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IterationReport {
    /// Zero-based iteration index
    pub iteration: usize,
    /// Hysteresis used for the density bounds
    pub hysteresis: f32,
    /// Live stipples after compaction
    pub stipple_count: usize,
    /// Stipples split in two
    pub splits: usize,
    /// Stipples removed
    pub deletions: usize,
    /// Sum of the distances moved by stipples that were not split or deleted
    pub displacement: f32,
    /// Recoverable conditions met along the way
    pub diagnostics: Vec<Diagnostic>,
}

impl IterationReport {
    /// Whether the stipple population changed
    pub const fn population_changed(&self) -> bool {
        self.splits > 0 || self.deletions > 0
    }
}

/// Stipples after one relaxation step, with the step's report
#[derive(Debug, Clone)]
pub struct Relaxed {
    /// Compacted next-iteration stipple set
    pub stipples: Vec<Stipple>,
    /// What happened during the step
    pub report: IterationReport,
}

/// Hysteresis for a given iteration, widening by the configured delta each time
pub fn hysteresis_at(config: &StippleConfig, iteration: usize) -> f32 {
    (iteration as f32).mul_add(config.hysteresis_delta, config.hysteresis)
}

/// Dot diameter for a cell
///
/// Adaptive sizing blends the configured bounds by the square root of the
/// mean cell density, so larger and denser cells get larger dots.
pub fn current_stipple_size(cell: &Cell, config: &StippleConfig) -> f32 {
    if !config.adaptive_point_size {
        return config.point_size;
    }
    let intensity = cell.mean_density().clamp(0.0, 1.0).sqrt();
    (1.0 - intensity).mul_add(config.point_size_min, intensity * config.point_size_max)
}

/// Ink below which a dot of `point_size` is not justified
pub fn calculate_lower_density_bound(point_size: f32, hysteresis: f32) -> f32 {
    let radius = point_size / 2.0;
    (1.0 - hysteresis / 2.0) * PI * radius * radius
}

/// Ink above which a dot of `point_size` must split
pub fn calculate_upper_density_bound(point_size: f32, hysteresis: f32) -> f32 {
    let radius = point_size / 2.0;
    (1.0 + hysteresis / 2.0) * PI * radius * radius
}

/// Compare a cell's ink against the bounds for its dot size
pub fn classify(cell: &Cell, point_size: f32, hysteresis: f32) -> CellDecision {
    if cell.total_density < calculate_lower_density_bound(point_size, hysteresis) {
        CellDecision::Delete
    } else if cell.total_density > calculate_upper_density_bound(point_size, hysteresis) {
        CellDecision::Split
    } else {
        CellDecision::Move
    }
}

/// Two children replacing `stipple`, offset from the centroid along the cell's principal axis
///
/// Each child's dot covers half the parent's area. A parent in animation mode
/// hands its motion on: children start at the parent's position and glide apart.
pub fn split_cell(stipple: &Stipple, cell: &Cell, point_size: f32, jitter: &mut Jitter) -> [Stipple; 2] {
    let radius = cell.equivalent_radius();
    let axis = Point::from_angle(cell.orientation) * (SPLIT_OFFSET_FRACTION * radius);
    let amplitude = SPLIT_JITTER_FRACTION * radius;
    let child_size = point_size / SQRT_2;

    let targets = [
        jitter.perturb(cell.centroid - axis, amplitude),
        jitter.perturb(cell.centroid + axis, amplitude),
    ];

    targets.map(|target| {
        if stipple.is_moving() {
            let mut child = Stipple::new(stipple.position, stipple.size, stipple.color);
            child.glide_to(target, child_size, stipple.motion.speed);
            child
        } else {
            Stipple::new(target, child_size, stipple.color)
        }
    })
}

/// Run one relaxation step over `stipples` and their `cells`
///
/// `cells[i]` must describe the Voronoi cell of `stipples[i]`. The first
/// `held` stipples are fixed sites: they shape their neighbors' cells but are
/// neither relaxed nor returned. Stipples already flagged deleted are
/// compacted out without being examined, and every surviving position is
/// clamped into `bounds`.
pub fn relax(
    stipples: &[Stipple],
    held: usize,
    cells: &[Cell],
    tessellation: Option<&Tessellation>,
    bounds: Rect,
    config: &StippleConfig,
    iteration: usize,
    jitter: &mut Jitter,
) -> Relaxed {
    let hysteresis = hysteresis_at(config, iteration);

    let mut report = IterationReport {
        iteration,
        hysteresis,
        ..IterationReport::default()
    };
    let mut next: Vec<Stipple> = Vec::with_capacity(stipples.len() + stipples.len() / 4);

    for (index, (stipple, cell)) in stipples.iter().zip(cells).enumerate().skip(held) {
        if stipple.deleted {
            continue;
        }

        let mut current = stipple.clone();

        if cell.is_empty() {
            current.deleted = true;
            report.deletions += 1;
            next.push(current);
            continue;
        }

        let size = current_stipple_size(cell, config);
        let decision = if config.population_control {
            classify(cell, size, hysteresis)
        } else {
            CellDecision::Move
        };

        match decision {
            CellDecision::Delete => {
                current.deleted = true;
                report.deletions += 1;
                next.push(current);
            }
            CellDecision::Split => {
                let children = split_cell(&current, cell, size, jitter);
                current.deleted = true;
                report.splits += 1;
                next.push(current);
                for mut child in children {
                    child.position = bounds.clamp(child.position);
                    child.motion.target_position = bounds.clamp(child.motion.target_position);
                    next.push(child);
                }
            }
            CellDecision::Move => {
                if cell.total_density <= 0.0 {
                    report
                        .diagnostics
                        .push(Diagnostic::ZeroDensityCell { index });
                }

                if config.glide && !current.is_moving() {
                    current.glide_to(current.position, current.size, config.animation_speed);
                }

                if current.is_moving() {
                    current.retarget(cell.centroid, size);
                    report.displacement += current.advance_motion();
                } else {
                    report.displacement += current.position.distance(cell.centroid);
                    current.position = cell.centroid;
                    current.size = size;
                }

                let clamped = bounds.clamp(current.position);
                if clamped != current.position || !current.position.is_finite() {
                    report
                        .diagnostics
                        .push(Diagnostic::OutOfBoundsSample { index });
                    current.position = if clamped.is_finite() { clamped } else { bounds.min };
                }
                if !current.is_moving() {
                    current.retarget(current.position, current.size);
                }

                if config.record_edges {
                    current.edges = tessellation
                        .map(|t| t.cell_edges(index))
                        .unwrap_or_default();
                }
                next.push(current);
            }
        }
    }

    next.retain(|s| !s.deleted);
    report.stipple_count = next.len();

    Relaxed {
        stipples: next,
        report,
    }
}
