//! Convergence driver and host-facing stippling operations

use std::ops::ControlFlow;

use image::RgbaImage;

use crate::algorithm::accumulator::{Cell, accumulate};
use crate::algorithm::jitter::Jitter;
use crate::algorithm::relaxation::{Diagnostic, IterationReport, Relaxed, relax};
use crate::algorithm::voronoi::{Tessellation, tessellate};
use crate::io::configuration::{
    DEFAULT_ANIMATION_SPEED, DEFAULT_DISPLACEMENT_TOLERANCE, DEFAULT_HYSTERESIS,
    DEFAULT_HYSTERESIS_DELTA, DEFAULT_INITIAL_POINTS, DEFAULT_MAX_ITERATIONS, DEFAULT_POINT_SIZE,
    DEFAULT_POINT_SIZE_MAX, DEFAULT_POINT_SIZE_MIN, DEFAULT_SEED, SAMPLING_ATTEMPTS_PER_POINT,
};
use crate::io::error::{Result, invalid_parameter};
use crate::math::polygon::Rect;
use crate::spatial::density::{DensityField, DensityMode};
use crate::spatial::stipple::Stipple;

/// Parameters of a stippling run
#[derive(Clone, Debug, PartialEq)]
pub struct StippleConfig {
    /// Stipples sampled before the first iteration
    pub initial_points: usize,
    /// Dot diameter when adaptive sizing is off
    pub point_size: f32,
    /// Smallest adaptive dot diameter
    pub point_size_min: f32,
    /// Largest adaptive dot diameter
    pub point_size_max: f32,
    /// Whether dot size follows cell density
    pub adaptive_point_size: bool,
    /// Initial width of the band between delete and split thresholds
    pub hysteresis: f32,
    /// Hysteresis added per iteration
    pub hysteresis_delta: f32,
    /// Whether cells may split and delete, or only move
    pub population_control: bool,
    /// Hard iteration cap
    pub max_iterations: usize,
    /// Total displacement below which a run without splits or deletions has converged
    pub displacement_tolerance: f32,
    /// Grayscale or per-channel color stippling
    pub mode: DensityMode,
    /// Seed for initial sampling and split jitter
    pub seed: u64,
    /// Whether stipples keep their Voronoi cell boundaries
    pub record_edges: bool,
    /// Whether relaxed stipples glide toward their centroids instead of snapping
    pub glide: bool,
    /// Per-iteration movement cap for gliding stipples
    pub animation_speed: f32,
}

impl Default for StippleConfig {
    fn default() -> Self {
        Self {
            initial_points: DEFAULT_INITIAL_POINTS,
            point_size: DEFAULT_POINT_SIZE,
            point_size_min: DEFAULT_POINT_SIZE_MIN,
            point_size_max: DEFAULT_POINT_SIZE_MAX,
            adaptive_point_size: true,
            hysteresis: DEFAULT_HYSTERESIS,
            hysteresis_delta: DEFAULT_HYSTERESIS_DELTA,
            population_control: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            displacement_tolerance: DEFAULT_DISPLACEMENT_TOLERANCE,
            mode: DensityMode::Grayscale,
            seed: DEFAULT_SEED,
            record_edges: false,
            glide: false,
            animation_speed: DEFAULT_ANIMATION_SPEED,
        }
    }
}

impl StippleConfig {
    /// Check the configuration for values the engine cannot run with
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any point size is non-positive or non-finite
    /// - The minimum point size exceeds the maximum
    /// - Hysteresis or its delta is negative or non-finite
    /// - The iteration budget is zero
    /// - The displacement tolerance or animation speed is non-positive or non-finite
    pub fn validate(&self) -> Result<()> {
        for (parameter, value) in [
            ("point_size", self.point_size),
            ("point_size_min", self.point_size_min),
            ("point_size_max", self.point_size_max),
            ("displacement_tolerance", self.displacement_tolerance),
            ("animation_speed", self.animation_speed),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid_parameter(parameter, &value, &"must be positive and finite"));
            }
        }

        if self.point_size_min > self.point_size_max {
            return Err(invalid_parameter(
                "point_size_min",
                &self.point_size_min,
                &format!("must not exceed point_size_max ({})", self.point_size_max),
            ));
        }

        for (parameter, value) in [
            ("hysteresis", self.hysteresis),
            ("hysteresis_delta", self.hysteresis_delta),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid_parameter(parameter, &value, &"must be non-negative and finite"));
            }
        }

        if self.max_iterations == 0 {
            return Err(invalid_parameter(
                "max_iterations",
                &self.max_iterations,
                &"at least one iteration is required",
            ));
        }

        Ok(())
    }
}

/// Which density field cells are measured against
#[derive(Debug, Clone, Copy)]
pub enum CellSource<'a> {
    /// The stippler's own field
    Primary,
    /// A caller-supplied field, used to morph toward another image
    Alternate(&'a DensityField),
}

/// Cells of one stipple set, with the geometry they were measured on
#[derive(Debug, Clone)]
pub struct CellSet {
    /// Voronoi diagram, absent when the stipple set was empty
    pub tessellation: Option<Tessellation>,
    /// One cell per stipple, in stipple order
    pub cells: Vec<Cell>,
    /// Degenerate-input conditions met while building the cells
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a convergence run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final stipple set
    pub stipples: Vec<Stipple>,
    /// Iterations performed
    pub iterations: usize,
    /// Whether positions settled before the iteration budget ran out
    pub converged: bool,
    /// Whether the observer stopped the run early
    pub interrupted: bool,
    /// Every recoverable condition met during the run
    pub diagnostics: Vec<Diagnostic>,
}

/// Weighted Voronoi stippling engine for one density field
///
/// Owns the seeded jitter source and the iteration counter that drives the
/// growing hysteresis; the stipple set itself is passed in and returned by
/// each operation.
#[derive(Debug, Clone)]
pub struct Stippler {
    field: DensityField,
    config: StippleConfig,
    jitter: Jitter,
    iteration: usize,
}

impl Stippler {
    /// Create an engine for `field`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation
    pub fn new(field: DensityField, config: StippleConfig) -> Result<Self> {
        config.validate()?;
        let jitter = Jitter::new(config.seed);
        Ok(Self {
            field,
            config,
            jitter,
            iteration: 0,
        })
    }

    /// Density field stipples are relaxed against
    pub const fn field(&self) -> &DensityField {
        &self.field
    }

    /// Run configuration
    pub const fn config(&self) -> &StippleConfig {
        &self.config
    }

    /// Iterations performed since the last run started
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Sample the initial stipple set in proportion to density
    pub fn init_stipples(&mut self) -> Vec<Stipple> {
        let count = self.config.initial_points;
        let attempts = count.saturating_mul(SAMPLING_ATTEMPTS_PER_POINT);
        let ink = self.field.ink();
        let size = self.config.point_size;

        self.jitter
            .sample_density(&self.field, count, attempts)
            .into_iter()
            .map(|position| Stipple::new(position, size, ink))
            .collect()
    }

    /// Tessellate `stipples` and measure every cell against `source`
    ///
    /// The diagram covers the measured field's rectangle, so alternate fields
    /// of a different size are handled.
    pub fn generate_cells(&self, stipples: &[Stipple], source: CellSource<'_>) -> CellSet {
        let field = match source {
            CellSource::Primary => &self.field,
            CellSource::Alternate(field) => field,
        };

        let mut diagnostics = Vec::new();
        if stipples.len() < 2 {
            diagnostics.push(Diagnostic::DegenerateInput {
                stipple_count: stipples.len(),
            });
        }

        let positions: Vec<_> = stipples.iter().map(|s| s.position).collect();
        match tessellate(&positions, field.width(), field.height()) {
            Ok(tessellation) => {
                let cells = accumulate(tessellation.index_map(), field);
                for &index in tessellation.collapsed() {
                    log::trace!("cell {index} collapsed onto an earlier stipple");
                }
                CellSet {
                    tessellation: Some(tessellation),
                    cells,
                    diagnostics,
                }
            }
            Err(error) => {
                log::trace!("skipping tessellation: {error}");
                CellSet {
                    tessellation: None,
                    cells: Vec::new(),
                    diagnostics,
                }
            }
        }
    }

    /// Run exactly one relaxation iteration against the primary field
    pub fn step(&mut self, stipples: &[Stipple]) -> Relaxed {
        self.step_against(stipples, CellSource::Primary)
    }

    /// Run exactly one relaxation iteration against `source`
    pub fn step_against(&mut self, stipples: &[Stipple], source: CellSource<'_>) -> Relaxed {
        self.step_around(&[], stipples, source)
    }

    // One iteration of `stipples` with `held` tessellated ahead of them as fixed sites
    fn step_around(
        &mut self,
        held: &[Stipple],
        stipples: &[Stipple],
        source: CellSource<'_>,
    ) -> Relaxed {
        let live: Vec<Stipple> = held
            .iter()
            .chain(stipples)
            .filter(|s| !s.deleted)
            .cloned()
            .collect();
        let held_count = held.iter().filter(|s| !s.deleted).count();
        let bounds = match source {
            CellSource::Primary => Rect::from_image_size(self.field.width(), self.field.height()),
            CellSource::Alternate(field) => Rect::from_image_size(field.width(), field.height()),
        };

        let cell_set = self.generate_cells(&live, source);
        let mut relaxed = relax(
            &live,
            held_count,
            &cell_set.cells,
            cell_set.tessellation.as_ref(),
            bounds,
            &self.config,
            self.iteration,
            &mut self.jitter,
        );

        let mut diagnostics = cell_set.diagnostics;
        diagnostics.append(&mut relaxed.report.diagnostics);
        for diagnostic in &diagnostics {
            log::trace!("iteration {}: {diagnostic:?}", self.iteration);
        }
        relaxed.report.diagnostics = diagnostics;

        log::debug!(
            "iteration {}: {} stipples, {} splits, {} deletions, displacement {:.3}",
            relaxed.report.iteration,
            relaxed.report.stipple_count,
            relaxed.report.splits,
            relaxed.report.deletions,
            relaxed.report.displacement,
        );

        self.iteration += 1;
        relaxed
    }

    /// Sample an initial set and relax it to convergence
    pub fn run(&mut self) -> RunOutcome {
        let stipples = self.init_stipples();
        self.run_with(stipples, |_, _| ControlFlow::Continue(()))
    }

    /// Relax `stipples` to convergence against the primary field
    ///
    /// `observer` sees every iteration's report and resulting stipples and may
    /// stop the run at the iteration boundary by returning `Break`.
    pub fn run_with<F>(&mut self, stipples: Vec<Stipple>, observer: F) -> RunOutcome
    where
        F: FnMut(&IterationReport, &[Stipple]) -> ControlFlow<()>,
    {
        self.converge(&[], stipples, CellSource::Primary, observer)
    }

    /// Re-converge an existing set against an alternate field
    ///
    /// Stipples keep their colors; the result is ready to be matched against
    /// the input for an animated transition.
    pub fn morph_to(&mut self, stipples: Vec<Stipple>, target: &DensityField) -> RunOutcome {
        self.converge(&[], stipples, CellSource::Alternate(target), |_, _| {
            ControlFlow::Continue(())
        })
    }

    /// Stipple the area `foreground` leaves empty with a second population
    ///
    /// The new stipples are sampled from and relaxed against the complement
    /// of the field, drawn in `ink`. Foreground stipples stay where they are
    /// and only claim their Voronoi cells, so the fill settles around them.
    /// The outcome holds the fill stipples alone.
    pub fn fill(&mut self, foreground: &[Stipple], ink: [u8; 4]) -> RunOutcome {
        let background = self.field.complement().with_ink(ink);
        if background.total() <= 0.0 {
            log::debug!("the foreground field leaves nothing to fill");
            return RunOutcome {
                stipples: Vec::new(),
                iterations: 0,
                converged: true,
                interrupted: false,
                diagnostics: Vec::new(),
            };
        }

        let count = self.config.initial_points;
        let attempts = count.saturating_mul(SAMPLING_ATTEMPTS_PER_POINT);
        let size = self.config.point_size;
        let initial: Vec<Stipple> = self
            .jitter
            .sample_density(&background, count, attempts)
            .into_iter()
            .map(|position| Stipple::new(position, size, ink))
            .collect();

        self.converge(
            foreground,
            initial,
            CellSource::Alternate(&background),
            |_, _| ControlFlow::Continue(()),
        )
    }

    fn converge<F>(
        &mut self,
        held: &[Stipple],
        mut stipples: Vec<Stipple>,
        source: CellSource<'_>,
        mut observer: F,
    ) -> RunOutcome
    where
        F: FnMut(&IterationReport, &[Stipple]) -> ControlFlow<()>,
    {
        self.iteration = 0;
        let mut diagnostics = Vec::new();
        let mut converged = false;
        let mut interrupted = false;
        let mut last_displacement = 0.0;

        while self.iteration < self.config.max_iterations {
            let relaxed = self.step_around(held, &stipples, source);
            stipples = relaxed.stipples;
            let report = relaxed.report;

            converged = !report.population_changed()
                && report.displacement < self.config.displacement_tolerance;
            last_displacement = report.displacement;

            if observer(&report, &stipples).is_break() {
                interrupted = true;
            }
            diagnostics.extend(report.diagnostics);

            if converged || interrupted {
                break;
            }
        }

        if converged {
            log::info!(
                "converged after {} iterations with {} stipples",
                self.iteration,
                stipples.len()
            );
        } else if interrupted {
            log::info!("run interrupted after {} iterations", self.iteration);
        } else {
            log::warn!(
                "no convergence within {} iterations (last displacement {last_displacement:.3})",
                self.iteration
            );
            diagnostics.push(Diagnostic::NonConvergence {
                iterations: self.iteration,
                displacement: last_displacement,
            });
        }

        RunOutcome {
            stipples,
            iterations: self.iteration,
            converged,
            interrupted,
            diagnostics,
        }
    }
}

/// Stipple `image` to convergence
///
/// Color mode stipples each ink channel separately, with a seed derived per
/// channel, and returns the channels' stipples in drawing order.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the image is empty
/// or oversized
pub fn compute_stipples(image: &RgbaImage, config: &StippleConfig) -> Result<Vec<Stipple>> {
    config.validate()?;

    let mut stipples = Vec::new();
    for (layer, source) in config.mode.sources().into_iter().enumerate() {
        let field = DensityField::from_rgba(image, source)?;
        let layer_config = StippleConfig {
            seed: config.seed.wrapping_add(layer as u64),
            ..config.clone()
        };
        let outcome = Stippler::new(field, layer_config)?.run();
        stipples.extend(outcome.stipples);
    }
    Ok(stipples)
}

/// Run exactly one relaxation iteration of `stipples` against `image`
///
/// `iteration` selects the hysteresis and, mixed into the seed, the jitter,
/// so repeated calls with identical inputs are bit-identical. In color mode
/// each stipple is relaxed against the channel whose ink it carries; stipples
/// carrying none of the inks are returned unchanged after the relaxed ones.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the image is empty
/// or oversized
pub fn step_iteration(
    stipples: &[Stipple],
    image: &RgbaImage,
    config: &StippleConfig,
    iteration: usize,
) -> Result<Vec<Stipple>> {
    config.validate()?;

    let sources = config.mode.sources();
    let mut next = Vec::with_capacity(stipples.len());
    for (layer, source) in sources.iter().enumerate() {
        let layer_stipples: Vec<Stipple> = stipples
            .iter()
            .filter(|s| sources.len() == 1 || s.color == source.ink())
            .cloned()
            .collect();

        let field = DensityField::from_rgba(image, *source)?;
        let mut stippler = Stippler::new(field, config.clone())?;
        stippler.jitter = Jitter::new(
            config
                .seed
                .wrapping_add(layer as u64)
                .wrapping_add((iteration as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        );
        stippler.iteration = iteration;

        next.extend(stippler.step(&layer_stipples).stipples);
    }

    if sources.len() > 1 {
        let foreign: Vec<Stipple> = stipples
            .iter()
            .filter(|s| !s.deleted && sources.iter().all(|source| source.ink() != s.color))
            .cloned()
            .collect();
        if !foreign.is_empty() {
            log::debug!("{} stipples match no ink channel and were kept as is", foreign.len());
        }
        next.extend(foreign);
    }
    Ok(next)
}
