//! Command-line host: stipple an image, optionally morph it into a second one

use crate::algorithm::stippler::{StippleConfig, Stippler};
use crate::animation::transition::{Transition, TransitionConfig, begin_transition};
use crate::io::configuration::{
    DEFAULT_HYSTERESIS, DEFAULT_INITIAL_POINTS, DEFAULT_MATCH_DISTANCE, DEFAULT_MAX_ITERATIONS,
    DEFAULT_POINT_SIZE, DEFAULT_POINT_SIZE_MAX, DEFAULT_POINT_SIZE_MIN, DEFAULT_SEED,
    DEFAULT_TRANSITION_FRAMES, FILL_INK, FILL_SUFFIX, GIF_FRAME_DELAY_MS, GIF_ITERATION_DELAY_MS,
    ITERATIONS_SUFFIX, OUTPUT_SUFFIX, TRANSITION_SUFFIX,
};
use crate::io::error::Result;
use crate::io::image::{
    Surface, draw_cell_edges, load_image, render_stipples_on, render_stipples_over, save_png,
};
use crate::io::progress::ProgressManager;
use crate::io::visualization::VisualizationCapture;
use crate::math::easing::Easing;
use crate::spatial::density::{DensityField, DensityMode, DensitySource};
use crate::spatial::stipple::Stipple;
use clap::Parser;
use image::RgbaImage;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;

// Light gray so cell boundaries stay behind the dots visually
const EDGE_COLOR: [u8; 4] = [200, 200, 200, 255];

#[derive(Parser)]
#[command(name = "stippler")]
#[command(
    author,
    version,
    about = "Render images as weighted Voronoi stipple drawings"
)]
/// Command-line arguments for the stippling tool
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Image to stipple
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Second image to morph the stippling into
    #[arg(short, long, value_name = "IMAGE")]
    pub target: Option<PathBuf>,

    /// Random seed for reproducible stippling
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum relaxation iterations
    #[arg(short, long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub iterations: usize,

    /// Initial number of stipples
    #[arg(short, long, default_value_t = DEFAULT_INITIAL_POINTS)]
    pub points: usize,

    /// Dot diameter when adaptive sizing is disabled
    #[arg(long, default_value_t = DEFAULT_POINT_SIZE)]
    pub point_size: f32,

    /// Smallest adaptive dot diameter
    #[arg(long, default_value_t = DEFAULT_POINT_SIZE_MIN)]
    pub min_size: f32,

    /// Largest adaptive dot diameter
    #[arg(long, default_value_t = DEFAULT_POINT_SIZE_MAX)]
    pub max_size: f32,

    /// Use the fixed point size for every dot
    #[arg(long)]
    pub fixed_size: bool,

    /// Width of the band between delete and split thresholds
    #[arg(long, default_value_t = DEFAULT_HYSTERESIS)]
    pub hysteresis: f32,

    /// Grayscale, per-channel color or light-on-dark stippling
    #[arg(short, long, value_enum, default_value_t = DensityMode::Grayscale)]
    pub mode: DensityMode,

    /// Fill the area the stippling leaves empty with gray dots and animate them in
    #[arg(long)]
    pub fill: bool,

    /// Draw Voronoi cell boundaries under the dots
    #[arg(short, long)]
    pub edges: bool,

    /// Record every iteration as an animated GIF
    #[arg(short, long)]
    pub visualize: bool,

    /// Frames in the transition to the target image
    #[arg(short, long, default_value_t = DEFAULT_TRANSITION_FRAMES)]
    pub frames: usize,

    /// Farthest distance at which stipples are paired in a transition
    #[arg(long, default_value_t = DEFAULT_MATCH_DISTANCE)]
    pub match_distance: f32,

    /// Progress curve of the transition
    #[arg(long, value_enum, default_value_t = Easing::SmoothStep)]
    pub easing: Easing,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Engine configuration described by the flags
    pub fn stipple_config(&self) -> StippleConfig {
        StippleConfig {
            initial_points: self.points,
            point_size: self.point_size,
            point_size_min: self.min_size,
            point_size_max: self.max_size,
            adaptive_point_size: !self.fixed_size,
            hysteresis: self.hysteresis,
            max_iterations: self.iterations,
            mode: self.mode,
            seed: self.seed,
            record_edges: self.edges,
            ..StippleConfig::default()
        }
    }

    /// Transition configuration described by the flags
    pub const fn transition_config(&self) -> TransitionConfig {
        TransitionConfig {
            frames: self.frames,
            match_distance: self.match_distance,
            easing: self.easing,
        }
    }
}

/// Runs the stippling pipeline for one image and writes its outputs
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Stipple the input image and write every requested output
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - An input image cannot be loaded or is empty
    /// - An output file cannot be written
    pub fn process(&mut self) -> Result<()> {
        let start_time = Instant::now();
        let config = self.cli.stipple_config();
        config.validate()?;
        let transition_config = self.cli.transition_config();
        transition_config.validate()?;

        let image = load_image(&self.cli.image)?;
        let (width, height) = image.dimensions();

        let surface = Surface::from(config.mode);
        let mut capture = self.cli.visualize.then(|| {
            VisualizationCapture::new(width, height, config.max_iterations).on_surface(surface)
        });

        let mut layers = Vec::new();
        let mut finished: Vec<Stipple> = Vec::new();
        for (layer, source) in config.mode.sources().into_iter().enumerate() {
            let field = DensityField::from_rgba(&image, source)?;
            let layer_config = StippleConfig {
                seed: config.seed.wrapping_add(layer as u64),
                ..config.clone()
            };
            let mut stippler = Stippler::new(field, layer_config)?;
            let stipples = self.relax_layer(&mut stippler, source, &finished, capture.as_mut());
            finished.extend(stipples.iter().cloned());
            layers.push((source, stippler, stipples));
        }

        let mut drawn = if self.cli.fill {
            let fill_seed = config.seed.wrapping_add(layers.len() as u64);
            self.fill(&image, &finished, fill_seed, surface)?
        } else {
            Vec::new()
        };
        drawn.extend(finished.iter().cloned());

        let canvas = if self.cli.edges {
            render_with_edges(&drawn, width, height, surface)
        } else {
            render_stipples_on(&drawn, width, height, surface)
        };
        save_png(&canvas, &Self::get_output_path(&self.cli.image, OUTPUT_SUFFIX, "png"))?;

        if let Some(capture) = &capture {
            capture.export_gif(
                &Self::get_output_path(&self.cli.image, ITERATIONS_SUFFIX, "gif"),
                GIF_ITERATION_DELAY_MS,
            )?;
        }

        if let Some(target_path) = self.cli.target.clone() {
            let target = load_image(&target_path)?;
            self.morph(&target, layers, &finished, &transition_config, surface)?;
        }

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        log::info!(
            "stippled {} with {} dots in {:.2?}",
            self.cli.image.display(),
            finished.len(),
            start_time.elapsed()
        );
        Ok(())
    }

    fn relax_layer(
        &mut self,
        stippler: &mut Stippler,
        source: DensitySource,
        earlier_layers: &[Stipple],
        mut capture: Option<&mut VisualizationCapture>,
    ) -> Vec<Stipple> {
        let stage = self
            .progress_manager
            .as_mut()
            .map(|pm| pm.start_stage(&layer_label(source), stippler.config().max_iterations));

        let initial = stippler.init_stipples();
        let progress = self.progress_manager.as_ref();
        let outcome = stippler.run_with(initial, |report, stipples| {
            if let (Some(pm), Some(stage)) = (progress, stage) {
                pm.update(stage, report.iteration + 1, stipples.len());
            }
            if let Some(capture) = capture.as_deref_mut() {
                let mut frame = earlier_layers.to_vec();
                frame.extend_from_slice(stipples);
                capture.capture(&frame);
            }
            ControlFlow::Continue(())
        });

        if let (Some(pm), Some(stage)) = (progress, stage) {
            let status = if outcome.converged {
                "converged"
            } else {
                "iteration budget reached"
            };
            pm.complete(stage, status);
        }

        outcome.stipples
    }

    // Stipple the blank area around `foreground` and write the fill animation
    fn fill(
        &mut self,
        image: &RgbaImage,
        foreground: &[Stipple],
        seed: u64,
        surface: Surface,
    ) -> Result<Vec<Stipple>> {
        let source = if self.cli.mode == DensityMode::Inverse {
            DensitySource::Inverted
        } else {
            DensitySource::Luminance
        };
        let field = DensityField::from_rgba(image, source)?;
        let config = StippleConfig {
            seed,
            ..self.cli.stipple_config()
        };
        let mut stippler = Stippler::new(field, config)?;
        let outcome = stippler.fill(foreground, FILL_INK);
        log::debug!(
            "fill settled {} dots in {} iterations",
            outcome.stipples.len(),
            outcome.iterations
        );

        let mut filled = outcome.stipples.clone();
        filled.extend_from_slice(foreground);
        let transition = begin_transition(foreground, &filled, &self.cli.transition_config())?;
        let (width, height) = image.dimensions();
        self.export_transition(transition, width, height, surface, FILL_SUFFIX)?;

        Ok(outcome.stipples)
    }

    fn morph(
        &mut self,
        target: &RgbaImage,
        layers: Vec<(DensitySource, Stippler, Vec<Stipple>)>,
        old: &[Stipple],
        transition_config: &TransitionConfig,
        surface: Surface,
    ) -> Result<()> {
        let mut new = Vec::with_capacity(old.len());
        for (source, mut stippler, stipples) in layers {
            let target_field = DensityField::from_rgba(target, source)?;
            let outcome = stippler.morph_to(stipples, &target_field);
            log::debug!(
                "{} layer re-converged in {} iterations",
                layer_label(source),
                outcome.iterations
            );
            new.extend(outcome.stipples);
        }

        let (width, height) = target.dimensions();
        let transition = begin_transition(old, &new, transition_config)?;
        self.export_transition(transition, width, height, surface, TRANSITION_SUFFIX)
    }

    fn export_transition(
        &mut self,
        mut transition: Transition,
        width: u32,
        height: u32,
        surface: Surface,
        suffix: &str,
    ) -> Result<()> {
        let stage = self
            .progress_manager
            .as_mut()
            .map(|pm| pm.start_stage(suffix.trim_start_matches('_'), transition.frames()));
        let mut capture =
            VisualizationCapture::new(width, height, transition.frames() + 1).on_surface(surface);
        capture.capture(&transition.frame_at(0.0));
        while !transition.is_finished() {
            let frame = transition.advance_frame();
            if let (Some(pm), Some(stage)) = (self.progress_manager.as_ref(), stage) {
                pm.update(stage, transition.frame(), frame.len());
            }
            capture.capture(&frame);
        }
        if let (Some(pm), Some(stage)) = (self.progress_manager.as_ref(), stage) {
            pm.complete(stage, "done");
        }

        capture.export_gif(
            &Self::get_output_path(&self.cli.image, suffix, "gif"),
            GIF_FRAME_DELAY_MS,
        )
    }

    fn get_output_path(input_path: &Path, suffix: &str, extension: &str) -> PathBuf {
        let stem = input_path.file_stem().unwrap_or_default();
        let output_name = format!("{}{suffix}.{extension}", stem.to_string_lossy());

        if let Some(parent) = input_path.parent() {
            parent.join(output_name)
        } else {
            PathBuf::from(output_name)
        }
    }
}

fn render_with_edges(
    stipples: &[Stipple],
    width: u32,
    height: u32,
    surface: Surface,
) -> RgbaImage {
    let mut canvas = render_stipples_on(&[], width, height, surface);
    draw_cell_edges(&mut canvas, stipples, EDGE_COLOR);
    render_stipples_over(&mut canvas, stipples, surface);
    canvas
}

fn layer_label(source: DensitySource) -> String {
    match source {
        DensitySource::Luminance => "grayscale".to_string(),
        DensitySource::Channel(channel) => format!("{channel:?}").to_lowercase(),
        DensitySource::Inverted => "inverse".to_string(),
    }
}
