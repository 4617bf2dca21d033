//! Engine constants and runtime configuration defaults

// Default values for configurable parameters
/// Fixed seed for reproducible stippling
pub const DEFAULT_SEED: u64 = 42;

/// Default iteration budget for a convergence run
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Number of stipples sampled before the first iteration
pub const DEFAULT_INITIAL_POINTS: usize = 100;

/// Dot diameter in pixels when adaptive sizing is off
pub const DEFAULT_POINT_SIZE: f32 = 2.0;

/// Smallest adaptive dot diameter in pixels
pub const DEFAULT_POINT_SIZE_MIN: f32 = 2.0;

/// Largest adaptive dot diameter in pixels
pub const DEFAULT_POINT_SIZE_MAX: f32 = 4.0;

/// Width of the band between the delete and split thresholds
pub const DEFAULT_HYSTERESIS: f32 = 0.6;

/// Hysteresis growth per iteration, widening the band so runs settle
pub const DEFAULT_HYSTERESIS_DELTA: f32 = 0.01;

/// Total displacement (pixels) under which positions count as stable
pub const DEFAULT_DISPLACEMENT_TOLERANCE: f32 = 0.5;

/// Per-frame movement cap (pixels) for stipples in animation mode
pub const DEFAULT_ANIMATION_SPEED: f32 = 1.5;

// Split placement
/// Jitter amplitude as a fraction of the split cell's equivalent radius
pub const SPLIT_JITTER_FRACTION: f32 = 0.01;

/// Children sit this fraction of the equivalent radius from the centroid
pub const SPLIT_OFFSET_FRACTION: f32 = 0.5;

// Initial sampling
/// Rejection-sampling attempts allowed per requested stipple
pub const SAMPLING_ATTEMPTS_PER_POINT: usize = 64;

// Parallel accumulation
/// Rows per accumulation band, fixed so float summation order never depends on thread count
pub const ACCUMULATION_BAND_ROWS: usize = 16;

// Transitions
/// Frames in a transition between two stipple sets
pub const DEFAULT_TRANSITION_FRAMES: usize = 30;

/// Farthest distance (pixels) at which an old stipple may match a new one
pub const DEFAULT_MATCH_DISTANCE: f32 = 20.0;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed image dimension
pub const MAX_IMAGE_DIMENSION: usize = 16_384;

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

// Output settings
/// Suffix added to stippled output filenames
pub const OUTPUT_SUFFIX: &str = "_stippled";
/// Suffix for the iteration animation
pub const ITERATIONS_SUFFIX: &str = "_iterations";
/// Suffix for the transition animation
pub const TRANSITION_SUFFIX: &str = "_transition";
/// Suffix for the fill animation
pub const FILL_SUFFIX: &str = "_fill";
/// Delay between GIF frames of the iteration animation
pub const GIF_ITERATION_DELAY_MS: u32 = 120;
/// Delay between GIF frames of a transition
pub const GIF_FRAME_DELAY_MS: u32 = 20;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 20;
/// Canvas color behind rendered stipples
pub const BACKGROUND_COLOR: [u8; 4] = [255, 255, 255, 255];
/// Canvas color behind light-on-dark stipples
pub const INVERSE_BACKGROUND_COLOR: [u8; 4] = [0, 0, 0, 255];
/// Ink of the stipples filling the area the foreground leaves empty
pub const FILL_INK: [u8; 4] = [150, 150, 150, 255];
