/// Command-line host
pub mod cli;
/// Engine constants and defaults
pub mod configuration;
/// Error types
pub mod error;
/// Image loading, stipple rendering and PNG export
pub mod image;
/// Terminal progress bars
pub mod progress;
/// GIF capture of runs and transitions
pub mod visualization;
