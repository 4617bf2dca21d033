/// Per-cell density and moment integration
pub mod accumulator;
/// Seeded randomness for sampling and split jitter
pub mod jitter;
/// Lloyd relaxation with split and delete population control
pub mod relaxation;
/// Convergence driver and host-facing operations
pub mod stippler;
/// Voronoi tessellation rasterized into an index map
pub mod voronoi;
