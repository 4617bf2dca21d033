//! Per-pixel ownership raster
//!
//! The index map replaces explicit cell polygons during accumulation: every
//! pixel stores the index of the stipple whose Voronoi cell contains it.

/// Marker for a pixel not yet claimed during rasterization
pub const UNOWNED: u32 = u32::MAX;

/// Width x height grid of owner indices stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    width: usize,
    height: usize,
    count: usize,
    data: Vec<u32>,
}

impl IndexMap {
    /// Create a map where every pixel is unowned
    pub fn new(width: usize, height: usize, count: usize) -> Self {
        Self {
            width,
            height,
            count,
            data: vec![UNOWNED; width * height],
        }
    }

    /// Create a map where a single owner claims every pixel
    pub fn filled(width: usize, height: usize, count: usize, owner: u32) -> Self {
        Self {
            width,
            height,
            count,
            data: vec![owner; width * height],
        }
    }

    /// Width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of owners (stipples) the map was built for
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Owner of pixel `(x, y)`, `None` outside the map
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Assign pixel `(x, y)`, ignoring coordinates outside the map
    pub fn set(&mut self, x: usize, y: usize, owner: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        if let Some(slot) = self.data.get_mut(y * self.width + x) {
            *slot = owner;
        }
    }

    /// Row-major owner slice
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    /// Mutable row-major owner slice, for row-parallel rasterization
    pub fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.data
    }

    /// Whether every pixel has an owner in `[0, count)`
    pub fn is_total(&self) -> bool {
        self.data.iter().all(|&o| (o as usize) < self.count)
    }

    /// Pixel count per owner
    pub fn areas(&self) -> Vec<usize> {
        let mut areas = vec![0; self.count];
        for &owner in &self.data {
            if let Some(area) = areas.get_mut(owner as usize) {
                *area += 1;
            }
        }
        areas
    }
}
