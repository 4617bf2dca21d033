//! Per-cell density and moment integration over an index map
//!
//! One pass over the map samples the density of every pixel and adds it to
//! the owning cell's raw moments. Rows are split into fixed bands processed in
//! parallel; each band keeps its own sparse accumulators which are merged in
//! band order, so the floating-point result is identical for any thread count.

use std::collections::HashMap;
use std::f32::consts::PI;

use rayon::prelude::*;

use crate::io::configuration::ACCUMULATION_BAND_ROWS;
use crate::math::Point;
use crate::spatial::density::DensityField;
use crate::spatial::index_map::IndexMap;

/// Density-weighted summary of one Voronoi cell for one iteration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    /// Density-weighted centroid, or the geometric centroid when the cell holds no ink
    pub centroid: Point,
    /// Principal axis angle in radians, in `(-pi/2, pi/2]`
    pub orientation: f32,
    /// Pixel count
    pub area: f32,
    /// Sum of the densities of the cell's pixels
    pub total_density: f32,
}

impl Cell {
    /// Whether the cell owns no pixels
    pub fn is_empty(&self) -> bool {
        self.area <= 0.0
    }

    /// Average density per pixel, zero for empty cells
    pub fn mean_density(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.total_density / self.area
        }
    }

    /// Radius of the disc with the same area as the cell
    pub fn equivalent_radius(&self) -> f32 {
        (self.area.max(0.0) / PI).sqrt()
    }
}

// Raw moments, density-weighted and geometric, accumulated in f64
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    moment00: f64,
    moment10: f64,
    moment01: f64,
    moment11: f64,
    moment20: f64,
    moment02: f64,
    pixels: f64,
    sum_x: f64,
    sum_y: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_xy: f64,
}

impl Moments {
    fn add_pixel(&mut self, x: f64, y: f64, density: f64) {
        self.moment00 += density;
        self.moment10 += x * density;
        self.moment01 += y * density;
        self.moment11 += x * y * density;
        self.moment20 += x * x * density;
        self.moment02 += y * y * density;
        self.pixels += 1.0;
        self.sum_x += x;
        self.sum_y += y;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_xy += x * y;
    }

    fn merge(&mut self, other: &Self) {
        self.moment00 += other.moment00;
        self.moment10 += other.moment10;
        self.moment01 += other.moment01;
        self.moment11 += other.moment11;
        self.moment20 += other.moment20;
        self.moment02 += other.moment02;
        self.pixels += other.pixels;
        self.sum_x += other.sum_x;
        self.sum_y += other.sum_y;
        self.sum_xx += other.sum_xx;
        self.sum_yy += other.sum_yy;
        self.sum_xy += other.sum_xy;
    }

    fn to_cell(&self) -> Cell {
        if self.pixels <= 0.0 {
            return Cell::default();
        }

        // Zero-ink cells fall back to their geometric moments
        let (weight, m10, m01, m11, m20, m02) = if self.moment00 > 0.0 {
            (
                self.moment00,
                self.moment10,
                self.moment01,
                self.moment11,
                self.moment20,
                self.moment02,
            )
        } else {
            (
                self.pixels,
                self.sum_x,
                self.sum_y,
                self.sum_xy,
                self.sum_xx,
                self.sum_yy,
            )
        };

        let cx = m10 / weight;
        let cy = m01 / weight;
        let mu20 = cx.mul_add(-cx, m20 / weight);
        let mu02 = cy.mul_add(-cy, m02 / weight);
        let mu11 = cx.mul_add(-cy, m11 / weight);
        let orientation = 0.5 * (2.0 * mu11).atan2(mu20 - mu02);

        Cell {
            centroid: Point::new(cx as f32, cy as f32),
            orientation: orientation as f32,
            area: self.pixels as f32,
            total_density: self.moment00 as f32,
        }
    }
}

/// Integrate `field` over every cell of `map`
///
/// Returns exactly `map.count()` cells, indexed like the stipples the map was
/// built from. `field` may be any density field of the map's size, which is
/// how cells are measured against an alternate image while keeping the
/// geometry of the current stipples.
pub fn accumulate(map: &IndexMap, field: &DensityField) -> Vec<Cell> {
    let width = map.width();
    let mut totals = vec![Moments::default(); map.count()];
    if width == 0 {
        return totals.iter().map(Moments::to_cell).collect();
    }

    let band_len = ACCUMULATION_BAND_ROWS * width;
    let partials: Vec<HashMap<u32, Moments>> = map
        .as_slice()
        .par_chunks(band_len)
        .enumerate()
        .map(|(band, owners)| {
            let first_row = band * ACCUMULATION_BAND_ROWS;
            let mut local: HashMap<u32, Moments> = HashMap::new();
            for (offset, &owner) in owners.iter().enumerate() {
                let x = offset % width;
                let y = first_row + offset / width;
                let density = f64::from(field.sample(x as i64, y as i64));
                local
                    .entry(owner)
                    .or_default()
                    .add_pixel(x as f64, y as f64, density);
            }
            local
        })
        .collect();

    for local in &partials {
        for (&owner, moments) in local {
            if let Some(total) = totals.get_mut(owner as usize) {
                total.merge(moments);
            }
        }
    }

    totals.iter().map(Moments::to_cell).collect()
}
