//! Uniform bucket grid for fixed-radius neighbor queries

use crate::math::Point;

// Caps the bucket count per axis for tiny radii over large extents
const MAX_BUCKETS_PER_AXIS: usize = 1024;

/// Buckets point indices by position so radius queries touch few points
#[derive(Debug, Clone)]
pub struct NeighborGrid {
    origin: Point,
    cell_size: f32,
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<u32>>,
}

impl NeighborGrid {
    /// Bucket `points` into square cells of at least `cell_size`
    pub fn build(points: &[Point], cell_size: f32) -> Self {
        let finite = points.iter().filter(|p| p.is_finite());
        let (min, max) = finite.fold(
            (
                Point::new(f32::INFINITY, f32::INFINITY),
                Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
            ),
            |(min, max), p| {
                (
                    Point::new(min.x.min(p.x), min.y.min(p.y)),
                    Point::new(max.x.max(p.x), max.y.max(p.y)),
                )
            },
        );

        if min.x > max.x {
            return Self {
                origin: Point::ZERO,
                cell_size: 1.0,
                cols: 0,
                rows: 0,
                buckets: Vec::new(),
            };
        }

        let extent = (max.x - min.x).max(max.y - min.y);
        let cell_size = cell_size
            .max(extent / MAX_BUCKETS_PER_AXIS as f32)
            .max(f32::EPSILON);
        let cols = ((max.x - min.x) / cell_size) as usize + 1;
        let rows = ((max.y - min.y) / cell_size) as usize + 1;

        let mut grid = Self {
            origin: min,
            cell_size,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
        };

        for (index, &point) in points.iter().enumerate() {
            if !point.is_finite() {
                continue;
            }
            let (col, row) = grid.bucket_of(point);
            if let Some(bucket) = grid.buckets.get_mut(row * cols + col) {
                bucket.push(index as u32);
            }
        }

        grid
    }

    fn bucket_of(&self, point: Point) -> (usize, usize) {
        let col = ((point.x - self.origin.x) / self.cell_size).floor();
        let row = ((point.y - self.origin.y) / self.cell_size).floor();
        (
            (col.max(0.0) as usize).min(self.cols.saturating_sub(1)),
            (row.max(0.0) as usize).min(self.rows.saturating_sub(1)),
        )
    }

    /// Indices of every point whose bucket intersects the square of half-size `radius` around `center`
    ///
    /// Candidates are a superset of the points within `radius`; callers filter by distance.
    pub fn candidates(&self, center: Point, radius: f32) -> Vec<u32> {
        if self.buckets.is_empty() || !center.is_finite() {
            return Vec::new();
        }

        let lo_col = ((center.x - radius - self.origin.x) / self.cell_size).floor();
        let hi_col = ((center.x + radius - self.origin.x) / self.cell_size).floor();
        let lo_row = ((center.y - radius - self.origin.y) / self.cell_size).floor();
        let hi_row = ((center.y + radius - self.origin.y) / self.cell_size).floor();

        if hi_col < 0.0 || hi_row < 0.0 || lo_col >= self.cols as f32 || lo_row >= self.rows as f32
        {
            return Vec::new();
        }

        let col_range = (lo_col.max(0.0) as usize)..=(hi_col as usize).min(self.cols - 1);
        let row_range = (lo_row.max(0.0) as usize)..=(hi_row as usize).min(self.rows - 1);

        let mut found = Vec::new();
        for row in row_range {
            for col in col_range.clone() {
                if let Some(bucket) = self.buckets.get(row * self.cols + col) {
                    found.extend_from_slice(bucket);
                }
            }
        }
        found
    }
}
