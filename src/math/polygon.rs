//! Convex polygon clipping and triangle scan tests for Voronoi cell rasterization

use crate::math::vector::{Point, PointExt};

// Edge-function slack so pixels lying exactly on a shared cell edge are
// claimed by both neighbours and resolved by index order
const INSIDE_TOLERANCE: f32 = 1e-4;

// Vertices closer than this are merged after clipping
const VERTEX_MERGE_DISTANCE_SQUARED: f32 = 1e-10;

/// Axis-aligned rectangle in image space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner (inclusive)
    pub min: Point,
    /// Maximum corner (inclusive)
    pub max: Point,
}

impl Rect {
    /// Create a rectangle from its corners
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Rectangle spanning every pixel sample of a `width` x `height` image
    pub fn from_image_size(width: usize, height: usize) -> Self {
        Self {
            min: Point::ZERO,
            max: Point::new(
                width.saturating_sub(1) as f32,
                height.saturating_sub(1) as f32,
            ),
        }
    }

    /// Rectangle covering the full area of every pixel, half a pixel beyond the samples
    pub fn pixel_area(width: usize, height: usize) -> Self {
        Self {
            min: Point::new(-0.5, -0.5),
            max: Point::new(width as f32 - 0.5, height as f32 - 0.5),
        }
    }

    /// Whether `point` lies inside or on the border
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Nearest point inside the rectangle
    pub fn clamp(&self, point: Point) -> Point {
        point.clamp(self.min, self.max)
    }

    /// Width of the rectangle
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the rectangle
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Triangle produced by fanning a convex polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Fan apex
    pub a: Point,
    /// Second vertex
    pub b: Point,
    /// Third vertex
    pub c: Point,
}

impl Triangle {
    /// Point-in-triangle test, inclusive of the edges and independent of winding
    pub fn contains(&self, p: Point) -> bool {
        let d1 = (self.b - self.a).cross(p - self.a);
        let d2 = (self.c - self.b).cross(p - self.b);
        let d3 = (self.a - self.c).cross(p - self.c);

        let has_negative = d1 < -INSIDE_TOLERANCE || d2 < -INSIDE_TOLERANCE || d3 < -INSIDE_TOLERANCE;
        let has_positive = d1 > INSIDE_TOLERANCE || d2 > INSIDE_TOLERANCE || d3 > INSIDE_TOLERANCE;

        !(has_negative && has_positive)
    }

    /// Componentwise minimum and maximum of the three vertices
    pub fn bounds(&self) -> (Point, Point) {
        (
            Point::new(
                self.a.x.min(self.b.x).min(self.c.x),
                self.a.y.min(self.b.y).min(self.c.y),
            ),
            Point::new(
                self.a.x.max(self.b.x).max(self.c.x),
                self.a.y.max(self.b.y).max(self.c.y),
            ),
        )
    }
}

/// Convex polygon stored as an ordered vertex ring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvexPolygon {
    vertices: Vec<Point>,
}

impl ConvexPolygon {
    /// Polygon covering a rectangle, wound counter-clockwise in y-up terms
    pub fn from_rect(rect: &Rect) -> Self {
        Self {
            vertices: vec![
                rect.min,
                Point::new(rect.max.x, rect.min.y),
                rect.max,
                Point::new(rect.min.x, rect.max.y),
            ],
        }
    }

    /// Ordered vertex ring
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Fewer than three vertices enclose no area
    pub fn is_empty(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Keep the part of the polygon closer to `site` than to `other`
    ///
    /// The bisector test is evaluated relative to `site` so large image
    /// coordinates do not cost precision.
    pub fn clip_to_bisector(&self, site: Point, other: Point) -> Self {
        let normal = other - site;
        let offset = 0.5 * normal.length_squared();
        if offset <= 0.0 {
            return self.clone();
        }
        self.clip_half_plane(|v| normal.dot(v - site) - offset)
    }

    /// Sutherland-Hodgman clip against the region where `signed_distance <= 0`
    fn clip_half_plane<F>(&self, signed_distance: F) -> Self
    where
        F: Fn(Point) -> f32,
    {
        let count = self.vertices.len();
        let mut clipped: Vec<Point> = Vec::with_capacity(count + 1);

        for (i, &current) in self.vertices.iter().enumerate() {
            let next = self.vertices.get((i + 1) % count).copied().unwrap_or(current);
            let d_current = signed_distance(current);
            let d_next = signed_distance(next);

            if d_current <= 0.0 {
                push_distinct(&mut clipped, current);
            }
            if (d_current <= 0.0) != (d_next <= 0.0) {
                let t = d_current / (d_current - d_next);
                push_distinct(&mut clipped, current.lerp(next, t));
            }
        }

        if clipped.len() > 1 {
            let first = clipped.first().copied();
            let last = clipped.last().copied();
            if let (Some(first), Some(last)) = (first, last) {
                if first.distance_squared(last) <= VERTEX_MERGE_DISTANCE_SQUARED {
                    clipped.pop();
                }
            }
        }

        Self { vertices: clipped }
    }

    /// Boundary segments in ring order
    pub fn edges(&self) -> Vec<[Point; 2]> {
        if self.is_empty() {
            return Vec::new();
        }
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .map(|(&from, &to)| [from, to])
            .collect()
    }

    /// Triangle fan rooted at the first vertex
    pub fn fan(&self) -> impl Iterator<Item = Triangle> + '_ {
        let apex = self.vertices.first().copied().unwrap_or_default();
        self.vertices
            .windows(2)
            .skip(1)
            .map(move |pair| Triangle {
                a: apex,
                b: pair.first().copied().unwrap_or(apex),
                c: pair.get(1).copied().unwrap_or(apex),
            })
    }
}

fn push_distinct(vertices: &mut Vec<Point>, point: Point) {
    if vertices
        .last()
        .is_none_or(|last| last.distance_squared(point) > VERTEX_MERGE_DISTANCE_SQUARED)
    {
        vertices.push(point);
    }
}
