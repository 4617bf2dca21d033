//! Voronoi tessellation of stipple positions rasterized into an index map
//!
//! The diagram comes from the Delaunay triangulation of the stipples: each
//! cell is the image rectangle clipped by the bisectors to its Delaunay
//! neighbors. Cells are fanned into triangles and scan-converted row by row,
//! then every pixel is settled by a greedy walk over Delaunay neighbors so that
//! `owner(p) = argmin_i |p - site_i|` holds exactly, ties going to the lowest
//! index.

use bitvec::prelude::*;
use rayon::prelude::*;
use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::io::error::{Result, StippleError};
use crate::math::Point;
use crate::math::polygon::{ConvexPolygon, Rect, Triangle};
use crate::spatial::index_map::{IndexMap, UNOWNED};

/// Voronoi diagram of one stipple set over one image rectangle
#[derive(Debug, Clone)]
pub struct Tessellation {
    map: IndexMap,
    polygons: Vec<ConvexPolygon>,
    neighbors: Vec<Vec<u32>>,
    collapsed: Vec<u32>,
}

impl Tessellation {
    /// Per-pixel ownership raster
    pub const fn index_map(&self) -> &IndexMap {
        &self.map
    }

    /// Number of stipples tessellated
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    /// Whether no stipples were tessellated
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Cell polygon of stipple `index`, clipped to the pixel area
    ///
    /// Stipples sharing a position with a lower-indexed stipple have an empty polygon.
    pub fn polygon(&self, index: usize) -> Option<&ConvexPolygon> {
        self.polygons.get(index)
    }

    /// Boundary segments of the cell of stipple `index`
    pub fn cell_edges(&self, index: usize) -> Vec<[Point; 2]> {
        self.polygons
            .get(index)
            .map(ConvexPolygon::edges)
            .unwrap_or_default()
    }

    /// Delaunay neighbors of stipple `index`
    pub fn neighbors(&self, index: usize) -> &[u32] {
        self.neighbors.get(index).map_or(&[], Vec::as_slice)
    }

    /// Stipples whose cell collapsed because an earlier stipple shares their position
    pub fn collapsed(&self) -> &[u32] {
        &self.collapsed
    }
}

/// Compute the Voronoi diagram of `positions` over a `width` x `height` image
///
/// A single stipple skips triangulation and owns the whole image.
///
/// # Errors
///
/// Returns `DegenerateInput` if `positions` is empty
pub fn tessellate(positions: &[Point], width: usize, height: usize) -> Result<Tessellation> {
    if positions.is_empty() {
        return Err(StippleError::DegenerateInput { stipple_count: 0 });
    }

    let area = Rect::pixel_area(width, height);
    let sites: Vec<Point> = positions
        .iter()
        .map(|&p| if p.is_finite() { p } else { area.min })
        .collect();

    if let [_] = sites.as_slice() {
        return Ok(Tessellation {
            map: IndexMap::filled(width, height, 1, 0),
            polygons: vec![ConvexPolygon::from_rect(&area)],
            neighbors: vec![Vec::new()],
            collapsed: Vec::new(),
        });
    }

    let (representative, neighbors) = triangulate(&sites);

    let collapsed: Vec<u32> = representative
        .iter_zeros()
        .map(|index| index as u32)
        .collect();

    let polygons: Vec<ConvexPolygon> = (0..sites.len())
        .into_par_iter()
        .map(|index| {
            if representative.get(index).as_deref() != Some(&true) {
                return ConvexPolygon::default();
            }
            clip_cell(index, &sites, &neighbors, &area)
        })
        .collect();

    let mut map = IndexMap::new(width, height, sites.len());
    rasterize(&polygons, &mut map);

    let fallback = representative.first_one().unwrap_or(0) as u32;
    settle_ownership(&mut map, &sites, &neighbors, fallback);
    debug_assert!(map.is_total());

    Ok(Tessellation {
        map,
        polygons,
        neighbors,
        collapsed,
    })
}

/// Delaunay triangulation of the sites
///
/// Returns which sites own a vertex (the first stipple at each distinct
/// position) and the Delaunay neighbors of every site.
fn triangulate(sites: &[Point]) -> (BitVec, Vec<Vec<u32>>) {
    let mut triangulation: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();
    let mut representative = bitvec![0; sites.len()];
    let mut vertex_owner: Vec<u32> = Vec::with_capacity(sites.len());

    for (index, site) in sites.iter().enumerate() {
        match triangulation.insert(Point2::new(f64::from(site.x), f64::from(site.y))) {
            Ok(handle) if handle.index() >= vertex_owner.len() => {
                vertex_owner.push(index as u32);
                representative.set(index, true);
            }
            Ok(_) => {
                log::trace!("stipple {index} coincides with an earlier stipple");
            }
            Err(error) => {
                log::trace!("stipple {index} rejected by triangulation: {error:?}");
            }
        }
    }

    let mut neighbors = vec![Vec::new(); sites.len()];
    for vertex in triangulation.vertices() {
        let Some(&owner) = vertex_owner.get(vertex.fix().index()) else {
            continue;
        };
        let adjacent: Vec<u32> = vertex
            .out_edges()
            .filter_map(|edge| vertex_owner.get(edge.to().fix().index()).copied())
            .collect();
        if let Some(slot) = neighbors.get_mut(owner as usize) {
            *slot = adjacent;
        }
    }

    (representative, neighbors)
}

fn clip_cell(index: usize, sites: &[Point], neighbors: &[Vec<u32>], area: &Rect) -> ConvexPolygon {
    let Some(&site) = sites.get(index) else {
        return ConvexPolygon::default();
    };
    let adjacent = neighbors.get(index).map_or(&[][..], Vec::as_slice);

    let mut polygon = ConvexPolygon::from_rect(area);
    for &other in adjacent {
        if polygon.is_empty() {
            break;
        }
        if let Some(&other_site) = sites.get(other as usize) {
            polygon = polygon.clip_to_bisector(site, other_site);
        }
    }
    polygon
}

struct ScanTriangle {
    owner: u32,
    triangle: Triangle,
    min_x: f32,
    max_x: f32,
}

/// Scan-convert every cell's triangle fan into the map
///
/// Triangles are bucketed by the rows they span, in owner order, so the
/// first claim on a pixel comes from the lowest-indexed cell containing it.
fn rasterize(polygons: &[ConvexPolygon], map: &mut IndexMap) {
    let (width, height) = (map.width(), map.height());
    if width == 0 || height == 0 {
        return;
    }

    let mut triangles: Vec<ScanTriangle> = Vec::new();
    let mut row_buckets: Vec<Vec<u32>> = vec![Vec::new(); height];

    for (owner, polygon) in polygons.iter().enumerate() {
        for triangle in polygon.fan() {
            let (lo, hi) = triangle.bounds();
            if hi.y < 0.0 || lo.y > (height - 1) as f32 {
                continue;
            }
            let id = triangles.len() as u32;
            let first_row = lo.y.ceil().max(0.0) as usize;
            let last_row = (hi.y.floor().max(0.0) as usize).min(height - 1);
            for bucket in row_buckets.iter_mut().take(last_row + 1).skip(first_row) {
                bucket.push(id);
            }
            triangles.push(ScanTriangle {
                owner: owner as u32,
                triangle,
                min_x: lo.x,
                max_x: hi.x,
            });
        }
    }

    map.as_mut_slice()
        .par_chunks_mut(width)
        .zip(row_buckets.par_iter())
        .enumerate()
        .for_each(|(y, (row, bucket))| {
            for &id in bucket {
                let Some(scan) = triangles.get(id as usize) else {
                    continue;
                };
                if scan.max_x < 0.0 {
                    continue;
                }
                let first = scan.min_x.ceil().max(0.0) as usize;
                let last = (scan.max_x.floor().max(0.0) as usize).min(width - 1);
                for x in first..=last {
                    let Some(slot) = row.get_mut(x) else {
                        break;
                    };
                    if *slot == UNOWNED
                        && scan.triangle.contains(Point::new(x as f32, y as f32))
                    {
                        *slot = scan.owner;
                    }
                }
            }
        });
}

/// Replace every pixel's owner by its exact nearest site
///
/// Starting from the rasterized owner (or the previous pixel's owner when the
/// scan missed it), a greedy walk over Delaunay neighbors descends to the
/// nearest site.
fn settle_ownership(map: &mut IndexMap, sites: &[Point], neighbors: &[Vec<u32>], fallback: u32) {
    let width = map.width();
    if width == 0 {
        return;
    }

    map.as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let mut previous = fallback;
            for (x, slot) in row.iter_mut().enumerate() {
                let start = if *slot == UNOWNED { previous } else { *slot };
                let pixel = (x as f64, y as f64);
                let owner = nearest_site(start, pixel, sites, neighbors);
                *slot = owner;
                previous = owner;
            }
        });
}

fn nearest_site(start: u32, pixel: (f64, f64), sites: &[Point], neighbors: &[Vec<u32>]) -> u32 {
    let distance = |index: u32| {
        sites.get(index as usize).map_or(f64::INFINITY, |site| {
            let dx = f64::from(site.x) - pixel.0;
            let dy = f64::from(site.y) - pixel.1;
            dx.mul_add(dx, dy * dy)
        })
    };

    let mut best = start;
    let mut best_distance = distance(start);
    loop {
        let current = best;
        for &candidate in neighbors.get(current as usize).map_or(&[][..], Vec::as_slice) {
            let candidate_distance = distance(candidate);
            if candidate_distance < best_distance
                || (candidate_distance == best_distance && candidate < best)
            {
                best = candidate;
                best_distance = candidate_distance;
            }
        }
        if best == current {
            return best;
        }
    }
}
