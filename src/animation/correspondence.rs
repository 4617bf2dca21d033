//! Greedy nearest-position matching between two stipple sets
//!
//! New stipples are visited in index order; each claims the nearest old
//! stipple of the same ink that is still unmatched and within the distance
//! threshold. Equal distances go to the lowest old index.

use bitvec::prelude::*;

use crate::spatial::neighbors::NeighborGrid;
use crate::spatial::stipple::Stipple;

/// Index correspondence from an old stipple set to a new one
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Correspondence {
    pairs: Vec<(u32, u32)>,
    unmatched_old: Vec<u32>,
    unmatched_new: Vec<u32>,
    old_count: usize,
    new_count: usize,
}

impl Correspondence {
    /// Matched `(old, new)` index pairs, in new-index order
    pub fn pairs(&self) -> &[(u32, u32)] {
        &self.pairs
    }

    /// Old stipples with no partner; they shrink and vanish
    pub fn unmatched_old(&self) -> &[u32] {
        &self.unmatched_old
    }

    /// New stipples with no partner; they grow in place
    pub fn unmatched_new(&self) -> &[u32] {
        &self.unmatched_new
    }

    /// For every old index, the new index it animates to
    pub fn old_to_new(&self) -> Vec<Option<u32>> {
        let mut map = vec![None; self.old_count];
        for &(old, new) in &self.pairs {
            if let Some(slot) = map.get_mut(old as usize) {
                *slot = Some(new);
            }
        }
        map
    }

    /// For every new index, the old index it animates from
    pub fn new_to_old(&self) -> Vec<Option<u32>> {
        let mut map = vec![None; self.new_count];
        for &(old, new) in &self.pairs {
            if let Some(slot) = map.get_mut(new as usize) {
                *slot = Some(old);
            }
        }
        map
    }
}

/// Match `new` stipples to `old` stipples no farther than `max_distance` apart
///
/// An infinite `max_distance` scans every old stipple; a finite one queries a
/// bucket grid. Each old stipple is used at most once.
pub fn match_stipples(old: &[Stipple], new: &[Stipple], max_distance: f32) -> Correspondence {
    let mut matched = bitvec![0; old.len()];
    let mut pairs = Vec::new();
    let mut unmatched_new = Vec::new();

    let limit_squared = if max_distance.is_nan() || max_distance < 0.0 {
        -1.0
    } else {
        max_distance * max_distance
    };
    let grid = max_distance.is_finite().then(|| {
        let positions: Vec<_> = old.iter().map(|s| s.position).collect();
        NeighborGrid::build(&positions, max_distance.max(1.0))
    });

    for (new_index, target) in new.iter().enumerate() {
        let candidates: Vec<u32> = grid.as_ref().map_or_else(
            || (0..old.len() as u32).collect(),
            |grid| grid.candidates(target.position, max_distance),
        );

        let mut best: Option<(f32, u32)> = None;
        for old_index in candidates {
            if matched.get(old_index as usize).as_deref() != Some(&false) {
                continue;
            }
            let Some(source) = old.get(old_index as usize) else {
                continue;
            };
            if source.color != target.color {
                continue;
            }
            let distance = source.position.distance_squared(target.position);
            if distance > limit_squared || distance.is_nan() {
                continue;
            }
            let closer = best.is_none_or(|(best_distance, best_index)| {
                distance < best_distance || (distance <= best_distance && old_index < best_index)
            });
            if closer {
                best = Some((distance, old_index));
            }
        }

        match best {
            Some((_, old_index)) => {
                matched.set(old_index as usize, true);
                pairs.push((old_index, new_index as u32));
            }
            None => unmatched_new.push(new_index as u32),
        }
    }

    let unmatched_old = matched.iter_zeros().map(|index| index as u32).collect();

    Correspondence {
        pairs,
        unmatched_old,
        unmatched_new,
        old_count: old.len(),
        new_count: new.len(),
    }
}
