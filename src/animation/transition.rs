//! Frame-stepped transitions between two stipple sets

use crate::animation::correspondence::{Correspondence, match_stipples};
use crate::io::configuration::{DEFAULT_MATCH_DISTANCE, DEFAULT_TRANSITION_FRAMES};
use crate::io::error::{Result, invalid_parameter};
use crate::math::Point;
use crate::math::easing::Easing;
use crate::spatial::stipple::Stipple;

/// Parameters of a transition
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionConfig {
    /// Frames from the old set to the new one
    pub frames: usize,
    /// Farthest distance at which stipples are paired
    pub match_distance: f32,
    /// Progress curve
    pub easing: Easing,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            frames: DEFAULT_TRANSITION_FRAMES,
            match_distance: DEFAULT_MATCH_DISTANCE,
            easing: Easing::default(),
        }
    }
}

impl TransitionConfig {
    /// Check the transition parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the frame budget is zero or the match distance is
    /// negative or NaN
    pub fn validate(&self) -> Result<()> {
        if self.frames == 0 {
            return Err(invalid_parameter(
                "frames",
                &self.frames,
                &"a transition needs at least one frame",
            ));
        }
        if self.match_distance.is_nan() || self.match_distance < 0.0 {
            return Err(invalid_parameter(
                "match_distance",
                &self.match_distance,
                &"must be non-negative",
            ));
        }
        Ok(())
    }
}

/// How a track behaves over the transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Old stipple moving onto its new partner
    Matched,
    /// New stipple growing from nothing at its final position
    Appear,
    /// Old stipple shrinking away in place
    Vanish,
}

/// Start and end state of one animated dot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    /// Behavior of the track
    pub kind: TrackKind,
    /// Position at the first frame
    pub from_position: Point,
    /// Position at the last frame
    pub to_position: Point,
    /// Diameter at the first frame
    pub from_size: f32,
    /// Diameter at the last frame
    pub to_size: f32,
    /// Display color
    pub color: [u8; 4],
}

impl Track {
    fn at(&self, progress: f32) -> Stipple {
        if progress >= 1.0 {
            return Stipple::new(self.to_position, self.to_size, self.color);
        }
        let position = self.from_position.lerp(self.to_position, progress);
        let size = (self.to_size - self.from_size).mul_add(progress, self.from_size);
        Stipple::new(position, size.max(0.0), self.color)
    }
}

/// Handle on a running transition, advanced one frame per call
#[derive(Debug, Clone)]
pub struct Transition {
    tracks: Vec<Track>,
    correspondence: Correspondence,
    frames: usize,
    frame: usize,
    easing: Easing,
}

impl Transition {
    /// Animated dots; matched and appearing tracks come first in new-set order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Pairing the tracks were built from
    pub const fn correspondence(&self) -> &Correspondence {
        &self.correspondence
    }

    /// Frames emitted so far
    pub const fn frame(&self) -> usize {
        self.frame
    }

    /// Frame budget
    pub const fn frames(&self) -> usize {
        self.frames
    }

    /// Whether the last frame has been emitted
    pub const fn is_finished(&self) -> bool {
        self.frame >= self.frames
    }

    /// Stipples at linear progress `t` in `[0, 1]`, after easing
    ///
    /// Dots whose size has reached zero are left out, so the final frame is
    /// exactly the new stipple set.
    pub fn frame_at(&self, t: f32) -> Vec<Stipple> {
        let progress = self.easing.apply(t);
        self.tracks
            .iter()
            .map(|track| track.at(progress))
            .filter(|stipple| stipple.size > 0.0)
            .collect()
    }

    /// Advance one frame and return the intermediate stipples
    ///
    /// Once finished, keeps returning the final frame.
    pub fn advance_frame(&mut self) -> Vec<Stipple> {
        if self.frame < self.frames {
            self.frame += 1;
        }
        self.frame_at(self.frame as f32 / self.frames as f32)
    }
}

/// Pair `old` with `new` and prepare a transition between them
///
/// # Errors
///
/// Returns an error if the transition configuration is invalid
pub fn begin_transition(
    old: &[Stipple],
    new: &[Stipple],
    config: &TransitionConfig,
) -> Result<Transition> {
    config.validate()?;

    let correspondence = match_stipples(old, new, config.match_distance);
    let new_to_old = correspondence.new_to_old();

    let mut tracks: Vec<Track> = new
        .iter()
        .zip(&new_to_old)
        .map(|(target, partner)| {
            match partner.and_then(|index| old.get(index as usize)) {
                Some(source) => Track {
                    kind: TrackKind::Matched,
                    from_position: source.position,
                    to_position: target.position,
                    from_size: source.size,
                    to_size: target.size,
                    color: target.color,
                },
                None => Track {
                    kind: TrackKind::Appear,
                    from_position: target.position,
                    to_position: target.position,
                    from_size: 0.0,
                    to_size: target.size,
                    color: target.color,
                },
            }
        })
        .collect();

    tracks.extend(
        correspondence
            .unmatched_old()
            .iter()
            .filter_map(|&index| old.get(index as usize))
            .map(|source| Track {
                kind: TrackKind::Vanish,
                from_position: source.position,
                to_position: source.position,
                from_size: source.size,
                to_size: 0.0,
                color: source.color,
            }),
    );

    log::debug!(
        "transition over {} frames: {} matched, {} appearing, {} vanishing",
        config.frames,
        correspondence.pairs().len(),
        correspondence.unmatched_new().len(),
        correspondence.unmatched_old().len(),
    );

    Ok(Transition {
        tracks,
        correspondence,
        frames: config.frames,
        frame: 0,
        easing: config.easing,
    })
}
