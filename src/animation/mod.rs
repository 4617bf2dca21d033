//! Animated transitions between converged stipple sets

/// Nearest-position matching of old stipples to new ones
pub mod correspondence;
/// Eased frame stepping from one set to another
pub mod transition;

pub use correspondence::{Correspondence, match_stipples};
pub use transition::{Transition, TransitionConfig, begin_transition};
