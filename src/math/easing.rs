//! Easing curves for stipple transitions

/// Maps linear animation progress to eased progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Easing {
    /// Constant speed
    Linear,
    /// Cubic Hermite `3t² - 2t³`, zero velocity at both ends
    #[default]
    SmoothStep,
    /// Cubic ease-in for the first half and ease-out for the second
    CubicInOut,
}

impl Easing {
    /// Evaluate the curve at progress `t`, clamped to `[0, 1]`
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * 2.0f32.mul_add(-t, 3.0),
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0f32.mul_add(-t, 2.0);
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}
