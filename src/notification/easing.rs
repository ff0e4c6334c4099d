//! Easing curves for slide animations.
//!
//! Easing functions transform linear progress (0.0 to 1.0) into curved
//! progress so cards decelerate into their slot and accelerate out of it.

/// Easing function for controlling animation curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed.
    #[default]
    Linear,

    /// Cubic ease-in: `t³`
    EaseInCubic,

    /// Cubic ease-out: `1 - (1-t)³`
    EaseOutCubic,
}

impl Easing {
    /// Apply the easing function to linear progress.
    ///
    /// Input `t` is clamped to `[0.0, 1.0]`; the result stays in that range.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
        }
    }
}
