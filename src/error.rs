//! Error types for waterfx.
//!
//! Only construction can fail. Once a [`WaterInteraction`](crate::WaterInteraction)
//! exists, emission and simulation are best-effort and never return errors.

use crate::EffectKind;
use thiserror::Error;

/// Errors raised while validating a [`WaterConfig`](crate::WaterConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An enabled effect was given no particle slots.
    #[error("{effect} is enabled with a capacity of zero")]
    ZeroCapacity { effect: EffectKind },

    /// The effect needs more slots than it was given to lay out its sub-ranges.
    #[error("{effect} needs at least {min} slots, got {got}")]
    CapacityTooSmall {
        effect: EffectKind,
        min: usize,
        got: usize,
    },

    /// The body drop drip range does not fit inside the pool.
    #[error("body drop drip range of {drips} slots does not fit in a pool of {capacity}")]
    DripRangeOutOfBounds { drips: usize, capacity: usize },

    /// Delta-time scaling needs a positive reference frame rate.
    #[error("reference frame rate must be positive, got {0}")]
    InvalidReferenceFps(f32),

    /// The diving sound filter is not a valid regular expression.
    #[error("invalid diving sound pattern: {0}")]
    SoundPattern(#[from] regex::Error),
}
