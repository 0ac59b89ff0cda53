//! Frame timing and the per-step integration convention.
//!
//! [`Time`] is the clock the embedding loop ticks once per rendered frame.
//! It produces the millisecond timestamps the emission throttles compare
//! against, and the delta the [`StepMode::Scaled`] convention needs.
//!
//! # Example
//!
//! ```ignore
//! use waterfx::time::Time;
//!
//! let mut time = Time::new();
//!
//! // In your game loop:
//! time.update();
//! water.update(&avatar, &scene, &time);
//! ```
//!
//! # Step Conventions
//!
//! Every decay and scale increment in the effects is written as a per-step
//! constant. [`StepMode::PerFrame`] applies each constant exactly once per
//! update, so the animation speed follows the frame rate.
//! [`StepMode::Scaled`] converts the frame delta into a step count relative to
//! a reference frame rate: additive increments are multiplied by it and
//! geometric factors are raised to it.

use std::time::Instant;

/// How per-step constants relate to elapsed time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepMode {
    /// One step per update regardless of elapsed time.
    #[default]
    PerFrame,
    /// Steps proportional to elapsed time at `reference_fps`.
    Scaled { reference_fps: f32 },
}

impl StepMode {
    /// Resolve the step for a frame that took `delta_secs`.
    pub fn step(&self, delta_secs: f32) -> Step {
        match *self {
            StepMode::PerFrame => Step::ONE,
            StepMode::Scaled { reference_fps } => Step::new(delta_secs * reference_fps),
        }
    }
}

/// Number of nominal simulation steps covered by one update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step(f32);

impl Step {
    /// Exactly one step.
    pub const ONE: Step = Step(1.0);

    pub fn new(steps: f32) -> Self {
        Step(steps.max(0.0))
    }

    #[inline]
    pub fn count(&self) -> f32 {
        self.0
    }

    /// Additive increment covering this step.
    #[inline]
    pub fn add(&self, per_step: f32) -> f32 {
        if self.0 == 1.0 {
            per_step
        } else {
            per_step * self.0
        }
    }

    /// Multiplicative factor covering this step.
    #[inline]
    pub fn mul(&self, per_step: f32) -> f32 {
        if self.0 == 1.0 {
            per_step
        } else {
            per_step.powf(self.0)
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Step::ONE
    }
}

/// Time tracking for the water effects.
///
/// Provides elapsed milliseconds, delta time and a frame counter. A fixed
/// delta turns it into a deterministic clock for headless runs and tests.
#[derive(Debug)]
pub struct Time {
    /// When the clock was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Total elapsed time in milliseconds.
    elapsed_ms: f64,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
}

impl Time {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_ms: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fixed_delta: None,
        }
    }

    /// Create a deterministic clock that advances by `delta` every update.
    pub fn fixed(delta: f32) -> Self {
        Self {
            fixed_delta: Some(delta),
            ..Self::new()
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed_ms, delta_secs)` for convenience.
    pub fn update(&mut self) -> (f64, f32) {
        match self.fixed_delta {
            Some(delta) => {
                self.delta_secs = delta;
                self.elapsed_ms += f64::from(delta) * 1000.0;
            }
            None => {
                let now = Instant::now();
                self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
                self.elapsed_ms = now.duration_since(self.start).as_secs_f64() * 1000.0;
                self.last_frame = now;
            }
        }
        self.frame_count += 1;
        (self.elapsed_ms, self.delta_secs)
    }

    /// Total elapsed time in milliseconds since start.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
