//! Construction-time configuration.
//!
//! A [`WaterConfig`] is the opaque bundle the embedding application hands to
//! [`WaterInteraction::new`](crate::WaterInteraction::new). Every effect has an
//! optional capacity; `None` leaves that effect unconstructed and the
//! orchestrator silently skips it.
//!
//! # Example
//!
//! ```ignore
//! let config = WaterConfig::full()
//!     .with_bubbles(None)              // no underwater bubbles
//!     .with_moving_splashes(Some(400)) // larger footstep pool
//!     .with_step_mode(StepMode::Scaled { reference_fps: 60.0 })
//!     .with_seed(7);
//! let water = WaterInteraction::new(config)?;
//! ```

use crate::error::ConfigError;
use crate::time::StepMode;
use crate::EffectKind;

/// Default filter applied to the sound catalog for diving sounds.
pub const DEFAULT_DIVING_SOUND_PATTERN: &str = r"^water/jump_water[0-9]*\.wav$";

/// Slot counts and tuning for every effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WaterConfig {
    /// Whether the single diving ripple ring is constructed.
    pub diving_ripple: bool,
    pub diving_lower_splashes: Option<usize>,
    pub diving_higher_splashes: Option<usize>,
    /// Droplet count; the chained ripple pool gets the same size.
    pub droplets: Option<usize>,
    /// Must be at least 3: circle half, broken half and the static slot.
    pub moving_ripples: Option<usize>,
    pub moving_splashes: Option<usize>,
    pub freestyle_splashes: Option<usize>,
    pub bubbles: Option<usize>,
    pub body_drops: Option<usize>,
    /// Leading body drop slots used for drips; the rest are splash puffs.
    pub body_drop_drips: usize,
    pub step_mode: StepMode,
    /// Seed for the effect RNG; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub diving_sound_pattern: String,
    /// Stationary time in water before the static ripple appears.
    pub static_ripple_delay_ms: f64,
    /// Height of the freestyle splash group above the water surface.
    pub freestyle_splash_height: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl WaterConfig {
    /// Every effect enabled with its standard pool size.
    pub fn full() -> Self {
        Self {
            diving_ripple: true,
            diving_lower_splashes: Some(10),
            diving_higher_splashes: Some(15),
            droplets: Some(50),
            moving_ripples: Some(41),
            moving_splashes: Some(200),
            freestyle_splashes: Some(10),
            bubbles: Some(200),
            body_drops: Some(40),
            body_drop_drips: 20,
            step_mode: StepMode::PerFrame,
            seed: None,
            diving_sound_pattern: DEFAULT_DIVING_SOUND_PATTERN.to_string(),
            static_ripple_delay_ms: 1500.0,
            freestyle_splash_height: 0.29,
        }
    }

    /// Low tier: only surface ripples and footstep splashes.
    pub fn minimal() -> Self {
        Self {
            diving_lower_splashes: None,
            diving_higher_splashes: None,
            droplets: None,
            freestyle_splashes: None,
            bubbles: None,
            body_drops: None,
            ..Self::full()
        }
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    pub fn with_diving_ripple(mut self, enabled: bool) -> Self {
        self.diving_ripple = enabled;
        self
    }

    pub fn with_diving_lower_splashes(mut self, capacity: Option<usize>) -> Self {
        self.diving_lower_splashes = capacity;
        self
    }

    pub fn with_diving_higher_splashes(mut self, capacity: Option<usize>) -> Self {
        self.diving_higher_splashes = capacity;
        self
    }

    pub fn with_droplets(mut self, capacity: Option<usize>) -> Self {
        self.droplets = capacity;
        self
    }

    pub fn with_moving_ripples(mut self, capacity: Option<usize>) -> Self {
        self.moving_ripples = capacity;
        self
    }

    pub fn with_moving_splashes(mut self, capacity: Option<usize>) -> Self {
        self.moving_splashes = capacity;
        self
    }

    pub fn with_freestyle_splashes(mut self, capacity: Option<usize>) -> Self {
        self.freestyle_splashes = capacity;
        self
    }

    pub fn with_bubbles(mut self, capacity: Option<usize>) -> Self {
        self.bubbles = capacity;
        self
    }

    /// Set the body drop pool and how many of its leading slots are drips.
    pub fn with_body_drops(mut self, capacity: Option<usize>, drips: usize) -> Self {
        self.body_drops = capacity;
        self.body_drop_drips = drips;
        self
    }

    pub fn with_step_mode(mut self, mode: StepMode) -> Self {
        self.step_mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_diving_sound_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.diving_sound_pattern = pattern.into();
        self
    }

    pub fn with_static_ripple_delay_ms(mut self, delay: f64) -> Self {
        self.static_ripple_delay_ms = delay;
        self
    }

    pub fn with_freestyle_splash_height(mut self, height: f32) -> Self {
        self.freestyle_splash_height = height;
        self
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Check capacities and tuning values.
    ///
    /// The sound pattern is compiled separately when the orchestrator is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pools = [
            (EffectKind::DivingLowerSplash, self.diving_lower_splashes, 1),
            (EffectKind::DivingHigherSplash, self.diving_higher_splashes, 1),
            (EffectKind::Droplet, self.droplets, 1),
            (EffectKind::MovingRipple, self.moving_ripples, 3),
            (EffectKind::MovingSplash, self.moving_splashes, 1),
            (EffectKind::FreestyleSplash, self.freestyle_splashes, 1),
            (EffectKind::Bubble, self.bubbles, 1),
            (EffectKind::BodyDrop, self.body_drops, 1),
        ];

        for (effect, capacity, min) in pools {
            match capacity {
                Some(0) => return Err(ConfigError::ZeroCapacity { effect }),
                Some(got) if got < min => {
                    return Err(ConfigError::CapacityTooSmall { effect, min, got })
                }
                _ => {}
            }
        }

        if let Some(capacity) = self.body_drops {
            if self.body_drop_drips > capacity {
                return Err(ConfigError::DripRangeOutOfBounds {
                    drips: self.body_drop_drips,
                    capacity,
                });
            }
        }

        if let StepMode::Scaled { reference_fps } = self.step_mode {
            if !(reference_fps > 0.0) {
                return Err(ConfigError::InvalidReferenceFps(reference_fps));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_preset_is_valid() {
        assert!(WaterConfig::full().validate().is_ok());
        assert!(WaterConfig::minimal().validate().is_ok());
    }

    #[test]
    fn test_minimal_disables_optional_tiers() {
        let config = WaterConfig::minimal();
        assert!(config.diving_ripple);
        assert!(config.moving_ripples.is_some());
        assert!(config.bubbles.is_none());
        assert!(config.droplets.is_none());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = WaterConfig::full().with_bubbles(Some(0)).validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZeroCapacity { effect: EffectKind::Bubble }
        ));
    }

    #[test]
    fn test_moving_ripple_needs_three_slots() {
        let err = WaterConfig::full()
            .with_moving_ripples(Some(2))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::CapacityTooSmall { min: 3, got: 2, .. }));
    }

    #[test]
    fn test_drip_range_must_fit() {
        let err = WaterConfig::full()
            .with_body_drops(Some(10), 11)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DripRangeOutOfBounds { drips: 11, capacity: 10 }
        ));
    }

    #[test]
    fn test_scaled_step_needs_positive_fps() {
        let err = WaterConfig::full()
            .with_step_mode(StepMode::Scaled { reference_fps: 0.0 })
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidReferenceFps(_)));
    }
}
