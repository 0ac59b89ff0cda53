//! Per-frame context shared by every effect.
//!
//! The orchestrator derives these values once per update from the avatar,
//! the scene snapshot and the clock, then passes the same read-only
//! [`FrameContext`] to every emit and advance call of that frame.

use crate::avatar::Side;
use crate::time::Step;
use glam::{EulerRot, Quat, Vec3};

/// Horizontal speed above which the avatar counts as moving.
pub const MOVING_SPEED: f32 = 0.1;

/// Scene values the host provides each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneSnapshot {
    /// Camera orientation, used for billboard-facing particles.
    pub camera_rotation: Quat,
    pub water_surface_height: f32,
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self {
            camera_rotation: Quat::IDENTITY,
            water_surface_height: 0.0,
        }
    }
}

/// Derived state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    pub timestamp_ms: f64,
    pub step: Step,
    pub water_surface_height: f32,
    pub camera_rotation: Quat,
    pub player_position: Vec3,
    pub player_rotation: Quat,
    /// Unit facing direction.
    pub player_dir: Vec3,
    /// Horizontal speed, already scaled into the 0..~1 effect range.
    pub speed: f32,
    /// Entry speed on the frame the avatar touched water, otherwise 0.
    pub falling_speed: f32,
    pub avatar_height: f32,
    pub shoulder_width: f32,
    pub swimming_hand: Option<Side>,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            timestamp_ms: 0.0,
            step: Step::ONE,
            water_surface_height: 0.0,
            camera_rotation: Quat::IDENTITY,
            player_position: Vec3::ZERO,
            player_rotation: Quat::IDENTITY,
            player_dir: Vec3::NEG_Z,
            speed: 0.0,
            falling_speed: 0.0,
            avatar_height: 1.6,
            shoulder_width: 0.4,
            swimming_hand: None,
        }
    }
}

impl FrameContext {
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.speed > MOVING_SPEED
    }

    /// Facing rotated a quarter turn clockwise about Y (toward the right hand).
    pub fn lateral(&self) -> Vec3 {
        Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2) * self.player_dir
    }

    /// Yaw written into surface ripples so they align with the avatar.
    ///
    /// A non-zero pitch means the avatar is upside down or diving, which
    /// flips the ripple half a turn.
    pub fn ripple_heading(&self) -> f32 {
        let (pitch, yaw, _) = self.player_rotation.to_euler(EulerRot::XYZ);
        if pitch.abs() > f32::EPSILON {
            std::f32::consts::PI + yaw
        } else {
            -yaw
        }
    }

    /// Point on the water surface below the avatar.
    pub fn surface_point(&self) -> Vec3 {
        Vec3::new(
            self.player_position.x,
            self.water_surface_height,
            self.player_position.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lateral_points_right_of_facing() {
        let frame = FrameContext::default();
        let lateral = frame.lateral();
        assert!((lateral - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_moving_threshold() {
        let frame = FrameContext {
            speed: 0.1,
            ..Default::default()
        };
        assert!(!frame.is_moving());
        let frame = FrameContext {
            speed: 0.11,
            ..Default::default()
        };
        assert!(frame.is_moving());
    }

    #[test]
    fn test_ripple_heading_flips_when_pitched() {
        let level = FrameContext {
            player_rotation: Quat::from_rotation_y(0.5),
            ..Default::default()
        };
        assert!((level.ripple_heading() + 0.5).abs() < 1e-5);

        let pitched = FrameContext {
            player_rotation: Quat::from_rotation_x(0.3),
            ..Default::default()
        };
        assert!((pitched.ripple_heading() - std::f32::consts::PI).abs() < 1e-5);
    }
}
