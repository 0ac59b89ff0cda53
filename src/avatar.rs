//! Avatar collaborator interface.
//!
//! The orchestrator reads the avatar once per frame through the [`Avatar`]
//! trait and never mutates it. [`AvatarSnapshot`] is a plain-data
//! implementation for hosts that already copy their state into a struct,
//! and for tests.

use glam::{Quat, Vec3};

/// Which hand or foot is mid-stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// `1.0` for right, `-1.0` for left.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Swim animation style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwimStyle {
    Breaststroke,
    Freestyle,
}

/// Active swim action, present only while the avatar swims.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwimAction {
    pub style: SwimStyle,
}

/// Read-only view of the avatar and its physics body.
pub trait Avatar {
    /// World position.
    fn position(&self) -> Vec3;

    /// World orientation.
    fn rotation(&self) -> Quat;

    /// Movement velocity; only the horizontal part drives the effects.
    fn velocity(&self) -> Vec3;

    /// Vertical velocity of the physics body, negative while falling.
    fn vertical_velocity(&self) -> f32;

    fn height(&self) -> f32;

    fn shoulder_width(&self) -> f32;

    /// Whether the body touches water this frame.
    fn in_water(&self) -> bool;

    fn swim_action(&self) -> Option<SwimAction>;

    /// Hand currently mid-stroke while swimming.
    fn swimming_hand(&self) -> Option<Side>;

    /// Foot currently mid-step while walking.
    fn current_step(&self) -> Option<Side>;
}

/// Plain copy of the avatar state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvatarSnapshot {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub vertical_velocity: f32,
    pub height: f32,
    pub shoulder_width: f32,
    pub in_water: bool,
    pub swim_action: Option<SwimAction>,
    pub swimming_hand: Option<Side>,
    pub current_step: Option<Side>,
}

impl Default for AvatarSnapshot {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            height: 1.6,
            shoulder_width: 0.4,
            in_water: false,
            swim_action: None,
            swimming_hand: None,
            current_step: None,
        }
    }
}

impl AvatarSnapshot {
    /// Capture any [`Avatar`] implementation.
    pub fn capture<A: Avatar + ?Sized>(avatar: &A) -> Self {
        Self {
            position: avatar.position(),
            rotation: avatar.rotation(),
            velocity: avatar.velocity(),
            vertical_velocity: avatar.vertical_velocity(),
            height: avatar.height(),
            shoulder_width: avatar.shoulder_width(),
            in_water: avatar.in_water(),
            swim_action: avatar.swim_action(),
            swimming_hand: avatar.swimming_hand(),
            current_step: avatar.current_step(),
        }
    }

    /// Set the swim style, or `None` when walking.
    pub fn swimming(mut self, style: Option<SwimStyle>) -> Self {
        self.swim_action = style.map(|style| SwimAction { style });
        self
    }
}

impl Avatar for AvatarSnapshot {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn shoulder_width(&self) -> f32 {
        self.shoulder_width
    }

    fn in_water(&self) -> bool {
        self.in_water
    }

    fn swim_action(&self) -> Option<SwimAction> {
        self.swim_action
    }

    fn swimming_hand(&self) -> Option<Side> {
        self.swimming_hand
    }

    fn current_step(&self) -> Option<Side> {
        self.current_step
    }
}
