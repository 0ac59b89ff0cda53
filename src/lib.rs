//! # waterfx - Water Interaction Particle Effects
//!
//! CPU-side particle simulation for an avatar interacting with water:
//! diving rings and splashes, airborne droplets with landing ripples,
//! footstep and stroke splashes, surface ripples, bubbles and body drips.
//!
//! waterfx owns the particle pools and their physics. Rendering, audio and
//! the avatar's physics body belong to the host; they meet the crate at
//! three seams:
//!
//! - [`Avatar`] is read once per frame.
//! - [`LayerView`]s hand packed attribute buffers, dirty channel masks and
//!   shader uniforms to the renderer.
//! - [`SoundPlayer`] receives one diving sound per dive.
//!
//! ## Quick Start
//!
//! ```ignore
//! use waterfx::prelude::*;
//!
//! let mut water = WaterInteraction::new(WaterConfig::full())?;
//! let mut time = Time::new();
//!
//! loop {
//!     time.update();
//!     let scene = SceneSnapshot {
//!         camera_rotation: camera.rotation(),
//!         water_surface_height: 0.0,
//!     };
//!     water.update(&avatar, &scene, &time);
//!
//!     for layer in water.layers() {
//!         if !layer.dirty.is_empty() {
//!             renderer.upload(layer.kind, layer.layer, layer.vertices);
//!         }
//!     }
//!     water.clear_dirty();
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Pools
//!
//! Every effect owns a fixed-capacity [`ParticlePool`]. Slots are never
//! allocated or freed; an effect-specific predicate decides when a slot is
//! available again, and emission overwrites available slots (or, for moving
//! ripples, the oldest slot of a round-robin range).
//!
//! ### Attribute Records
//!
//! Per-particle data lives in `#[repr(C)]` records described by
//! `#[derive(Attributes)]`. Each field is a named channel the renderer can
//! bind; the generated masks record which channels changed this frame:
//!
//! ```ignore
//! #[repr(C)]
//! #[derive(Clone, Copy, Pod, Zeroable, Attributes)]
//! struct RippleVertex {
//!     position: Vec3,
//!     scale: f32,
//!     broken: f32,
//! }
//!
//! pool.mark_dirty(RippleVertex::SCALE | RippleVertex::BROKEN);
//! ```
//!
//! ### Steps
//!
//! Growth and decay constants are per simulation step. [`StepMode::PerFrame`]
//! applies one step per update; [`StepMode::Scaled`] converts elapsed time
//! into fractional steps at a reference frame rate.
//!
//! ## Effects
//!
//! | Effect | Trigger |
//! |--------|---------|
//! | [`DivingRipple`] | entering water faster than [`DIVE_SPEED`] |
//! | [`DivingLowerSplash`], [`DivingHigherSplash`] | dive |
//! | [`Droplet`] | dive; each droplet leaves a ripple where it lands |
//! | [`MovingRipple`] | moving through water, static ring when still |
//! | [`MovingSplash`] | stroke hand or stepping foot changes |
//! | [`FreestyleSplash`] | freestyle stroke |
//! | [`Bubble`] | swimming |
//! | [`BodyDrop`] | wading, or just after leaving the water |

extern crate self as waterfx;

pub mod atlas;
pub mod attributes;
pub mod audio;
pub mod avatar;
pub mod config;
pub mod effects;
pub mod error;
pub mod frame;
pub mod pool;
pub mod time;
pub mod uniforms;
mod water;

pub use attributes::{AttributeBuffer, Attributes, Channel, ChannelFormat, ChannelMask};
pub use audio::{DivingSounds, SoundPlayer};
pub use avatar::{Avatar, AvatarSnapshot, Side, SwimAction, SwimStyle};
pub use bytemuck;
pub use config::{WaterConfig, DEFAULT_DIVING_SOUND_PATTERN};
pub use effects::{
    BodyDrop, Bubble, DivingHigherSplash, DivingLowerSplash, DivingRipple, Droplet, Effect, EffectKind,
    FreestyleSplash, LayerView, MovingRipple, MovingSplash, SplashBurst, StrokeSplashes,
};
pub use error::ConfigError;
pub use frame::{FrameContext, SceneSnapshot, MOVING_SPEED};
pub use glam::{Quat, Vec2, Vec3, Vec4};
pub use pool::{EmitReport, ParticlePool, RingCursor};
pub use time::{Step, StepMode, Time};
pub use uniforms::{EffectUniforms, GroupTransform};
pub use water::{InteractionState, WaterInteraction, DIVE_SPEED};
pub use waterfx_derive::Attributes;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use waterfx::prelude::*;
/// ```
///
/// This imports:
/// - [`WaterInteraction`] and [`WaterConfig`] - the orchestrator and its configuration
/// - [`Avatar`], [`AvatarSnapshot`], [`SceneSnapshot`] - per-frame inputs
/// - [`Effect`], [`LayerView`], [`EffectKind`] - render hand-off
/// - [`Time`], [`StepMode`] - clock and step convention
/// - [`Attributes`] - trait and derive macro for attribute records
/// - [`Vec2`], [`Vec3`], [`Vec4`], [`Quat`] - glam types
pub mod prelude {
    pub use crate::attributes::{Attributes, ChannelMask};
    pub use crate::audio::SoundPlayer;
    pub use crate::avatar::{Avatar, AvatarSnapshot, Side, SwimAction, SwimStyle};
    pub use crate::config::WaterConfig;
    pub use crate::effects::{Effect, EffectKind, LayerView};
    pub use crate::error::ConfigError;
    pub use crate::frame::{FrameContext, SceneSnapshot};
    pub use crate::time::{StepMode, Time};
    pub use crate::uniforms::{EffectUniforms, GroupTransform};
    pub use crate::water::WaterInteraction;
    pub use crate::{Quat, Vec2, Vec3, Vec4};
    pub use bytemuck::{Pod, Zeroable};
    pub use waterfx_derive::Attributes;
}
