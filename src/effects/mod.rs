//! Effect controllers.
//!
//! Each controller owns one [`ParticlePool`](crate::pool::ParticlePool)
//! (two for droplets), implements its own emission policy, and advances its
//! particles once per frame through the [`Effect`] trait.
//!
//! | Effect | Reuse policy | Idle when |
//! |--------|--------------|-----------|
//! | [`DivingRipple`] | single ring | decay ≥ 1 |
//! | [`DivingLowerSplash`] | whole-pool burst | decay ≥ 1 |
//! | [`DivingHigherSplash`] | whole-pool burst | decay ≥ 1 |
//! | [`Droplet`] | whole-pool burst, chained ripples | scale ≤ 0.001 |
//! | [`MovingRipple`] | two ring cursors + static slot | decay ≥ 1 |
//! | [`MovingSplash`] | scan | decay ≥ 1 |
//! | [`FreestyleSplash`] | scan, one per call | decay ≥ 1 or ≤ 0 |
//! | [`Bubble`] | scan over a speed-sized prefix | scale ≤ 0 |
//! | [`BodyDrop`] | scan, one per call | opacity ≤ 0 / decay ≥ 1 |

mod body_drop;
mod bubble;
mod diving_ripple;
mod droplet;
mod freestyle_splash;
mod higher_splash;
mod lower_splash;
mod moving_ripple;
mod moving_splash;
mod stroke;

pub use body_drop::{BodyDrop, BodyDropVertex};
pub use bubble::{Bubble, BubbleState, BubbleVertex};
pub use diving_ripple::{DivingRipple, DivingRippleVertex};
pub use droplet::{Droplet, DropletRippleVertex, DropletRipples, DropletState, DropletVertex};
pub use freestyle_splash::{FreestyleSplash, FreestyleSplashVertex};
pub use higher_splash::{ColumnState, DivingHigherSplash, HigherSplashVertex};
pub use lower_splash::{DivingLowerSplash, LowerSplashVertex};
pub use moving_ripple::{MovingRipple, MovingRippleVertex};
pub use moving_splash::{MovingSplash, MovingSplashVertex, SplashBurst, SplashState};
pub use stroke::StrokeSplashes;

use crate::attributes::{Attributes, Channel, ChannelMask};
use crate::frame::FrameContext;
use crate::pool::ParticlePool;
use crate::uniforms::{EffectUniforms, GroupTransform};
use std::fmt;

/// The nine water effects, in the order they are advanced each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    DivingRipple,
    DivingLowerSplash,
    DivingHigherSplash,
    Droplet,
    MovingRipple,
    MovingSplash,
    Bubble,
    FreestyleSplash,
    BodyDrop,
}

impl EffectKind {
    /// Every effect in advance order.
    pub const ALL: [EffectKind; 9] = [
        EffectKind::DivingRipple,
        EffectKind::DivingLowerSplash,
        EffectKind::DivingHigherSplash,
        EffectKind::Droplet,
        EffectKind::MovingRipple,
        EffectKind::MovingSplash,
        EffectKind::Bubble,
        EffectKind::FreestyleSplash,
        EffectKind::BodyDrop,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::DivingRipple => "diving ripple",
            EffectKind::DivingLowerSplash => "diving lower splash",
            EffectKind::DivingHigherSplash => "diving higher splash",
            EffectKind::Droplet => "droplet",
            EffectKind::MovingRipple => "moving ripple",
            EffectKind::MovingSplash => "moving splash",
            EffectKind::Bubble => "bubble",
            EffectKind::FreestyleSplash => "freestyle splash",
            EffectKind::BodyDrop => "body drop",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the renderer needs to draw one particle layer.
#[derive(Clone, Copy, Debug)]
pub struct LayerView<'a> {
    pub kind: EffectKind,
    /// Layer name within the effect (`"particles"`, `"ripples"`, ...).
    pub layer: &'static str,
    /// Packed per-particle records.
    pub vertices: &'a [u8],
    /// Record size in bytes.
    pub stride: usize,
    pub channels: &'static [Channel],
    /// Channels changed since the last [`Effect::clear_dirty`].
    pub dirty: ChannelMask,
    pub uniforms: EffectUniforms,
    pub transform: GroupTransform,
}

impl<'a> LayerView<'a> {
    pub(crate) fn of<V: Attributes, S>(
        kind: EffectKind,
        layer: &'static str,
        pool: &'a ParticlePool<V, S>,
        uniforms: EffectUniforms,
        transform: GroupTransform,
    ) -> Self {
        let buffer = pool.vertices();
        Self {
            kind,
            layer,
            vertices: buffer.as_bytes(),
            stride: buffer.stride(),
            channels: buffer.channels(),
            dirty: buffer.dirty(),
            uniforms,
            transform,
        }
    }

    /// Number of particle records in the layer.
    pub fn len(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.vertices.len() / self.stride
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-frame simulation and render hand-off shared by all controllers.
pub trait Effect {
    fn kind(&self) -> EffectKind;

    /// Advance every in-flight particle by one frame.
    fn advance(&mut self, frame: &FrameContext);

    /// Render layers of this effect.
    fn layers(&self) -> Vec<LayerView<'_>>;

    /// Mark every layer as uploaded.
    fn clear_dirty(&mut self);

    /// Slots currently animating.
    fn active_count(&self) -> usize;
}
