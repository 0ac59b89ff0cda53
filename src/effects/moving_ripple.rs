//! Surface rings left behind while the avatar moves through water, plus a
//! persistent ring that fades in while it stands still.
//!
//! The pool is split into three reserved sub-ranges:
//!
//! | Range | Content | Reuse |
//! |-------|---------|-------|
//! | `0..half` | circle ripples ahead of the avatar | [`RingCursor`] |
//! | `half..capacity-1` | broken ripples behind the avatar | [`RingCursor`] |
//! | `capacity-1` | static ripple | toggled |
//!
//! The `opacity` uniform is the static ripple's fade-in; the footstep rings
//! fade through their own `broken` channel.

use super::{Effect, EffectKind, LayerView};
use crate::error::ConfigError;
use crate::frame::{FrameContext, MOVING_SPEED};
use crate::pool::{ParticlePool, RingCursor};
use crate::uniforms::{EffectUniforms, GroupTransform};
use crate::{Attributes, Vec3};
use bytemuck::{Pod, Zeroable};
use rand::rngs::SmallRng;
use rand::Rng;

/// Smallest pool that fits one slot of each kind.
pub const MIN_MOVING_RIPPLES: usize = 3;
/// Base emission interval before the speed power law is applied.
const THROTTLE_MS: f64 = 170.0;
/// Speed above which a broken ripple accompanies each circle ripple.
const BROKEN_SPEED: f32 = 0.3;
const STATIC_SCALE: f32 = 3.5;
const STATIC_START_OPACITY: f32 = 0.1;
const SURFACE_LIFT: f32 = 0.01;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct MovingRippleVertex {
    pub position: Vec3,
    pub scale: f32,
    pub broken: f32,
    /// Avatar heading at emission.
    pub player_rotation: f32,
    /// Per-ripple noise seed.
    pub random: f32,
}

const IDLE: MovingRippleVertex = MovingRippleVertex {
    position: Vec3::ZERO,
    scale: 0.0,
    broken: 1.0,
    player_rotation: 0.0,
    random: 0.0,
};

fn dissolved(v: &MovingRippleVertex, _: &()) -> bool {
    v.broken >= 1.0
}

/// Minimum milliseconds between emissions at `speed`.
pub fn emit_interval_ms(speed: f32) -> f64 {
    THROTTLE_MS * ((1.1 - speed).max(0.0) as f64).powf(0.3)
}

pub struct MovingRipple {
    pool: ParticlePool<MovingRippleVertex>,
    circles: RingCursor,
    broken: RingCursor,
    static_slot: usize,
    last_emit_ms: f64,
    rng: SmallRng,
    uniforms: EffectUniforms,
}

impl MovingRipple {
    pub fn new(capacity: usize, rng: SmallRng) -> Result<Self, ConfigError> {
        if capacity < MIN_MOVING_RIPPLES {
            return Err(ConfigError::CapacityTooSmall {
                effect: EffectKind::MovingRipple,
                min: MIN_MOVING_RIPPLES,
                got: capacity,
            });
        }
        let pool = ParticlePool::new(EffectKind::MovingRipple, capacity, IDLE, dissolved)?;
        let half = (capacity - 1) / 2;
        Ok(Self {
            pool,
            circles: RingCursor::new(0..half),
            broken: RingCursor::new(half..capacity - 1),
            static_slot: capacity - 1,
            last_emit_ms: f64::NEG_INFINITY,
            rng,
            uniforms: EffectUniforms {
                opacity: 0.0,
                ..EffectUniforms::default()
            },
        })
    }

    /// Emit a circle ripple ahead of the avatar, and a broken one behind it
    /// when moving fast.
    ///
    /// Returns `false` when the avatar is too slow or the throttle has not
    /// elapsed.
    pub fn emit(&mut self, frame: &FrameContext) -> bool {
        if frame.speed < MOVING_SPEED {
            return false;
        }
        if frame.timestamp_ms - self.last_emit_ms <= emit_interval_ms(frame.speed) {
            return false;
        }

        let heading = frame.ripple_heading();
        let p = frame.player_position;
        let dir = frame.player_dir;
        let surface = frame.water_surface_height + SURFACE_LIFT;

        let circle = MovingRippleVertex {
            position: Vec3::new(
                p.x + 0.25 * dir.x + (self.rng.gen::<f32>() - 0.5) * 0.1,
                surface,
                p.z + 0.25 * dir.z + (self.rng.gen::<f32>() - 0.5) * 0.1,
            ),
            scale: 1.5 + 0.1 * self.rng.gen::<f32>(),
            broken: 0.03 * self.rng.gen::<f32>(),
            player_rotation: heading,
            random: self.rng.gen(),
        };
        self.pool.emit(self.circles.current(), circle, ());

        let broken = if frame.speed > BROKEN_SPEED {
            MovingRippleVertex {
                position: Vec3::new(
                    p.x - 0.25 * dir.x + (self.rng.gen::<f32>() - 0.5) * 0.25,
                    surface,
                    p.z - 0.25 * dir.z + (self.rng.gen::<f32>() - 0.5) * 0.25,
                ),
                scale: 1.1 + 0.5 * self.rng.gen::<f32>(),
                broken: 0.1 + 0.2 * self.rng.gen::<f32>(),
                player_rotation: heading,
                random: self.rng.gen(),
            }
        } else {
            MovingRippleVertex {
                scale: 0.0,
                ..*self.pool.vertex(self.broken.current())
            }
        };
        self.pool.emit(self.broken.current(), broken, ());

        self.circles.advance();
        self.broken.advance();
        self.last_emit_ms = frame.timestamp_ms;
        self.pool.mark_dirty(MovingRippleVertex::ALL);
        true
    }

    /// Show the static ring and start its fade-in.
    pub fn enable_static(&mut self) {
        let slot = self.pool.vertex_mut(self.static_slot);
        if slot.scale < STATIC_SCALE {
            slot.scale = STATIC_SCALE;
            slot.broken = 0.0;
            self.uniforms.opacity = STATIC_START_OPACITY;
            self.pool.mark_dirty(MovingRippleVertex::SCALE | MovingRippleVertex::BROKEN);
        }
    }

    /// Hide the static ring immediately.
    pub fn disable_static(&mut self) {
        let slot = self.pool.vertex_mut(self.static_slot);
        if slot.scale != 0.0 || self.uniforms.opacity != 0.0 {
            slot.scale = 0.0;
            self.uniforms.opacity = 0.0;
            self.pool.mark_dirty(MovingRippleVertex::SCALE);
        }
    }

    pub fn is_static_shown(&self) -> bool {
        self.pool.vertex(self.static_slot).scale > 0.0
    }

    pub fn static_opacity(&self) -> f32 {
        self.uniforms.opacity
    }

    pub fn ripple(&self, index: usize) -> &MovingRippleVertex {
        self.pool.vertex(index)
    }

    /// Slots the next circle and broken ripples will be written to.
    pub fn cursors(&self) -> (usize, usize) {
        (self.circles.current(), self.broken.current())
    }

    pub fn static_slot(&self) -> usize {
        self.static_slot
    }

    pub fn last_emit_ms(&self) -> f64 {
        self.last_emit_ms
    }
}

impl Effect for MovingRipple {
    fn kind(&self) -> EffectKind {
        EffectKind::MovingRipple
    }

    fn advance(&mut self, frame: &FrameContext) {
        let step = frame.step;
        let growth = step.add(0.1 * (frame.speed + 0.3));
        let decay = step.add(0.01);
        for i in 0..self.static_slot {
            self.pool.advance(i, |v, _| {
                if v.broken < 1.0 {
                    v.scale += growth;
                    v.broken += decay;
                }
            });
        }

        let p = frame.player_position;
        let dir = frame.player_dir;
        let slot = self.pool.vertex_mut(self.static_slot);
        slot.position = Vec3::new(
            p.x + 0.1 * dir.x,
            frame.water_surface_height + SURFACE_LIFT,
            p.z + 0.1 * dir.z,
        );
        slot.player_rotation = frame.ripple_heading();
        if slot.scale > 0.0 && self.uniforms.opacity < 1.0 {
            self.uniforms.opacity = (self.uniforms.opacity + step.add(0.01)).min(1.0);
        }

        self.pool.mark_dirty(
            MovingRippleVertex::POSITION
                | MovingRippleVertex::SCALE
                | MovingRippleVertex::BROKEN
                | MovingRippleVertex::PLAYER_ROTATION,
        );
        self.uniforms.time = (frame.timestamp_ms / 1000.0) as f32;
        self.uniforms.water_surface_pos = frame.water_surface_height;
    }

    fn layers(&self) -> Vec<LayerView<'_>> {
        vec![LayerView::of(self.kind(), "ripples", &self.pool, self.uniforms, GroupTransform::WORLD)]
    }

    fn clear_dirty(&mut self) {
        self.pool.take_dirty();
    }

    /// Animating footstep rings, plus the static ring while shown.
    fn active_count(&self) -> usize {
        let moving = (0..self.static_slot).filter(|&i| !self.pool.is_available(i)).count();
        moving + usize::from(self.is_static_shown())
    }
}
