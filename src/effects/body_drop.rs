//! Water running off the avatar's body after it leaves the water.
//!
//! One pool, two sub-ranges: the leading `drips` slots are elongating
//! drips that fade out, the rest are small splash puffs that dissolve.

use super::{Effect, EffectKind, LayerView};
use crate::error::ConfigError;
use crate::frame::FrameContext;
use crate::pool::ParticlePool;
use crate::uniforms::{EffectUniforms, GroupTransform};
use crate::{Attributes, Quat, Vec3};
use bytemuck::{Pod, Zeroable};
use rand::rngs::SmallRng;
use rand::Rng;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct BodyDropVertex {
    /// Offset from the avatar.
    pub position: Vec3,
    pub scale: Vec3,
    pub broken: f32,
    pub opacity: f32,
}

const IDLE: BodyDropVertex = BodyDropVertex {
    position: Vec3::ZERO,
    scale: Vec3::ZERO,
    broken: 1.0,
    opacity: 0.0,
};

/// Availability without knowing the slot's sub-range: both terminal values
/// hold for an idle slot, and each kind only moves its own channel.
fn spent(v: &BodyDropVertex, _: &()) -> bool {
    v.opacity <= 0.0 && v.broken >= 1.0
}

pub struct BodyDrop {
    pool: ParticlePool<BodyDropVertex>,
    drips: usize,
    rng: SmallRng,
    transform: GroupTransform,
    uniforms: EffectUniforms,
}

impl BodyDrop {
    /// `drips` leading slots become drips; it must not exceed `capacity`.
    pub fn new(capacity: usize, drips: usize, rng: SmallRng) -> Result<Self, ConfigError> {
        if drips > capacity {
            return Err(ConfigError::DripRangeOutOfBounds { drips, capacity });
        }
        Ok(Self {
            pool: ParticlePool::new(EffectKind::BodyDrop, capacity, IDLE, spent)?,
            drips,
            rng,
            transform: GroupTransform::default(),
            uniforms: EffectUniforms::default(),
        })
    }

    fn is_drip(&self, index: usize) -> bool {
        index < self.drips
    }

    /// Whether `index` can take a new drip or puff.
    pub fn is_slot_free(&self, index: usize) -> bool {
        let v = self.pool.vertex(index);
        if self.is_drip(index) {
            v.opacity <= 0.0
        } else {
            v.broken >= 1.0
        }
    }

    /// Start one drip or puff in the first free slot.
    pub fn emit(&mut self) -> bool {
        let Some(index) = (0..self.pool.capacity()).find(|&i| self.is_slot_free(i)) else {
            return false;
        };

        let vertex = if self.is_drip(index) {
            BodyDropVertex {
                position: Vec3::new(
                    (self.rng.gen::<f32>() - 0.5) * 0.3,
                    -0.25 - 0.3 * self.rng.gen::<f32>(),
                    (self.rng.gen::<f32>() - 0.5) * 0.3,
                ),
                scale: Vec3::new(1.0, 3.0 + 2.0 * self.rng.gen::<f32>(), 1.0),
                broken: 1.0,
                opacity: 0.5 * self.rng.gen::<f32>(),
            }
        } else {
            BodyDropVertex {
                position: Vec3::new(
                    (self.rng.gen::<f32>() - 0.5) * 0.3,
                    -0.2 - 0.6 * self.rng.gen::<f32>(),
                    (self.rng.gen::<f32>() - 0.5) * 0.3,
                ),
                scale: Vec3::splat(3.0 + 3.0 * self.rng.gen::<f32>()),
                broken: 0.35 + 0.5 * self.rng.gen::<f32>(),
                opacity: 0.0,
            }
        };
        self.pool.emit(index, vertex, ());
        self.pool.mark_dirty(BodyDropVertex::ALL);
        true
    }

    pub fn particle(&self, index: usize) -> &BodyDropVertex {
        self.pool.vertex(index)
    }

    pub fn drips(&self) -> usize {
        self.drips
    }

    pub fn transform(&self) -> GroupTransform {
        self.transform
    }
}

impl Effect for BodyDrop {
    fn kind(&self) -> EffectKind {
        EffectKind::BodyDrop
    }

    fn advance(&mut self, frame: &FrameContext) {
        let step = frame.step;
        self.transform = GroupTransform {
            position: frame.player_position,
            rotation: Quat::IDENTITY,
            visible: true,
        };

        let stretch = step.mul(1.03);
        for i in 0..self.pool.capacity() {
            if self.is_drip(i) {
                self.pool.advance(i, |v, _| {
                    if v.opacity > 0.0 {
                        v.opacity -= step.add(0.015);
                        v.position.y -= step.add(0.018);
                        v.scale.y *= stretch;
                    }
                });
            } else {
                self.pool.advance(i, |v, _| {
                    if v.broken < 1.0 {
                        v.broken += step.add(0.0085);
                        v.scale *= stretch;
                    }
                });
            }
        }
        self.pool.mark_dirty(
            BodyDropVertex::POSITION | BodyDropVertex::SCALE | BodyDropVertex::BROKEN | BodyDropVertex::OPACITY,
        );
        self.uniforms.camera_billboard = frame.camera_rotation;
        self.uniforms.water_surface_pos = frame.water_surface_height;
    }

    fn layers(&self) -> Vec<LayerView<'_>> {
        vec![LayerView::of(self.kind(), "particles", &self.pool, self.uniforms, self.transform)]
    }

    fn clear_dirty(&mut self) {
        self.pool.take_dirty();
    }

    fn active_count(&self) -> usize {
        self.pool.active_count()
    }
}
