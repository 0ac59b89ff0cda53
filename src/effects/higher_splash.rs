//! Tall column of spray that shoots up from below the surface on a dive.

use super::{Effect, EffectKind, LayerView};
use crate::error::ConfigError;
use crate::frame::FrameContext;
use crate::pool::ParticlePool;
use crate::uniforms::{EffectUniforms, GroupTransform};
use crate::{Attributes, Vec3};
use bytemuck::{Pod, Zeroable};
use rand::rngs::SmallRng;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, TAU};

const GRAVITY: Vec3 = Vec3::new(0.0, -0.004, 0.0);
/// Particles start this far below the contact point.
const BIRTH_DEPTH: f32 = 1.5;
/// Height below the contact point under which a particle rises without decaying.
const SETTLE_DEPTH: f32 = 0.7;
/// Upward drift while outside the visible band.
const RISE_SPEED: f32 = 0.08;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct HigherSplashVertex {
    pub position: Vec3,
    pub scale: f32,
    pub broken: f32,
    /// Sprite rotation so the column faces outward from its centre.
    pub rotation: f32,
}

const IDLE: HigherSplashVertex = HigherSplashVertex {
    position: Vec3::ZERO,
    scale: 0.0,
    broken: 1.0,
    rotation: 0.0,
};

/// Host-side state of one column particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColumnState {
    pub velocity: Vec3,
    /// Height at which the particle becomes visible and starts decaying.
    pub settle_height: f32,
}

fn dissolved(v: &HigherSplashVertex, _: &ColumnState) -> bool {
    v.broken >= 1.0
}

pub struct DivingHigherSplash {
    pool: ParticlePool<HigherSplashVertex, ColumnState>,
    rng: SmallRng,
    uniforms: EffectUniforms,
}

impl DivingHigherSplash {
    pub fn new(capacity: usize, rng: SmallRng) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: ParticlePool::new(EffectKind::DivingHigherSplash, capacity, IDLE, dissolved)?,
            rng,
            uniforms: EffectUniforms::default(),
        })
    }

    /// Restart every slot on a small circle below `contact_point`.
    pub fn emit(&mut self, contact_point: Vec3) {
        let count = self.pool.capacity();
        for i in 0..count {
            let theta = TAU * i as f32 / count as f32;
            let facing = if theta.cos() > 0.0 { 1.0 } else { -1.0 };
            let vertex = HigherSplashVertex {
                position: Vec3::new(
                    contact_point.x + theta.sin() * 0.03,
                    contact_point.y - BIRTH_DEPTH,
                    contact_point.z + theta.cos() * 0.03,
                ),
                scale: 0.5 + 0.5 * self.rng.gen::<f32>(),
                broken: 0.2 + 0.1 * self.rng.gen::<f32>(),
                rotation: -theta.sin() * facing * FRAC_PI_2,
            };
            let state = ColumnState {
                velocity: Vec3::new(0.0, 0.08 + 0.035 * self.rng.gen::<f32>(), 0.0),
                settle_height: contact_point.y - SETTLE_DEPTH,
            };
            self.pool.emit(i, vertex, state);
        }
        self.pool.mark_dirty(HigherSplashVertex::ALL);
    }

    pub fn particle(&self, index: usize) -> &HigherSplashVertex {
        self.pool.vertex(index)
    }

    pub fn column_state(&self, index: usize) -> &ColumnState {
        self.pool.state(index)
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }
}

impl Effect for DivingHigherSplash {
    fn kind(&self) -> EffectKind {
        EffectKind::DivingHigherSplash
    }

    fn advance(&mut self, frame: &FrameContext) {
        let step = frame.step;
        for i in 0..self.pool.capacity() {
            self.pool.advance(i, |v, state| {
                if v.broken >= 1.0 {
                    return;
                }
                if v.position.y >= state.settle_height && v.scale > 0.0 {
                    v.broken *= step.mul(1.03);
                    v.scale += step.add(0.02);
                    v.position.y += state.velocity.y * step.count();
                    state.velocity += GRAVITY * step.count();
                } else {
                    // Below the band, or fallen back through it.
                    v.position.y += step.add(RISE_SPEED);
                }
            });
        }
        self.pool.mark_dirty(
            HigherSplashVertex::POSITION | HigherSplashVertex::SCALE | HigherSplashVertex::BROKEN,
        );
        self.uniforms.camera_billboard = frame.camera_rotation;
        self.uniforms.water_surface_pos = frame.water_surface_height;
    }

    fn layers(&self) -> Vec<LayerView<'_>> {
        vec![LayerView::of(self.kind(), "particles", &self.pool, self.uniforms, GroupTransform::WORLD)]
    }

    fn clear_dirty(&mut self) {
        self.pool.take_dirty();
    }

    fn active_count(&self) -> usize {
        self.pool.active_count()
    }
}
