//! Low fan of spray thrown outward around the dive point.

use super::{Effect, EffectKind, LayerView};
use crate::error::ConfigError;
use crate::frame::FrameContext;
use crate::pool::ParticlePool;
use crate::uniforms::{EffectUniforms, GroupTransform};
use crate::{Attributes, Vec3};
use bytemuck::{Pod, Zeroable};
use rand::rngs::SmallRng;
use rand::Rng;

const BIRTH_SCALE: f32 = 0.6;
/// Scale at which a particle stops growing and starts flying.
const FULL_SCALE: f32 = 2.1;
const GRAVITY: Vec3 = Vec3::new(0.0, -0.002, 0.0);
/// Launch velocity is divided by this once the birth position is placed.
const VELOCITY_DIVISOR: f32 = 5.0;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct LowerSplashVertex {
    pub position: Vec3,
    pub scale: f32,
    pub broken: f32,
    pub texture_rotation: f32,
}

const IDLE: LowerSplashVertex = LowerSplashVertex {
    position: Vec3::ZERO,
    scale: 0.0,
    broken: 1.0,
    texture_rotation: 0.0,
};

fn dissolved(v: &LowerSplashVertex, _: &Vec3) -> bool {
    v.broken >= 1.0
}

/// Ring of spray particles; slot state is the particle velocity.
pub struct DivingLowerSplash {
    pool: ParticlePool<LowerSplashVertex, Vec3>,
    rng: SmallRng,
    uniforms: EffectUniforms,
}

impl DivingLowerSplash {
    pub fn new(capacity: usize, rng: SmallRng) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: ParticlePool::new(EffectKind::DivingLowerSplash, capacity, IDLE, dissolved)?,
            rng,
            uniforms: EffectUniforms::default(),
        })
    }

    /// Restart every slot around `contact_point`.
    pub fn emit(&mut self, contact_point: Vec3) {
        for i in 0..self.pool.capacity() {
            let angle = i as f32;
            let launch = Vec3::new(
                angle.sin() * 0.055 + (self.rng.gen::<f32>() - 0.5) * 0.001,
                0.12 + 0.01 * self.rng.gen::<f32>(),
                angle.cos() * 0.055 + (self.rng.gen::<f32>() - 0.5) * 0.001,
            );
            let position = Vec3::new(
                contact_point.x + launch.x,
                contact_point.y + 0.1 * self.rng.gen::<f32>(),
                contact_point.z + launch.z,
            );
            let vertex = LowerSplashVertex {
                position,
                scale: BIRTH_SCALE,
                broken: 0.2,
                texture_rotation: self.rng.gen::<f32>() * 2.0,
            };
            self.pool.emit(i, vertex, launch / VELOCITY_DIVISOR);
        }
        self.pool.mark_dirty(LowerSplashVertex::ALL);
    }

    pub fn particle(&self, index: usize) -> &LowerSplashVertex {
        self.pool.vertex(index)
    }

    pub fn velocity(&self, index: usize) -> Vec3 {
        *self.pool.state(index)
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }
}

impl Effect for DivingLowerSplash {
    fn kind(&self) -> EffectKind {
        EffectKind::DivingLowerSplash
    }

    fn advance(&mut self, frame: &FrameContext) {
        let step = frame.step;
        for i in 0..self.pool.capacity() {
            self.pool.advance(i, |v, velocity| {
                if v.scale >= BIRTH_SCALE && v.scale < FULL_SCALE {
                    v.scale += step.add(0.2);
                }
                if v.scale >= FULL_SCALE && v.broken < 1.0 {
                    v.broken += step.add(0.015);
                    v.position += *velocity * step.count();
                    *velocity += GRAVITY * step.count();
                }
            });
        }
        self.pool.mark_dirty(
            LowerSplashVertex::POSITION | LowerSplashVertex::SCALE | LowerSplashVertex::BROKEN,
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
