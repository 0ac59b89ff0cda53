//! Overhead arc of water thrown by each freestyle arm recovery.

use super::{Effect, EffectKind, LayerView};
use crate::error::ConfigError;
use crate::frame::FrameContext;
use crate::pool::ParticlePool;
use crate::uniforms::{EffectUniforms, GroupTransform};
use crate::{Attributes, Vec3};
use bytemuck::{Pod, Zeroable};
use rand::rngs::SmallRng;
use rand::Rng;
use std::f32::consts::TAU;

/// Birth scale: narrow and tall.
const BIRTH_SCALE: Vec3 = Vec3::new(0.28, 0.75, 0.28);
/// Y-scale growth over birth at which the arc starts falling.
const FALL_THRESHOLD: f32 = 1.5;
const RISING_GROWTH: Vec3 = Vec3::new(1.1, 1.15, 1.1);
const FALLING_GROWTH: Vec3 = Vec3::new(1.03, 1.04, 1.03);

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct FreestyleSplashVertex {
    /// Position in the avatar-following group.
    pub position: Vec3,
    pub scale: Vec3,
    pub broken: f32,
    pub rotation: f32,
}

const IDLE: FreestyleSplashVertex = FreestyleSplashVertex {
    position: Vec3::ZERO,
    scale: Vec3::ZERO,
    broken: 1.0,
    rotation: 0.0,
};

/// Either never used or fully dissolved.
fn idle(v: &FreestyleSplashVertex, _: &Vec3) -> bool {
    v.broken >= 1.0 || v.broken <= 0.0
}

/// Small pool of arcs; slot state is the birth scale.
pub struct FreestyleSplash {
    pool: ParticlePool<FreestyleSplashVertex, Vec3>,
    height_offset: f32,
    rng: SmallRng,
    transform: GroupTransform,
    uniforms: EffectUniforms,
}

impl FreestyleSplash {
    /// `height_offset` lifts the group above the water surface.
    pub fn new(capacity: usize, height_offset: f32, rng: SmallRng) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: ParticlePool::new(EffectKind::FreestyleSplash, capacity, IDLE, idle)?,
            height_offset,
            rng,
            transform: GroupTransform::default(),
            uniforms: EffectUniforms::default(),
        })
    }

    /// Launch one arc beside the stroking shoulder.
    ///
    /// Returns `false` when every slot is still in flight.
    pub fn emit(&mut self, frame: &FrameContext) -> bool {
        let Some(index) = self.pool.first_available(0..self.pool.capacity()) else {
            log::debug!("{} pool saturated", EffectKind::FreestyleSplash);
            return false;
        };

        let side = frame.swimming_hand.map_or(-1.0, |hand| hand.sign());
        let jitter_x = (self.rng.gen::<f32>() - 0.5) * 0.1;
        let jitter_y = (self.rng.gen::<f32>() - 0.5) * 0.1;
        let vertex = FreestyleSplashVertex {
            position: Vec3::new(frame.shoulder_width * 1.15 * side + jitter_x, 0.7 + jitter_y, 0.0),
            scale: BIRTH_SCALE,
            broken: self.rng.gen::<f32>() * 0.15,
            rotation: self.rng.gen::<f32>() * TAU,
        };
        self.pool.emit(index, vertex, BIRTH_SCALE);
        self.pool.mark_dirty(FreestyleSplashVertex::ALL);
        true
    }

    pub fn particle(&self, index: usize) -> &FreestyleSplashVertex {
        self.pool.vertex(index)
    }

    pub fn transform(&self) -> GroupTransform {
        self.transform
    }

    #[cfg(test)]
    fn place(&mut self, index: usize, vertex: FreestyleSplashVertex) {
        self.pool.emit(index, vertex, vertex.scale);
    }
}

impl Effect for FreestyleSplash {
    fn kind(&self) -> EffectKind {
        EffectKind::FreestyleSplash
    }

    fn advance(&mut self, frame: &FrameContext) {
        let step = frame.step;
        self.transform = GroupTransform {
            position: Vec3::new(
                frame.player_position.x,
                frame.water_surface_height + self.height_offset,
                frame.player_position.z,
            ),
            rotation: frame.player_rotation,
            visible: true,
        };

        let rising = Vec3::new(step.mul(RISING_GROWTH.x), step.mul(RISING_GROWTH.y), step.mul(RISING_GROWTH.z));
        let falling = Vec3::new(
            step.mul(FALLING_GROWTH.x),
            step.mul(FALLING_GROWTH.y),
            step.mul(FALLING_GROWTH.z),
        );
        for i in 0..self.pool.capacity() {
            self.pool.advance(i, |v, birth| {
                if v.broken >= 1.0 {
                    return;
                }
                if v.scale.y > birth.y * FALL_THRESHOLD {
                    v.scale *= falling;
                    v.position.y -= step.add(0.008);
                    v.position.z += step.add(0.003);
                    v.broken += step.add(0.04);
                } else {
                    v.scale *= rising;
                }
            });
        }
        self.pool.mark_dirty(
            FreestyleSplashVertex::POSITION | FreestyleSplashVertex::SCALE | FreestyleSplashVertex::BROKEN,
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
