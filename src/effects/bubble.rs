//! Bubbles trailing the avatar underwater.

use super::{Effect, EffectKind, LayerView};
use crate::atlas::AtlasCursor;
use crate::error::ConfigError;
use crate::frame::FrameContext;
use crate::pool::{EmitReport, ParticlePool};
use crate::uniforms::{EffectUniforms, GroupTransform};
use crate::{Attributes, Vec2, Vec3};
use bytemuck::{Pod, Zeroable};
use rand::rngs::SmallRng;
use rand::Rng;

/// Minimum milliseconds between emissions.
const THROTTLE_MS: f64 = 100.0;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct BubbleVertex {
    pub position: Vec3,
    pub scale: f32,
    /// Atlas UV offset of the current sprite frame.
    pub offset: Vec2,
}

const IDLE: BubbleVertex = BubbleVertex {
    position: Vec3::ZERO,
    scale: 0.0,
    offset: Vec2::ZERO,
};

/// Host-side state of one bubble.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BubbleState {
    pub velocity: Vec3,
    /// Sprite frame; its tick count doubles as the bubble's age in frames.
    pub atlas: AtlasCursor,
    /// Age in frames at which the bubble pops.
    pub max_life: u32,
}

fn popped(v: &BubbleVertex, _: &BubbleState) -> bool {
    v.scale <= 0.0
}

pub struct Bubble {
    pool: ParticlePool<BubbleVertex, BubbleState>,
    last_emit_ms: f64,
    rng: SmallRng,
    uniforms: EffectUniforms,
}

impl Bubble {
    pub fn new(capacity: usize, rng: SmallRng) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: ParticlePool::new(EffectKind::Bubble, capacity, IDLE, popped)?,
            last_emit_ms: f64::NEG_INFINITY,
            rng,
            uniforms: EffectUniforms::default(),
        })
    }

    /// Release bubbles around the avatar.
    ///
    /// Faster movement releases more bubbles. Only the leading
    /// `floor(speed * 10 + 1) * 5` slots are scanned, so a busy prefix
    /// starves emission even when later slots are free.
    pub fn emit(&mut self, frame: &FrameContext) -> EmitReport {
        if frame.timestamp_ms - self.last_emit_ms <= THROTTLE_MS {
            return EmitReport::default();
        }
        self.last_emit_ms = frame.timestamp_ms;

        let max_emit = (((frame.speed * 10.0 + 1.0).floor() as usize) * 5).min(self.pool.capacity());
        let p = frame.player_position;
        let dir = frame.player_dir;
        let moving = frame.is_moving();
        let mut emitted = 0;

        for i in 0..max_emit {
            if !self.pool.is_available(i) {
                continue;
            }
            let (mut position, velocity) = if moving {
                let position = p + Vec3::new(
                    (self.rng.gen::<f32>() - 0.5) * 0.5,
                    -0.2 - 0.5 * self.rng.gen::<f32>(),
                    (self.rng.gen::<f32>() - 0.5) * 0.5,
                );
                let rise = 0.0025 + 0.0025 * self.rng.gen::<f32>();
                (position, Vec3::new(-dir.x * 0.005, rise, -dir.z * 0.005))
            } else {
                let position = Vec3::new(
                    p.x - dir.x * 0.25 + (self.rng.gen::<f32>() - 0.5) * 0.5,
                    p.y - frame.avatar_height * 0.6 - 0.2 * self.rng.gen::<f32>(),
                    p.z - dir.z * 0.25 + (self.rng.gen::<f32>() - 0.5) * 0.5,
                );
                let rise = 0.0025 + 0.0025 * self.rng.gen::<f32>();
                (position, Vec3::new(0.0, rise, 0.0))
            };
            position.y = position.y.min(frame.water_surface_height);

            let atlas = AtlasCursor::random(&mut self.rng);
            let vertex = BubbleVertex {
                position,
                scale: self.rng.gen(),
                offset: atlas.uv(),
            };
            let state = BubbleState {
                velocity,
                atlas,
                max_life: self.rng.gen_range(50..=100),
            };
            self.pool.emit(i, vertex, state);
            emitted += 1;
        }
        if emitted > 0 {
            self.pool.mark_dirty(BubbleVertex::ALL);
        }

        let report = EmitReport {
            requested: max_emit,
            emitted,
        };
        report.log_saturation(EffectKind::Bubble);
        report
    }

    pub fn particle(&self, index: usize) -> &BubbleVertex {
        self.pool.vertex(index)
    }

    pub fn bubble_state(&self, index: usize) -> &BubbleState {
        self.pool.state(index)
    }

    #[cfg(test)]
    fn place(&mut self, index: usize, vertex: BubbleVertex, state: BubbleState) {
        self.pool.emit(index, vertex, state);
    }
}

impl Effect for Bubble {
    fn kind(&self) -> EffectKind {
        EffectKind::Bubble
    }

    fn advance(&mut self, frame: &FrameContext) {
        let step = frame.step;
        let surface = frame.water_surface_height;
        for i in 0..self.pool.capacity() {
            if self.pool.is_available(i) {
                continue;
            }
            self.pool.advance(i, |v, state| {
                if v.position.y >= surface {
                    state.velocity.y = 0.0;
                }
                v.position += state.velocity * step.count();
                state.atlas.tick();
                v.offset = state.atlas.uv();
                v.scale += step.add(0.01);
                if state.atlas.ticks() > state.max_life {
                    v.scale = 0.0;
                }
            });
        }
        self.pool.mark_dirty(BubbleVertex::ALL);
        self.uniforms.camera_billboard = frame.camera_rotation;
        self.uniforms.water_surface_pos = surface;
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
