//! Splash fans kicked up by footsteps and hand strokes.
//!
//! Emission goes through [`SplashBurst`]; the stroke and step policies that
//! decide when and where bursts happen live in
//! [`StrokeSplashes`](super::StrokeSplashes).

use super::{Effect, EffectKind, LayerView};
use crate::error::ConfigError;
use crate::frame::FrameContext;
use crate::pool::{EmitReport, ParticlePool};
use crate::uniforms::{EffectUniforms, GroupTransform};
use crate::{Attributes, Quat, Vec3};
use bytemuck::{Pod, Zeroable};
use rand::rngs::SmallRng;
use rand::Rng;

/// Per-axis positional jitter applied to every emitted particle.
const JITTER: f32 = 0.05;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct MovingSplashVertex {
    /// Position relative to the group, which follows the avatar at surface height.
    pub position: Vec3,
    pub scale: f32,
    pub broken: f32,
    pub texture_rotation: f32,
    /// `1` for soft trailing splashes drawn without alpha cutout.
    pub non_cutout: f32,
}

const IDLE: MovingSplashVertex = MovingSplashVertex {
    position: Vec3::ZERO,
    scale: 0.0,
    broken: 1.0,
    texture_rotation: 0.0,
    non_cutout: 0.0,
};

/// Host-side physics of one splash particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SplashState {
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Multiplier on the base decay increment.
    pub decay_rate: f32,
}

fn dissolved(v: &MovingSplashVertex, _: &SplashState) -> bool {
    v.broken >= 1.0
}

/// One emission request.
///
/// # Example
///
/// ```ignore
/// let report = splash.emit(&SplashBurst {
///     position: Vec3::new(0.0, -0.01, -0.2),
///     max_emit: 3,
///     scale: 0.8,
///     velocity: Vec3::new(0.02, 0.0, 0.02),
///     acceleration: Vec3::new(0.0, -0.001, 0.0),
///     decay_rate: 1.2,
///     non_cutout: false,
/// });
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplashBurst {
    /// Group-relative origin.
    pub position: Vec3,
    pub max_emit: usize,
    /// Base scale; each particle gets `(1 + random) * scale`.
    pub scale: f32,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub decay_rate: f32,
    pub non_cutout: bool,
}

pub struct MovingSplash {
    pool: ParticlePool<MovingSplashVertex, SplashState>,
    rng: SmallRng,
    transform: GroupTransform,
    uniforms: EffectUniforms,
}

impl MovingSplash {
    pub fn new(capacity: usize, rng: SmallRng) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: ParticlePool::new(EffectKind::MovingSplash, capacity, IDLE, dissolved)?,
            rng,
            transform: GroupTransform::default(),
            uniforms: EffectUniforms::default(),
        })
    }

    /// Emit up to `burst.max_emit` particles into available slots.
    ///
    /// Running out of slots is not an error; the shortfall is logged and
    /// reported back.
    pub fn emit(&mut self, burst: &SplashBurst) -> EmitReport {
        let mut emitted = 0;
        for i in 0..self.pool.capacity() {
            if emitted >= burst.max_emit {
                break;
            }
            if !self.pool.is_available(i) {
                continue;
            }
            let jitter = Vec3::new(
                self.rng.gen::<f32>() - 0.5,
                self.rng.gen::<f32>() - 0.5,
                self.rng.gen::<f32>() - 0.5,
            ) * JITTER;
            let vertex = MovingSplashVertex {
                position: burst.position + jitter,
                scale: (1.0 + self.rng.gen::<f32>()) * burst.scale,
                broken: 0.25 + 0.25 * self.rng.gen::<f32>(),
                texture_rotation: self.rng.gen::<f32>() * 2.0,
                non_cutout: if burst.non_cutout { 1.0 } else { 0.0 },
            };
            let state = SplashState {
                velocity: burst.velocity,
                acceleration: burst.acceleration,
                decay_rate: burst.decay_rate,
            };
            self.pool.emit(i, vertex, state);
            emitted += 1;
        }
        if emitted > 0 {
            self.pool.mark_dirty(MovingSplashVertex::ALL);
        }

        let report = EmitReport {
            requested: burst.max_emit,
            emitted,
        };
        report.log_saturation(EffectKind::MovingSplash);
        report
    }

    pub fn particle(&self, index: usize) -> &MovingSplashVertex {
        self.pool.vertex(index)
    }

    pub fn splash_state(&self, index: usize) -> &SplashState {
        self.pool.state(index)
    }

    pub fn transform(&self) -> GroupTransform {
        self.transform
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    #[cfg(test)]
    fn occupy(&mut self, index: usize) {
        self.pool.vertex_mut(index).broken = 0.5;
    }
}

impl Effect for MovingSplash {
    fn kind(&self) -> EffectKind {
        EffectKind::MovingSplash
    }

    fn advance(&mut self, frame: &FrameContext) {
        let step = frame.step;
        let dir = frame.player_dir;
        let moving = frame.is_moving();

        self.transform = GroupTransform {
            position: frame.surface_point(),
            rotation: Quat::IDENTITY,
            visible: true,
        };

        for i in 0..self.pool.capacity() {
            self.pool.advance(i, |v, state| {
                if v.broken < 1.0 {
                    v.broken += step.add(0.015 * state.decay_rate);
                    v.scale += step.add(0.05);
                    if moving {
                        // Trail behind the direction of travel.
                        let trailing = Vec3::new(
                            -dir.x * state.velocity.x,
                            state.velocity.y,
                            -dir.z * state.velocity.z,
                        );
                        v.position += trailing * step.count();
                    }
                    state.velocity += state.acceleration * step.count();
                } else {
                    v.scale = 0.0;
                }
            });
        }
        self.pool.mark_dirty(
            MovingSplashVertex::POSITION | MovingSplashVertex::SCALE | MovingSplashVertex::BROKEN,
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
