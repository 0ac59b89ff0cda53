//! Airborne droplets thrown up by a dive, each leaving a small ripple where
//! it lands.
//!
//! Two pools are involved: the droplets themselves and a [`DropletRipples`]
//! pool of the same capacity owned by the [`Droplet`] controller. When the
//! droplet in slot `i` crosses the water surface it writes a ripple into
//! slot `i` of the ripple pool, in the same advance call, exactly once.
//!
//! Droplets live in world space; the landing test compares their height with
//! the current frame's water surface.

use super::{Effect, EffectKind, LayerView};
use crate::atlas::AtlasCursor;
use crate::error::ConfigError;
use crate::frame::FrameContext;
use crate::pool::ParticlePool;
use crate::time::Step;
use crate::uniforms::{EffectUniforms, GroupTransform};
use crate::{Attributes, Vec2, Vec3};
use bytemuck::{Pod, Zeroable};
use rand::rngs::SmallRng;
use rand::Rng;

const GRAVITY: Vec3 = Vec3::new(0.0, -0.004, 0.0);
/// Scale below which a droplet is considered gone.
const INERT_SCALE: f32 = 0.001;
/// Scale a droplet snaps to once it has landed.
const LANDED_SCALE: f32 = 0.0001;
const SHRINK: f32 = 1.035;
const MAX_FALLING_SPEED: f32 = 10.0;
/// Ripples sit this far above the surface to avoid z-fighting.
const RIPPLE_LIFT: f32 = 0.01;

// ============================================================================
// DROPLETS
// ============================================================================

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct DropletVertex {
    pub position: Vec3,
    pub scale: f32,
    /// Atlas UV offset of the current sprite frame.
    pub offset: Vec2,
}

const IDLE_DROPLET: DropletVertex = DropletVertex {
    position: Vec3::ZERO,
    scale: 0.0,
    offset: Vec2::ZERO,
};

/// Host-side state of one droplet.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DropletState {
    pub velocity: Vec3,
    pub atlas: AtlasCursor,
    /// Set once the droplet has written its landing ripple.
    pub has_ripple: bool,
}

fn droplet_gone(v: &DropletVertex, _: &DropletState) -> bool {
    v.scale <= INERT_SCALE
}

/// Droplet controller with its chained ripple pool.
pub struct Droplet {
    pool: ParticlePool<DropletVertex, DropletState>,
    ripples: DropletRipples,
    rng: SmallRng,
    uniforms: EffectUniforms,
}

impl Droplet {
    /// Create `capacity` droplets and as many landing ripples.
    pub fn new(capacity: usize, rng: SmallRng) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: ParticlePool::new(EffectKind::Droplet, capacity, IDLE_DROPLET, droplet_gone)?,
            ripples: DropletRipples::new(capacity)?,
            rng,
            uniforms: EffectUniforms::default(),
        })
    }

    /// Throw a burst of droplets from `contact_point`.
    ///
    /// Harder dives throw more droplets; slots beyond the population keep a
    /// near-zero scale and never land.
    pub fn emit(&mut self, contact_point: Vec3, falling_speed: f32) {
        let falling = falling_speed.clamp(0.0, MAX_FALLING_SPEED);
        let capacity = self.pool.capacity();
        let population = (capacity as f32 * (falling / MAX_FALLING_SPEED) / 3.0) as usize;
        // Soft dives still throw with a noticeable spread.
        let spread = if falling < 5.0 { 7.0 } else { falling } / MAX_FALLING_SPEED;

        for i in 0..capacity {
            let velocity = Vec3::new(
                (self.rng.gen::<f32>() - 0.5) * spread,
                self.rng.gen::<f32>() * 1.4 * spread,
                (self.rng.gen::<f32>() - 0.5) * spread,
            ) / 20.0;
            let atlas = AtlasCursor::random(&mut self.rng);
            let scale = if i > population {
                INERT_SCALE
            } else {
                self.rng.gen::<f32>()
            };
            let vertex = DropletVertex {
                position: contact_point,
                scale,
                offset: atlas.uv(),
            };
            let state = DropletState {
                velocity,
                atlas,
                has_ripple: false,
            };
            self.pool.emit(i, vertex, state);
        }
        self.pool.mark_dirty(DropletVertex::ALL);
    }

    pub fn particle(&self, index: usize) -> &DropletVertex {
        self.pool.vertex(index)
    }

    pub fn droplet_state(&self, index: usize) -> &DropletState {
        self.pool.state(index)
    }

    pub fn ripples(&self) -> &DropletRipples {
        &self.ripples
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    #[cfg(test)]
    fn place(&mut self, index: usize, vertex: DropletVertex, state: DropletState) {
        self.pool.emit(index, vertex, state);
    }
}

impl Effect for Droplet {
    fn kind(&self) -> EffectKind {
        EffectKind::Droplet
    }

    fn advance(&mut self, frame: &FrameContext) {
        let step = frame.step;
        let surface = frame.water_surface_height;

        for i in 0..self.pool.capacity() {
            if self.pool.is_available(i) {
                continue;
            }
            let (vertex, state) = self.pool.slot_mut(i);
            if vertex.position.y >= surface {
                state.velocity += GRAVITY * step.count();
                vertex.scale /= step.mul(SHRINK);
                vertex.position += state.velocity * step.count();
                state.atlas.tick();
                vertex.offset = state.atlas.uv();
            } else if !state.has_ripple {
                vertex.scale = LANDED_SCALE;
                state.has_ripple = true;
                let landing = vertex.position;
                self.ripples.spawn(i, landing, surface, &mut self.rng);
            }
        }
        self.pool.mark_dirty(DropletVertex::ALL);
        self.ripples.advance(step, frame.timestamp_ms);

        self.uniforms.camera_billboard = frame.camera_rotation;
        self.uniforms.water_surface_pos = surface;
    }

    fn layers(&self) -> Vec<LayerView<'_>> {
        vec![
            LayerView::of(self.kind(), "droplets", &self.pool, self.uniforms, GroupTransform::WORLD),
            LayerView::of(
                self.kind(),
                "ripples",
                &self.ripples.pool,
                self.ripples.uniforms,
                GroupTransform::WORLD,
            ),
        ]
    }

    fn clear_dirty(&mut self) {
        self.pool.take_dirty();
        self.ripples.pool.take_dirty();
    }

    fn active_count(&self) -> usize {
        self.pool.active_count() + self.ripples.active_count()
    }
}

// ============================================================================
// LANDING RIPPLES
// ============================================================================

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct DropletRippleVertex {
    pub position: Vec3,
    pub scale: f32,
    pub broken: f32,
    pub wave_freq: f32,
}

const IDLE_RIPPLE: DropletRippleVertex = DropletRippleVertex {
    position: Vec3::ZERO,
    scale: 0.0,
    broken: 1.0,
    wave_freq: 0.0,
};

fn ripple_dissolved(v: &DropletRippleVertex, _: &()) -> bool {
    v.broken >= 1.0
}

/// Small rings written by landing droplets, one slot per droplet.
pub struct DropletRipples {
    pool: ParticlePool<DropletRippleVertex>,
    spawned: usize,
    uniforms: EffectUniforms,
}

impl DropletRipples {
    fn new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: ParticlePool::new(EffectKind::Droplet, capacity, IDLE_RIPPLE, ripple_dissolved)?,
            spawned: 0,
            uniforms: EffectUniforms::default(),
        })
    }

    /// Write a ripple into `index` at the landing point.
    ///
    /// The initial decay may already be close to dissolved, so some landings
    /// leave barely visible rings.
    fn spawn(&mut self, index: usize, landing: Vec3, surface: f32, rng: &mut SmallRng) {
        let vertex = DropletRippleVertex {
            position: Vec3::new(landing.x, surface + RIPPLE_LIFT, landing.z),
            scale: rng.gen::<f32>() * 0.2,
            broken: rng.gen::<f32>() - 0.8,
            wave_freq: rng.gen::<f32>() * (index % 10) as f32,
        };
        self.pool.emit(index, vertex, ());
        self.spawned += 1;
    }

    fn advance(&mut self, step: Step, timestamp_ms: f64) {
        for i in 0..self.pool.capacity() {
            self.pool.advance(i, |v, _| {
                if v.broken < 1.0 {
                    v.scale += step.add(0.02);
                    v.broken += step.add(0.02);
                }
            });
        }
        self.pool
            .mark_dirty(DropletRippleVertex::SCALE | DropletRippleVertex::BROKEN | DropletRippleVertex::POSITION);
        self.uniforms.time = (timestamp_ms / 1000.0) as f32;
    }

    pub fn ripple(&self, index: usize) -> &DropletRippleVertex {
        self.pool.vertex(index)
    }

    /// Ripples written since construction.
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }
}
