//! Expanding ring left on the surface where the avatar dives in.

use super::{Effect, EffectKind, LayerView};
use crate::error::ConfigError;
use crate::frame::FrameContext;
use crate::pool::ParticlePool;
use crate::uniforms::{EffectUniforms, GroupTransform};
use crate::{Attributes, Vec3};
use bytemuck::{Pod, Zeroable};

/// Falling speed above which the ring stops growing faster.
const MAX_FALLING_SPEED: f32 = 10.0;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Attributes)]
pub struct DivingRippleVertex {
    pub position: Vec3,
    pub scale: Vec3,
    pub broken: f32,
    /// Animation clock driving the ring's noise.
    pub time: f32,
}

const IDLE: DivingRippleVertex = DivingRippleVertex {
    position: Vec3::ZERO,
    scale: Vec3::new(0.25, 1.0, 0.25),
    broken: 1.0,
    time: 0.0,
};

fn dissolved(v: &DivingRippleVertex, _: &()) -> bool {
    v.broken >= 1.0
}

/// Single ring, restarted on every dive.
///
/// Growth follows the current frame's falling speed, so only the entry frame
/// grows faster than the base rate.
pub struct DivingRipple {
    pool: ParticlePool<DivingRippleVertex>,
    visible: bool,
    uniforms: EffectUniforms,
}

impl DivingRipple {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            pool: ParticlePool::new(EffectKind::DivingRipple, 1, IDLE, dissolved)?,
            visible: false,
            uniforms: EffectUniforms::default(),
        })
    }

    /// Restart the ring at `contact_point`.
    pub fn emit(&mut self, contact_point: Vec3) {
        self.visible = true;
        self.pool.emit(
            0,
            DivingRippleVertex {
                position: contact_point,
                scale: Vec3::new(0.25, 1.0, 0.25),
                broken: 0.1,
                time: 120.0,
            },
            (),
        );
        self.pool.mark_dirty(DivingRippleVertex::ALL);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn ring(&self) -> &DivingRippleVertex {
        self.pool.vertex(0)
    }
}

impl Effect for DivingRipple {
    fn kind(&self) -> EffectKind {
        EffectKind::DivingRipple
    }

    fn advance(&mut self, frame: &FrameContext) {
        let step = frame.step;
        if self.pool.is_available(0) {
            self.visible = false;
            return;
        }

        let growth = 1.0 + frame.falling_speed.clamp(0.0, MAX_FALLING_SPEED) * 0.1;
        self.pool.advance(0, |v, _| {
            if v.scale.x > 0.15 * growth {
                v.broken *= step.mul(1.025);
            }
            v.scale.x += step.add(0.007 * growth);
            v.scale.z += step.add(0.007 * growth);
            v.time += step.add(0.015);
        });
        self.pool
            .mark_dirty(DivingRippleVertex::SCALE | DivingRippleVertex::BROKEN | DivingRippleVertex::TIME);
    }

    fn layers(&self) -> Vec<LayerView<'_>> {
        let transform = GroupTransform {
            visible: self.visible,
            ..GroupTransform::WORLD
        };
        vec![LayerView::of(self.kind(), "ring", &self.pool, self.uniforms, transform)]
    }

    fn clear_dirty(&mut self) {
        self.pool.take_dirty();
    }

    fn active_count(&self) -> usize {
        self.pool.active_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_after_construction() {
        let ripple = DivingRipple::new().unwrap();
        assert!(!ripple.is_visible());
        assert_eq!(ripple.active_count(), 0);
    }

    fn falling(falling_speed: f32) -> FrameContext {
        FrameContext {
            falling_speed,
            ..Default::default()
        }
    }

    #[test]
    fn test_emit_sets_birth_state() {
        let mut ripple = DivingRipple::new().unwrap();
        ripple.emit(Vec3::new(1.0, 0.5, 2.0));

        let ring = ripple.ring();
        assert!(ripple.is_visible());
        assert_eq!(ring.position, Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(ring.broken, 0.1);
        assert_eq!(ring.scale, Vec3::new(0.25, 1.0, 0.25));
        assert_eq!(ring.time, 120.0);
    }

    #[test]
    fn test_grows_then_hides() {
        let mut ripple = DivingRipple::new().unwrap();
        ripple.emit(Vec3::ZERO);

        ripple.advance(&falling(3.0));
        let ring = *ripple.ring();
        assert!((ring.scale.x - (0.25 + 0.007 * 1.3)).abs() < 1e-6);
        // 0.25 already exceeds 0.15 * 1.3, so decay starts immediately
        assert!((ring.broken - 0.1 * 1.025).abs() < 1e-6);

        let frame = FrameContext::default();
        for _ in 0..500 {
            ripple.advance(&frame);
        }
        assert!(ripple.ring().broken >= 1.0);
        assert!(!ripple.is_visible());
    }

    #[test]
    fn test_fast_dive_delays_decay() {
        let mut ripple = DivingRipple::new().unwrap();
        ripple.emit(Vec3::ZERO);
        // clamped to 10: growth 2.0 puts the threshold at 0.3, above the birth scale
        ripple.advance(&falling(50.0));
        assert_eq!(ripple.ring().broken, 0.1);
        assert!((ripple.ring().scale.x - 0.264).abs() < 1e-6);
    }

    #[test]
    fn test_growth_returns_to_base_rate_after_entry_frame() {
        let mut ripple = DivingRipple::new().unwrap();
        ripple.emit(Vec3::ZERO);
        ripple.advance(&falling(10.0));
        let entry = ripple.ring().scale.x;

        ripple.advance(&FrameContext::default());
        let ring = ripple.ring();
        assert!((ring.scale.x - entry - 0.007).abs() < 1e-6);
        // threshold is back to 0.15, so decay is running
        assert!(ring.broken > 0.1);
    }
}
