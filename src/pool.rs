//! Fixed-capacity particle pools.
//!
//! A [`ParticlePool`] pairs the GPU-visible [`AttributeBuffer`] of an effect
//! with a parallel array of host-only physics state. Slots are never created
//! or destroyed: emission overwrites an available slot with its birth state,
//! and the effect's advance step pushes it back toward availability.
//!
//! # Reuse Policies
//!
//! | Policy | Used by | Behaviour under pressure |
//! |--------|---------|--------------------------|
//! | Scan for available | splashes, bubbles, body drops | Emits fewer than asked |
//! | [`RingCursor`] | moving ripples | Overwrites still-animating slots |
//! | Whole-pool burst | diving splashes, droplets | Restarts every slot |

use crate::attributes::{AttributeBuffer, Attributes, ChannelMask};
use crate::error::ConfigError;
use crate::EffectKind;
use std::ops::Range;

/// Availability predicate of an effect: is this slot free for emission?
pub type AvailableFn<V, S> = fn(&V, &S) -> bool;

/// Fixed-capacity arena of particle slots.
#[derive(Clone, Debug)]
pub struct ParticlePool<V: Attributes, S = ()> {
    vertices: AttributeBuffer<V>,
    state: Vec<S>,
    available: AvailableFn<V, S>,
}

impl<V: Attributes, S: Clone + Default> ParticlePool<V, S> {
    /// Create `capacity` idle slots.
    ///
    /// `idle` must satisfy `available`, so that every slot can be emitted
    /// into right after construction.
    pub fn new(
        effect: EffectKind,
        capacity: usize,
        idle: V,
        available: AvailableFn<V, S>,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity { effect });
        }
        debug_assert!(available(&idle, &S::default()), "idle {effect} slot must be available");
        Ok(Self {
            vertices: AttributeBuffer::new(capacity, idle),
            state: vec![S::default(); capacity],
            available,
        })
    }
}

impl<V: Attributes, S> ParticlePool<V, S> {
    #[inline]
    pub fn capacity(&self) -> usize {
        self.state.len()
    }

    #[inline]
    pub fn is_available(&self, index: usize) -> bool {
        (self.available)(self.vertices.get(index), &self.state[index])
    }

    /// Lowest available index within `range`.
    pub fn first_available(&self, range: Range<usize>) -> Option<usize> {
        range.into_iter().find(|&i| self.is_available(i))
    }

    /// Number of slots currently animating.
    pub fn active_count(&self) -> usize {
        (0..self.capacity()).filter(|&i| !self.is_available(i)).count()
    }

    /// Overwrite a slot with its birth state.
    pub fn emit(&mut self, index: usize, vertex: V, state: S) {
        *self.vertices.get_mut(index) = vertex;
        self.state[index] = state;
    }

    /// Apply one simulation step to a slot.
    ///
    /// Returns `true` when the slot became available during this step.
    pub fn advance<F>(&mut self, index: usize, step: F) -> bool
    where
        F: FnOnce(&mut V, &mut S),
    {
        let was_available = self.is_available(index);
        step(self.vertices.get_mut(index), &mut self.state[index]);
        !was_available && self.is_available(index)
    }

    #[inline]
    pub fn vertex(&self, index: usize) -> &V {
        self.vertices.get(index)
    }

    #[inline]
    pub fn vertex_mut(&mut self, index: usize) -> &mut V {
        self.vertices.get_mut(index)
    }

    #[inline]
    pub fn state(&self, index: usize) -> &S {
        &self.state[index]
    }

    #[inline]
    pub fn state_mut(&mut self, index: usize) -> &mut S {
        &mut self.state[index]
    }

    /// Both halves of a slot.
    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> (&mut V, &mut S) {
        (self.vertices.get_mut(index), &mut self.state[index])
    }

    #[inline]
    pub fn mark_dirty(&mut self, mask: ChannelMask) {
        self.vertices.mark_dirty(mask);
    }

    pub fn take_dirty(&mut self) -> ChannelMask {
        self.vertices.take_dirty()
    }

    pub fn vertices(&self) -> &AttributeBuffer<V> {
        &self.vertices
    }
}

/// Round-robin emission index over a reserved sub-range.
///
/// Emission is O(1); when the sub-range saturates the cursor overwrites the
/// oldest slot even if it is still animating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingCursor {
    range: Range<usize>,
    next: usize,
}

impl RingCursor {
    /// Cursor over `range`, starting at its first index.
    pub fn new(range: Range<usize>) -> Self {
        debug_assert!(!range.is_empty(), "cursor range must not be empty");
        Self {
            next: range.start,
            range,
        }
    }

    /// Index the next emission writes to.
    #[inline]
    pub fn current(&self) -> usize {
        self.next
    }

    /// Move past the current index, wrapping at the range end.
    pub fn advance(&mut self) {
        self.next += 1;
        if self.next >= self.range.end {
            self.next = self.range.start;
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
}

/// Outcome of a scanning emission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub requested: usize,
    pub emitted: usize,
}

impl EmitReport {
    /// Whether the pool ran out of available slots.
    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.emitted < self.requested
    }

    /// Emissions that found no slot.
    #[inline]
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.emitted)
    }

    /// Log a diagnostic when the pool saturated.
    pub(crate) fn log_saturation(&self, effect: EffectKind) {
        if self.is_saturated() {
            log::debug!(
                "{} pool saturated: emitted {} of {} requested particles",
                effect,
                self.emitted,
                self.requested
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, Vec3};
    use bytemuck::{Pod, Zeroable};

    #[repr(C)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Attributes)]
    struct Dot {
        position: Vec3,
        broken: f32,
    }

    const IDLE: Dot = Dot {
        position: Vec3::ZERO,
        broken: 1.0,
    };

    fn dissolved(v: &Dot, _: &()) -> bool {
        v.broken >= 1.0
    }

    fn pool(capacity: usize) -> ParticlePool<Dot> {
        ParticlePool::new(EffectKind::MovingSplash, capacity, IDLE, dissolved).unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = ParticlePool::<Dot>::new(EffectKind::Bubble, 0, IDLE, dissolved).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroCapacity { effect: EffectKind::Bubble }));
    }

    #[test]
    fn test_all_slots_available_after_construction() {
        let pool = pool(8);
        assert!((0..8).all(|i| pool.is_available(i)));
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_advance_reports_recycling_once() {
        let mut pool = pool(2);
        pool.emit(0, Dot { position: Vec3::ZERO, broken: 0.5 }, ());
        assert!(!pool.is_available(0));

        let mut recycled = 0;
        for _ in 0..10 {
            if pool.advance(0, |v, _| v.broken += 0.25) {
                recycled += 1;
            }
        }
        assert_eq!(recycled, 1);
        assert!(pool.is_available(0));
    }

    #[test]
    fn test_first_available_respects_range() {
        let mut pool = pool(6);
        pool.emit(3, Dot { position: Vec3::ZERO, broken: 0.0 }, ());
        assert_eq!(pool.first_available(3..6), Some(4));
        assert_eq!(pool.first_available(3..4), None);
    }

    #[test]
    fn test_ring_cursor_wraps_at_boundary() {
        let mut cursor = RingCursor::new(4..7);
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(cursor.current());
            cursor.advance();
        }
        assert_eq!(seen, vec![4, 5, 6, 4, 5, 6, 4]);
        assert!(seen.iter().all(|i| cursor.range().contains(i)));
    }

    #[test]
    fn test_emit_report() {
        let report = EmitReport { requested: 5, emitted: 3 };
        assert!(report.is_saturated());
        assert_eq!(report.shortfall(), 2);
        assert!(!EmitReport { requested: 1, emitted: 1 }.is_saturated());
    }
}
