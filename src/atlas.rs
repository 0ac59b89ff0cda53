//! Sprite atlas stepping for animated droplets and bubbles.
//!
//! Both effects sample a 30-frame sheet laid out as 6 rows of 5 cells and
//! advance one frame every second simulation tick.

use glam::Vec2;
use rand::Rng;

/// Frames in the sheet.
pub const ATLAS_FRAMES: u32 = 30;

/// UV offset of `frame` within the sheet.
pub fn atlas_uv(frame: u32) -> Vec2 {
    Vec2::new(
        5.0 / 6.0 - (frame / 6) as f32 * (1.0 / 6.0),
        (frame % 5) as f32 * 0.2,
    )
}

/// Current frame and tick count of one animated particle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AtlasCursor {
    frame: u32,
    ticks: u32,
}

impl AtlasCursor {
    /// Start at a random frame, never the last one.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            frame: rng.gen_range(0..ATLAS_FRAMES - 1),
            ticks: 0,
        }
    }

    pub fn at(frame: u32) -> Self {
        Self {
            frame: frame % ATLAS_FRAMES,
            ticks: 0,
        }
    }

    /// Count one tick, moving to the next frame on every second tick.
    pub fn tick(&mut self) {
        self.ticks += 1;
        if self.ticks % 2 == 0 {
            self.frame += 1;
        }
        if self.frame >= ATLAS_FRAMES {
            self.frame = 0;
        }
    }

    #[inline]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Ticks since emission.
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    #[inline]
    pub fn uv(&self) -> Vec2 {
        atlas_uv(self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_uv_corners() {
        assert_eq!(atlas_uv(0), Vec2::new(5.0 / 6.0, 0.0));
        let last = atlas_uv(29);
        assert!((last.x - 0.0).abs() < 1e-6);
        assert!((last.y - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_frame_advances_every_second_tick() {
        let mut cursor = AtlasCursor::at(3);
        cursor.tick();
        assert_eq!(cursor.frame(), 3);
        cursor.tick();
        assert_eq!(cursor.frame(), 4);
        assert_eq!(cursor.ticks(), 2);
    }

    #[test]
    fn test_frame_wraps() {
        let mut cursor = AtlasCursor::at(29);
        cursor.tick();
        cursor.tick();
        assert_eq!(cursor.frame(), 0);
    }

    #[test]
    fn test_random_start_in_range() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..100 {
            assert!(AtlasCursor::random(&mut rng).frame() < ATLAS_FRAMES - 1);
        }
    }
}
