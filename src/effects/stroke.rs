//! When and where hand strokes and footsteps throw splashes.
//!
//! [`StrokeSplashes`] edge-detects the active hand or foot and turns each
//! change into [`SplashBurst`]s for the [`MovingSplash`] pool. While a hand
//! stays active it also drips small trailing splashes near the body.

use super::{FreestyleSplash, MovingSplash, SplashBurst};
use crate::avatar::{Side, SwimStyle};
use crate::frame::{FrameContext, MOVING_SPEED};
use crate::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;

/// Minimum milliseconds between trailing splashes.
const TRAIL_INTERVAL_MS: f64 = 30.0;
const STROKE_VELOCITY: Vec3 = Vec3::new(0.03, 0.015, 0.03);
const STROKE_ACCELERATION: Vec3 = Vec3::new(0.0, -0.001, 0.0);
const STEP_VELOCITY: Vec3 = Vec3::new(0.02, 0.0, 0.02);

/// Stroke and step edge detector.
pub struct StrokeSplashes {
    rng: SmallRng,
    last_hand: Option<Side>,
    last_step: Option<Side>,
    last_trail_ms: f64,
}

impl StrokeSplashes {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            rng,
            last_hand: None,
            last_step: None,
            last_trail_ms: f64::NEG_INFINITY,
        }
    }

    /// Splashes for one swimming frame.
    ///
    /// A change of stroke hand throws the main splash (and, for freestyle,
    /// an overhead arc); an active hand adds trailing splashes.
    pub fn handle_swimming(
        &mut self,
        frame: &FrameContext,
        style: SwimStyle,
        splash: &mut MovingSplash,
        freestyle: Option<&mut FreestyleSplash>,
    ) {
        if frame.speed < MOVING_SPEED {
            return;
        }
        let hand = frame.swimming_hand;
        let dir = frame.player_dir;
        let lateral = frame.lateral();
        let shoulder = frame.shoulder_width;

        if hand != self.last_hand {
            match style {
                SwimStyle::Breaststroke => {
                    let centre = dir * 0.5;
                    let scales = [
                        0.7 + 0.5 * self.rng.gen::<f32>(),
                        1.0 + 0.2 * self.rng.gen::<f32>(),
                    ];
                    for (sign, scale) in [1.0f32, -1.0].into_iter().zip(scales) {
                        splash.emit(&SplashBurst {
                            position: flat(centre + lateral * shoulder * 0.8 * sign),
                            max_emit: 5,
                            scale,
                            velocity: STROKE_VELOCITY,
                            acceleration: STROKE_ACCELERATION,
                            decay_rate: 1.0,
                            non_cutout: false,
                        });
                    }
                }
                SwimStyle::Freestyle => {
                    let side = hand.map_or(-1.0, Side::sign);
                    splash.emit(&SplashBurst {
                        position: flat(dir * 0.5 + lateral * shoulder * 0.9 * side),
                        max_emit: 4,
                        scale: 1.2 + 0.2 * self.rng.gen::<f32>(),
                        velocity: STROKE_VELOCITY,
                        acceleration: STROKE_ACCELERATION,
                        decay_rate: 1.1,
                        non_cutout: false,
                    });
                    if let Some(freestyle) = freestyle {
                        freestyle.emit(frame);
                    }
                }
            }
        }
        self.last_hand = hand;

        let Some(hand) = hand else {
            return;
        };
        if frame.timestamp_ms - self.last_trail_ms <= TRAIL_INTERVAL_MS {
            return;
        }
        self.last_trail_ms = frame.timestamp_ms;

        let (right_scale, left_scale, speed, decay_rate) = match style {
            SwimStyle::Freestyle => {
                let strong = 0.9 + 0.2 * self.rng.gen::<f32>();
                let weak = 0.6 + 0.2 * self.rng.gen::<f32>();
                match hand {
                    Side::Right => (strong, weak, 0.06, 0.7),
                    Side::Left => (weak, strong, 0.06, 0.7),
                }
            }
            SwimStyle::Breaststroke => (
                1.2 * frame.speed + 0.2 * self.rng.gen::<f32>(),
                1.2 * frame.speed + 0.2 * self.rng.gen::<f32>(),
                0.04,
                0.8,
            ),
        };

        for (sign, scale) in [(1.0f32, right_scale), (-1.0, left_scale)] {
            let jitter = Vec3::new(self.rng.gen::<f32>() - 0.5, 0.0, self.rng.gen::<f32>() - 0.5) * 0.2;
            let mut position = dir * 0.25 + lateral * 0.15 * sign + jitter;
            position.y = -0.02;
            splash.emit(&SplashBurst {
                position,
                max_emit: 1,
                scale: scale + 0.2 * self.rng.gen::<f32>(),
                velocity: Vec3::new(speed, -0.001, speed),
                acceleration: Vec3::ZERO,
                decay_rate,
                non_cutout: true,
            });
        }
    }

    /// Footstep splash on every change of the stepping foot.
    pub fn handle_walking(&mut self, frame: &FrameContext, step: Option<Side>, splash: &mut MovingSplash) {
        if step == self.last_step {
            return;
        }
        self.last_step = step;
        let Some(foot) = step else {
            return;
        };

        let damping = ((0.8 - frame.speed) * 10.0).max(1.0);
        let mut position = frame.player_dir * 0.2 + frame.lateral() * 0.1 * foot.sign();
        position.y = -0.01;
        splash.emit(&SplashBurst {
            position,
            max_emit: 3,
            scale: 0.5 + frame.speed + 0.2 * self.rng.gen::<f32>(),
            velocity: STEP_VELOCITY / damping,
            acceleration: Vec3::ZERO,
            decay_rate: 1.2,
            non_cutout: false,
        });
    }

    pub fn last_hand(&self) -> Option<Side> {
        self.last_hand
    }
}

/// Pin a group-relative offset to the surface plane.
fn flat(offset: Vec3) -> Vec3 {
    Vec3::new(offset.x, 0.0, offset.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use rand::SeedableRng;

    fn rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }

    fn swimming(hand: Option<Side>, timestamp_ms: f64) -> FrameContext {
        FrameContext {
            speed: 0.5,
            timestamp_ms,
            swimming_hand: hand,
            ..Default::default()
        }
    }

    #[test]
    fn test_breaststroke_hand_change_throws_two_fans() {
        let mut strokes = StrokeSplashes::new(rng(1));
        let mut splash = MovingSplash::new(50, rng(2)).unwrap();

        // no hand yet: nothing changes, no trail
        strokes.handle_swimming(&swimming(None, 0.0), SwimStyle::Breaststroke, &mut splash, None);
        assert_eq!(splash.active_count(), 0);

        strokes.handle_swimming(&swimming(Some(Side::Left), 100.0), SwimStyle::Breaststroke, &mut splash, None);
        // 2 x 5 stroke particles + 2 trailing
        assert_eq!(splash.active_count(), 12);
        assert_eq!(strokes.last_hand(), Some(Side::Left));

        // same hand within the trail interval: nothing new
        strokes.handle_swimming(&swimming(Some(Side::Left), 110.0), SwimStyle::Breaststroke, &mut splash, None);
        assert_eq!(splash.active_count(), 12);

        // same hand after the interval: trail only
        strokes.handle_swimming(&swimming(Some(Side::Left), 140.0), SwimStyle::Breaststroke, &mut splash, None);
        assert_eq!(splash.active_count(), 14);
    }

    #[test]
    fn test_trailing_splashes_do_not_accelerate() {
        let mut strokes = StrokeSplashes::new(rng(12));
        let mut splash = MovingSplash::new(20, rng(13)).unwrap();

        strokes.handle_swimming(&swimming(Some(Side::Right), 0.0), SwimStyle::Breaststroke, &mut splash, None);
        assert_eq!(splash.splash_state(0).acceleration, STROKE_ACCELERATION);

        // hand unchanged after the interval: only the two trailing splashes
        strokes.handle_swimming(&swimming(Some(Side::Right), 50.0), SwimStyle::Breaststroke, &mut splash, None);
        assert_eq!(splash.active_count(), 14);
        for i in 12..14 {
            let state = splash.splash_state(i);
            assert_eq!(state.acceleration, Vec3::ZERO);
            assert_eq!(state.velocity, Vec3::new(0.04, -0.001, 0.04));
        }
    }

    #[test]
    fn test_freestyle_stroke_side() {
        let mut strokes = StrokeSplashes::new(rng(3));
        let mut splash = MovingSplash::new(50, rng(4)).unwrap();
        let mut arcs = FreestyleSplash::new(4, 0.29, rng(5)).unwrap();

        strokes.handle_swimming(
            &swimming(Some(Side::Right), 0.0),
            SwimStyle::Freestyle,
            &mut splash,
            Some(&mut arcs),
        );
        // 4 stroke particles + 2 trailing, one overhead arc
        assert_eq!(splash.active_count(), 6);
        assert_eq!(arcs.active_count(), 1);

        // facing -Z puts the right hand on +X
        let stroke_x: f32 = (0..4).map(|i| splash.particle(i).position.x).sum::<f32>() / 4.0;
        assert!(stroke_x > 0.3);
    }

    #[test]
    fn test_slow_swimmer_throws_nothing() {
        let mut strokes = StrokeSplashes::new(rng(6));
        let mut splash = MovingSplash::new(20, rng(7)).unwrap();
        let frame = FrameContext {
            speed: 0.05,
            swimming_hand: Some(Side::Left),
            ..Default::default()
        };
        strokes.handle_swimming(&frame, SwimStyle::Breaststroke, &mut splash, None);
        assert_eq!(splash.active_count(), 0);
        assert_eq!(strokes.last_hand(), None);
    }

    #[test]
    fn test_walking_splash_on_foot_change() {
        let mut strokes = StrokeSplashes::new(rng(8));
        let mut splash = MovingSplash::new(20, rng(9)).unwrap();
        let frame = FrameContext {
            speed: 0.3,
            ..Default::default()
        };

        strokes.handle_walking(&frame, Some(Side::Left), &mut splash);
        assert_eq!(splash.active_count(), 3);
        // (0.8 - 0.3) * 10 = 5
        assert!((splash.splash_state(0).velocity - STEP_VELOCITY / 5.0).length() < 1e-6);

        strokes.handle_walking(&frame, Some(Side::Left), &mut splash);
        assert_eq!(splash.active_count(), 3);

        strokes.handle_walking(&frame, Some(Side::Right), &mut splash);
        assert_eq!(splash.active_count(), 6);
    }

    #[test]
    fn test_walking_fast_does_not_amplify_velocity() {
        let mut strokes = StrokeSplashes::new(rng(10));
        let mut splash = MovingSplash::new(20, rng(11)).unwrap();
        let frame = FrameContext {
            speed: 0.9,
            ..Default::default()
        };
        strokes.handle_walking(&frame, Some(Side::Right), &mut splash);
        assert_eq!(splash.splash_state(0).velocity, STEP_VELOCITY);
    }
}
