//! Headless walkthrough of the water effects.
//!
//! Scripts an avatar that dives in, swims freestyle, floats still, climbs out
//! and walks away, logging how many particles each effect is animating.
//!
//! Run with: `RUST_LOG=debug cargo run`

use waterfx::prelude::*;

/// Scripted phases, in seconds.
const DIVE_AT: f32 = 0.5;
const SWIM_UNTIL: f32 = 4.0;
const FLOAT_UNTIL: f32 = 6.5;
const CLIMB_OUT_AT: f32 = 6.5;
const END_AT: f32 = 9.0;

fn avatar_at(t: f32) -> AvatarSnapshot {
    let base = AvatarSnapshot {
        rotation: Quat::from_rotation_y(0.3),
        ..Default::default()
    };

    if t < DIVE_AT {
        // falling toward the pool
        return AvatarSnapshot {
            position: Vec3::new(0.0, 2.0 - t * 4.0, 0.0),
            vertical_velocity: -4.0 - t * 8.0,
            ..base
        };
    }
    if t < SWIM_UNTIL {
        let hand = if (t * 2.0) as u32 % 2 == 0 { Side::Left } else { Side::Right };
        return AvatarSnapshot {
            position: Vec3::new(0.0, 0.3, -(t - DIVE_AT) * 2.0),
            velocity: Vec3::new(0.0, 0.0, -5.0),
            // still carrying the fall on the first wet frame
            vertical_velocity: if t < DIVE_AT + 0.02 { -8.0 } else { 0.0 },
            in_water: true,
            swimming_hand: Some(hand),
            ..base
        }
        .swimming(Some(SwimStyle::Freestyle));
    }
    if t < FLOAT_UNTIL {
        return AvatarSnapshot {
            position: Vec3::new(0.0, 0.3, -7.0),
            in_water: true,
            ..base
        }
        .swimming(Some(SwimStyle::Breaststroke));
    }

    let walked = t - CLIMB_OUT_AT;
    let step = if (walked * 3.0) as u32 % 2 == 0 { Side::Left } else { Side::Right };
    AvatarSnapshot {
        position: Vec3::new(0.0, 0.6, -7.0 - walked * 1.5),
        velocity: Vec3::new(0.0, 0.0, -3.0),
        in_water: walked < 1.0,
        current_step: Some(step),
        ..base
    }
}

fn main() -> Result<(), ConfigError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let catalog = ["water/jump_water.wav", "water/jump_water2.wav", "water/swim1.wav"];
    let mut water = WaterInteraction::new(WaterConfig::full().with_seed(7))?
        .with_sound_catalog(catalog)?
        .with_sound_player(|clip: &str| log::info!("play {clip}"));

    let scene = SceneSnapshot::default();
    let mut time = Time::fixed(1.0 / 60.0);

    loop {
        let (elapsed_ms, _) = time.update();
        let t = (elapsed_ms / 1000.0) as f32;
        if t > END_AT {
            break;
        }

        water.update(&avatar_at(t), &scene, &time);

        if time.frame() % 30 == 0 {
            let counts: Vec<String> = water
                .active_counts()
                .into_iter()
                .filter(|(_, n)| *n > 0)
                .map(|(kind, n)| format!("{kind}={n}"))
                .collect();
            let bytes: usize = water.layers().iter().map(|layer| layer.vertices.len()).sum();
            log::info!("t={t:.1}s [{}] {bytes} bytes", counts.join(", "));
        }
        water.clear_dirty();
    }

    Ok(())
}
