//! End-to-end scenarios for the water interaction orchestrator.

use std::cell::RefCell;
use std::rc::Rc;
use waterfx::prelude::*;

const FRAME_SECS: f32 = 1.0 / 60.0;

fn water(config: WaterConfig) -> WaterInteraction {
    WaterInteraction::new(config.with_seed(42)).unwrap()
}

fn airborne() -> AvatarSnapshot {
    AvatarSnapshot {
        position: Vec3::new(1.0, 0.2, -2.0),
        vertical_velocity: -6.0,
        ..Default::default()
    }
}

fn splashdown() -> AvatarSnapshot {
    AvatarSnapshot {
        in_water: true,
        ..airborne()
    }
}

fn swimmer(speed: f32) -> AvatarSnapshot {
    AvatarSnapshot {
        position: Vec3::new(0.0, 0.3, 0.0),
        velocity: Vec3::new(0.0, 0.0, -speed * 10.0),
        in_water: true,
        ..Default::default()
    }
    .swimming(Some(SwimStyle::Freestyle))
}

fn count(water: &WaterInteraction, kind: EffectKind) -> usize {
    water.effect(kind).map_or(0, |effect| effect.active_count())
}

// ============================================================================
// Diving
// ============================================================================

#[test]
fn test_dive_fires_every_dive_effect() {
    let played = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = Rc::clone(&played);
    let mut water = water(WaterConfig::full())
        .with_sound_catalog(["water/jump_water.wav", "water/jump_water3.wav", "water/swim.wav"])
        .unwrap()
        .with_sound_player(move |clip: &str| sink.borrow_mut().push(clip.to_string()));
    let scene = SceneSnapshot::default();

    water.update_at(&airborne(), &scene, 0.0, FRAME_SECS);
    assert!(played.borrow().is_empty());

    let frame = water.update_at(&splashdown(), &scene, 16.0, FRAME_SECS);
    assert_eq!(frame.falling_speed, 6.0);
    assert_eq!(water.state().contact_point, Vec3::new(1.0, 0.0, -2.0));

    assert!(water.diving_ripple().unwrap().is_visible());
    assert_eq!(water.diving_ripple().unwrap().ring().position, Vec3::new(1.0, 0.0, -2.0));
    assert_eq!(count(&water, EffectKind::DivingLowerSplash), 10);
    assert_eq!(count(&water, EffectKind::DivingHigherSplash), 15);
    assert!(count(&water, EffectKind::Droplet) > 0);

    let played = played.borrow();
    assert_eq!(played.len(), 1);
    assert!(played[0].starts_with("water/jump_water"));
}

#[test]
fn test_staying_in_water_does_not_dive_again() {
    let mut water = water(WaterConfig::full());
    let scene = SceneSnapshot::default();
    water.update_at(&airborne(), &scene, 0.0, FRAME_SECS);
    water.update_at(&splashdown(), &scene, 16.0, FRAME_SECS);

    let frame = water.update_at(&splashdown(), &scene, 32.0, FRAME_SECS);
    assert_eq!(frame.falling_speed, 0.0);
}

#[test]
fn test_dive_without_player_or_catalog_is_silent() {
    let mut water = water(WaterConfig::full());
    assert!(water.diving_sounds().is_empty());
    let scene = SceneSnapshot::default();
    water.update_at(&airborne(), &scene, 0.0, FRAME_SECS);
    water.update_at(&splashdown(), &scene, 16.0, FRAME_SECS);
    assert!(water.diving_ripple().unwrap().is_visible());
}

#[test]
fn test_everything_recycles_after_a_dive() {
    let mut water = water(WaterConfig::full());
    let scene = SceneSnapshot::default();
    water.update_at(&airborne(), &scene, 0.0, FRAME_SECS);
    water.update_at(&splashdown(), &scene, 16.0, FRAME_SECS);

    let dry = AvatarSnapshot {
        vertical_velocity: 0.0,
        ..airborne()
    };
    for k in 0..600 {
        water.update_at(&dry, &scene, 20_000.0 + k as f64 * 16.0, FRAME_SECS);
    }
    for (kind, active) in water.active_counts() {
        assert_eq!(active, 0, "{kind} still animating");
    }
    assert!(!water.diving_ripple().unwrap().is_visible());
}

// ============================================================================
// Swimming
// ============================================================================

#[test]
fn test_swimming_on_surface_leaves_ripples_and_splashes() {
    let mut water = water(WaterConfig::full());
    let scene = SceneSnapshot::default();
    let mut avatar = swimmer(0.5);
    avatar.swimming_hand = Some(Side::Right);

    water.update_at(&avatar, &scene, 0.0, FRAME_SECS);
    assert!(water.state().swimming_above);
    assert!(count(&water, EffectKind::MovingRipple) >= 1);
    assert!(count(&water, EffectKind::MovingSplash) >= 4);
    assert_eq!(count(&water, EffectKind::FreestyleSplash), 1);
    assert!(count(&water, EffectKind::Bubble) > 0);
}

#[test]
fn test_swimming_underwater_only_bubbles() {
    let mut water = water(WaterConfig::full());
    let scene = SceneSnapshot::default();
    let mut avatar = swimmer(0.5);
    avatar.position.y = -1.0;
    avatar.swimming_hand = Some(Side::Left);

    water.update_at(&avatar, &scene, 0.0, FRAME_SECS);
    assert!(!water.state().swimming_above);
    assert_eq!(count(&water, EffectKind::MovingRipple), 0);
    assert_eq!(count(&water, EffectKind::MovingSplash), 0);
    assert!(count(&water, EffectKind::Bubble) > 0);
}

#[test]
fn test_static_ripple_after_floating_still() {
    let mut water = water(WaterConfig::full());
    let scene = SceneSnapshot::default();
    let still = swimmer(0.0);

    water.update_at(&still, &scene, 0.0, FRAME_SECS);
    water.update_at(&still, &scene, 1000.0, FRAME_SECS);
    assert!(!water.moving_ripple().unwrap().is_static_shown());

    water.update_at(&still, &scene, 1600.0, FRAME_SECS);
    let ripple = water.moving_ripple().unwrap();
    assert!(water.state().static_ripple);
    assert!(ripple.is_static_shown());
    assert_eq!(ripple.ripple(ripple.static_slot()).scale, 3.5);
    assert!(ripple.static_opacity() > 0.0);

    water.update_at(&swimmer(0.5), &scene, 1700.0, FRAME_SECS);
    let ripple = water.moving_ripple().unwrap();
    assert!(!water.state().static_ripple);
    assert_eq!(ripple.ripple(ripple.static_slot()).scale, 0.0);
    assert_eq!(ripple.static_opacity(), 0.0);
}

#[test]
fn test_static_ripple_needs_surface_swimming() {
    let mut water = water(WaterConfig::full());
    let scene = SceneSnapshot::default();
    let wading = AvatarSnapshot {
        position: Vec3::new(0.0, 0.3, 0.0),
        in_water: true,
        ..Default::default()
    };
    water.update_at(&wading, &scene, 0.0, FRAME_SECS);
    water.update_at(&wading, &scene, 3000.0, FRAME_SECS);
    assert!(!water.moving_ripple().unwrap().is_static_shown());
}

// ============================================================================
// Walking
// ============================================================================

#[test]
fn test_shallow_walking_splashes_on_each_step() {
    let mut water = water(WaterConfig::full().with_body_drops(None, 0));
    let scene = SceneSnapshot::default();
    let mut walker = AvatarSnapshot {
        position: Vec3::new(0.0, 1.0, 0.0),
        velocity: Vec3::new(3.0, 0.0, 0.0),
        in_water: true,
        current_step: Some(Side::Left),
        ..Default::default()
    };

    water.update_at(&walker, &scene, 0.0, FRAME_SECS);
    assert!(!water.state().walking_deep);
    assert_eq!(count(&water, EffectKind::MovingSplash), 3);

    water.update_at(&walker, &scene, 16.0, FRAME_SECS);
    assert_eq!(count(&water, EffectKind::MovingSplash), 3);

    walker.current_step = Some(Side::Right);
    water.update_at(&walker, &scene, 32.0, FRAME_SECS);
    assert_eq!(count(&water, EffectKind::MovingSplash), 6);
}

#[test]
fn test_deep_walking_leaves_ripples() {
    let mut water = water(WaterConfig::full());
    let scene = SceneSnapshot::default();
    let walker = AvatarSnapshot {
        position: Vec3::new(0.0, 0.5, 0.0),
        velocity: Vec3::new(3.0, 0.0, 0.0),
        in_water: true,
        current_step: Some(Side::Left),
        ..Default::default()
    };

    water.update_at(&walker, &scene, 0.0, FRAME_SECS);
    assert!(water.state().walking_deep);
    assert!(count(&water, EffectKind::MovingRipple) >= 1);
    assert_eq!(count(&water, EffectKind::MovingSplash), 0);
    assert!(count(&water, EffectKind::BodyDrop) <= 1);
}

// ============================================================================
// Step Conventions
// ============================================================================

#[test]
fn test_scaled_steps_match_elapsed_time() {
    let scene = SceneSnapshot::default();
    let mut per_frame = water(WaterConfig::minimal());
    let mut scaled =
        water(WaterConfig::minimal().with_step_mode(StepMode::Scaled { reference_fps: 60.0 }));

    for water in [&mut per_frame, &mut scaled] {
        water.update_at(&airborne(), &scene, 0.0, 1.0 / 30.0);
        water.update_at(&splashdown(), &scene, 33.0, 1.0 / 30.0);
    }

    let base = 0.25;
    let grown_once = per_frame.diving_ripple().unwrap().ring().scale.x - base;
    let grown_twice = scaled.diving_ripple().unwrap().ring().scale.x - base;
    assert!((grown_twice - 2.0 * grown_once).abs() < 1e-5);
}

// ============================================================================
// Render Hand-off
// ============================================================================

#[test]
fn test_layers_cover_every_pool() {
    let mut water = water(WaterConfig::full());
    let layers = water.layers();
    // droplets contribute a droplet layer and a landing-ripple layer
    assert_eq!(layers.len(), 10);
    for layer in &layers {
        assert_eq!(layer.vertices.len() % layer.stride, 0);
        assert!(!layer.is_empty());
        assert!(!layer.dirty.is_empty());
    }

    water.clear_dirty();
    assert!(water.layers().iter().all(|layer| layer.dirty.is_empty()));

    water.update_at(&swimmer(0.5), &SceneSnapshot::default(), 0.0, FRAME_SECS);
    assert!(water.layers().iter().any(|layer| !layer.dirty.is_empty()));
}

#[test]
fn test_uniforms_carry_scene_values() {
    let mut water = water(WaterConfig::full());
    let scene = SceneSnapshot {
        camera_rotation: Quat::from_rotation_y(1.0),
        water_surface_height: 0.25,
    };
    water.update_at(&swimmer(0.5), &scene, 2500.0, FRAME_SECS);

    for layer in water.layers() {
        match layer.kind {
            EffectKind::MovingRipple => assert_eq!(layer.uniforms.time, 2.5),
            EffectKind::DivingLowerSplash | EffectKind::Bubble => {
                assert_eq!(layer.uniforms.camera_billboard, scene.camera_rotation);
                assert_eq!(layer.uniforms.water_surface_pos, 0.25);
            }
            _ => {}
        }
    }
}
