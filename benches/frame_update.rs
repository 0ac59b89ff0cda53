//! Benchmarks for per-frame simulation cost.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use waterfx::prelude::*;
use waterfx::MovingSplash;
use waterfx::SplashBurst;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn swimmer() -> AvatarSnapshot {
    AvatarSnapshot {
        position: Vec3::new(0.0, 0.3, 0.0),
        velocity: Vec3::new(0.0, 0.0, -5.0),
        in_water: true,
        swimming_hand: Some(Side::Left),
        ..Default::default()
    }
    .swimming(Some(SwimStyle::Freestyle))
}

fn bench_orchestrator(c: &mut Criterion) {
    let mut group = c.benchmark_group("water_update");
    let scene = SceneSnapshot::default();

    for (name, config) in [("full", WaterConfig::full()), ("minimal", WaterConfig::minimal())] {
        group.bench_function(name, |b| {
            let mut water = WaterInteraction::new(config.clone().with_seed(1)).unwrap();
            let mut avatar = swimmer();
            let mut now = 0.0;
            b.iter(|| {
                now += 16.0;
                avatar.swimming_hand = if (now as u64 / 500) % 2 == 0 {
                    Some(Side::Left)
                } else {
                    Some(Side::Right)
                };
                let frame = water.update_at(&avatar, &scene, now, 1.0 / 60.0);
                water.clear_dirty();
                black_box(frame)
            })
        });
    }

    group.bench_function("dive", |b| {
        let mut water = WaterInteraction::new(WaterConfig::full().with_seed(2)).unwrap();
        let dry = AvatarSnapshot {
            position: Vec3::new(0.0, 2.0, 0.0),
            ..Default::default()
        };
        let wet = AvatarSnapshot {
            in_water: true,
            vertical_velocity: -6.0,
            ..dry
        };
        let mut now = 0.0;
        b.iter(|| {
            now += 16.0;
            water.update_at(&dry, &scene, now, 1.0 / 60.0);
            now += 16.0;
            black_box(water.update_at(&wet, &scene, now, 1.0 / 60.0))
        })
    });

    group.finish();
}

fn bench_splash_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("moving_splash");
    let frame = FrameContext {
        speed: 0.5,
        ..Default::default()
    };

    for capacity in [200usize, 1_000, 5_000] {
        group.bench_with_input(BenchmarkId::new("emit_advance", capacity), &capacity, |b, &capacity| {
            let mut splash = MovingSplash::new(capacity, SmallRng::seed_from_u64(3)).unwrap();
            let burst = SplashBurst {
                position: Vec3::ZERO,
                max_emit: 5,
                scale: 1.0,
                velocity: Vec3::new(0.03, 0.015, 0.03),
                acceleration: Vec3::new(0.0, -0.001, 0.0),
                decay_rate: 1.0,
                non_cutout: false,
            };
            b.iter(|| {
                black_box(splash.emit(&burst));
                splash.advance(&frame);
            })
        });
    }

    group.finish();
}

fn bench_layers(c: &mut Criterion) {
    let mut water = WaterInteraction::new(WaterConfig::full().with_seed(4)).unwrap();
    let scene = SceneSnapshot::default();
    water.update_at(&swimmer(), &scene, 0.0, 1.0 / 60.0);

    c.bench_function("collect_layers", |b| {
        b.iter(|| {
            let bytes: usize = water.layers().iter().map(|layer| layer.vertices.len()).sum();
            black_box(bytes)
        })
    });
}

criterion_group!(benches, bench_orchestrator, bench_splash_pool, bench_layers);
criterion_main!(benches);
