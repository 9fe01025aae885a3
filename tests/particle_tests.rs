// Host-side tests for the particle engine.
// The web crate is wasm-only, so these go through glimmer-core directly.

use glam::Vec2;
use glimmer_core::*;

fn cycling(speed: f32) -> Settings {
    Settings {
        color_mode: ColorMode::Cycle,
        color_speed: speed,
        ..Settings::default()
    }
}

#[test]
fn spawned_particles_start_within_ranges() {
    let settings = Settings::default();
    let mut engine = ParticleEngine::new(42);
    for _ in 0..200 {
        let p = engine.spawn(Vec2::new(50.0, 50.0), &settings);
        assert_eq!(p.pos, Vec2::new(50.0, 50.0));
        assert_eq!(p.life, 1.0);
        let speed = p.vel.length();
        assert!(
            (SPAWN_SPEED_MIN - 1e-4..=SPAWN_SPEED_MAX + 1e-4).contains(&speed),
            "speed {speed}"
        );
        assert!((SPAWN_DECAY_MIN..=SPAWN_DECAY_MAX).contains(&p.decay));
        assert!((SPAWN_SIZE_MIN..=SPAWN_SIZE_MAX).contains(&p.size));
        assert!((0.0..360.0).contains(&p.hue));
    }
    assert_eq!(engine.len(), 200);
}

#[test]
fn multipliers_scale_decay_and_size() {
    let settings = Settings {
        particle_decay: 2.0,
        particle_size: 0.5,
        ..Settings::default()
    };
    let mut engine = ParticleEngine::new(1);
    for _ in 0..50 {
        let p = engine.spawn(Vec2::ZERO, &settings);
        assert!(p.decay >= SPAWN_DECAY_MIN * 2.0 - 1e-6);
        assert!(p.decay <= SPAWN_DECAY_MAX * 2.0 + 1e-6);
        assert!(p.size >= SPAWN_SIZE_MIN * 0.5 - 1e-6);
        assert!(p.size <= SPAWN_SIZE_MAX * 0.5 + 1e-6);
    }
}

#[test]
fn zero_decay_multiplier_still_expires() {
    let settings = Settings {
        particle_decay: 0.0,
        ..Settings::default()
    };
    let mut engine = ParticleEngine::new(3);
    let p = engine.spawn(Vec2::ZERO, &settings);
    assert!(p.decay > 0.0);
}

#[test]
fn life_decreases_every_step_until_removal() {
    let settings = Settings::default();
    let mut engine = ParticleEngine::new(7);
    for i in 0..50 {
        engine.spawn(Vec2::new(i as f32, 0.0), &settings);
    }

    let mut previous: Vec<f32> = engine.particles().iter().map(|p| p.life).collect();
    engine.step();
    for (p, before) in engine.particles().iter().zip(&previous) {
        assert!(p.life < *before);
        assert!(p.life > 0.0);
    }

    // Slowest decay is 0.008 per step, so 200 steps retire everything
    for _ in 0..200 {
        previous = engine.particles().iter().map(|p| p.life).collect();
        engine.step();
        assert!(engine.len() <= previous.len());
        assert!(engine.particles().iter().all(|p| p.life > 0.0));
    }
    assert!(engine.is_empty());
}

#[test]
fn step_moves_then_applies_gravity() {
    let settings = Settings::default();
    let mut engine = ParticleEngine::new(9);
    let spawned = engine.spawn(Vec2::new(100.0, 100.0), &settings);
    engine.step();
    let p = engine.particles()[0];
    assert!((p.pos - (spawned.pos + spawned.vel)).length() < 1e-4);
    assert!((p.vel.y - (spawned.vel.y + GRAVITY_PER_FRAME)).abs() < 1e-5);
    assert!((p.vel.x - spawned.vel.x * HORIZONTAL_DRAG).abs() < 1e-5);
}

#[test]
fn cycling_hue_wraps_past_a_full_turn() {
    let settings = cycling(15.0);
    let mut engine = ParticleEngine::new(0).with_hue_cursor(HueCursor::new(350.0));
    let first = engine.spawn(Vec2::ZERO, &settings);
    let second = engine.spawn(Vec2::ZERO, &settings);
    assert_eq!(first.hue, 350.0);
    assert_eq!(second.hue, 5.0);
    assert_eq!(engine.hue_cursor().value(), 20.0);
}

#[test]
fn fixed_hue_ignores_the_cursor() {
    let settings = Settings {
        color_mode: ColorMode::Fixed,
        fixed_hue: 200.0,
        ..Settings::default()
    };
    let mut engine = ParticleEngine::new(0).with_hue_cursor(HueCursor::new(10.0));
    for _ in 0..10 {
        assert_eq!(engine.spawn(Vec2::ZERO, &settings).hue, 200.0);
    }
    assert_eq!(engine.hue_cursor().value(), 10.0);
}

#[test]
fn same_seed_same_particles() {
    let settings = Settings::default();
    let mut a = ParticleEngine::new(99);
    let mut b = ParticleEngine::new(99);
    for _ in 0..20 {
        assert_eq!(a.spawn(Vec2::ONE, &settings), b.spawn(Vec2::ONE, &settings));
    }
}
