// Host-side tests for pointer tracking and drag bursts.

use glam::Vec2;
use glimmer_core::*;

fn with_rate(spawn_rate: f32) -> Settings {
    Settings {
        spawn_rate,
        ..Settings::default()
    }
}

#[test]
fn hovering_does_nothing() {
    let mut tracker = PointerTracker::new(1);
    let settings = with_rate(1.0);
    assert!(tracker.move_to(Vec2::new(40.0, 40.0), &settings).is_none());
    assert_eq!(tracker.state().pos, Vec2::new(40.0, 40.0));
    assert!(!tracker.state().pressed);
}

#[test]
fn press_spawns_around_the_pointer() {
    let mut tracker = PointerTracker::new(2);
    let settings = Settings::default();
    let pos = Vec2::new(120.0, 80.0);
    let burst = tracker.press(pos, &settings).unwrap();
    assert!(tracker.state().pressed);
    assert_eq!(burst.spawns.len(), SPAWNS_PER_MOVE);
    for s in burst.spawns {
        let offset = s - pos;
        assert!(offset.x.abs() <= SPAWN_JITTER_PX);
        assert!(offset.y.abs() <= SPAWN_JITTER_PX);
    }
}

#[test]
fn every_drag_move_bursts_until_release() {
    let mut tracker = PointerTracker::new(3);
    let settings = Settings::default();
    tracker.press(Vec2::ZERO, &settings);
    for i in 1..20 {
        assert!(tracker.move_to(Vec2::splat(i as f32), &settings).is_some());
    }
    tracker.release();
    assert!(!tracker.state().pressed);
    assert!(tracker.move_to(Vec2::new(5.0, 5.0), &settings).is_none());
}

#[test]
fn tone_odds_follow_spawn_rate() {
    let mut always = PointerTracker::new(4);
    let mut never = PointerTracker::new(4);
    let (hi, lo) = (with_rate(1.0), with_rate(0.0));
    always.press(Vec2::ZERO, &hi);
    never.press(Vec2::ZERO, &lo);
    for i in 0..100 {
        let pos = Vec2::new(i as f32, 2.0 * i as f32);
        let burst = always.move_to(pos, &hi).unwrap();
        assert_eq!(burst.tone, Some(pos));
        assert_eq!(never.move_to(pos, &lo).unwrap().tone, None);
    }
}

#[test]
fn tone_rate_is_roughly_honoured() {
    let mut tracker = PointerTracker::new(5);
    let settings = with_rate(0.3);
    tracker.press(Vec2::ZERO, &settings);
    let tones = (0..2000)
        .filter_map(|_| tracker.move_to(Vec2::ONE, &settings))
        .filter(|b| b.tone.is_some())
        .count();
    assert!((450..750).contains(&tones), "tones {tones}");
}

#[test]
fn non_finite_positions_are_ignored() {
    let mut tracker = PointerTracker::new(6);
    let settings = Settings::default();
    tracker.press(Vec2::new(3.0, 4.0), &settings);
    assert!(tracker.move_to(Vec2::new(f32::NAN, 1.0), &settings).is_none());
    assert_eq!(tracker.state().pos, Vec2::new(3.0, 4.0));
}

#[test]
fn client_coordinates_become_canvas_local() {
    let local = canvas_local(Vec2::new(250.0, 130.0), Vec2::new(50.0, 30.0));
    assert_eq!(local, Vec2::new(200.0, 100.0));
}
