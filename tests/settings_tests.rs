// Host-side tests for the settings store as the web entry points drive it.

use glam::Vec2;
use glimmer_core::*;
use serde_json::Value;

#[test]
fn exported_json_uses_page_keys() {
    let store = SettingsStore::default();
    let exported: Value = serde_json::from_str(&store.to_json()).unwrap();
    let obj = exported.as_object().unwrap();
    for key in [
        "masterVol",
        "delayTime",
        "feedback",
        "octaveShift",
        "spawnRate",
        "particleSize",
        "particleDecay",
        "filterBase",
        "colorMode",
        "fixedHue",
        "colorSpeed",
        "showGrid",
        "reflectionRadius",
        "reflectionStrength",
    ] {
        assert!(obj.contains_key(key), "missing {key}");
    }
    assert_eq!(obj["colorMode"], Value::from("cycle"));
    assert_eq!(obj["showGrid"], Value::from(true));
}

#[test]
fn partial_json_keeps_good_keys_and_reports_bad_ones() {
    let mut store = SettingsStore::default();
    let rejected = store
        .apply_json(r#"{"colorMode":"fixed","fixedHue":30,"volume":1,"showGrid":"maybe","feedback":5}"#)
        .unwrap();
    let snap = store.snapshot();
    assert_eq!(snap.color_mode, ColorMode::Fixed);
    assert_eq!(snap.fixed_hue, 30.0);
    assert_eq!(snap.feedback, 0.9);
    assert!(snap.show_grid);
    assert_eq!(rejected.len(), 2);
    assert!(rejected.contains(&SettingsError::UnknownKey("volume".into())));
}

#[test]
fn malformed_json_changes_nothing() {
    let mut store = SettingsStore::default();
    assert!(matches!(store.apply_json("{not json"), Err(SettingsError::Json(_))));
    assert!(matches!(store.apply_json("[1,2]"), Err(SettingsError::Json(_))));
    assert_eq!(store.snapshot(), Settings::default());
}

#[test]
fn new_snapshot_applies_to_the_next_spawn() {
    let mut store = SettingsStore::default();
    let mut engine = ParticleEngine::new(0);
    engine.spawn(Vec2::ZERO, &store.snapshot());

    store.update("colorMode", "fixed").unwrap();
    store.update("fixedHue", 360.0).unwrap();
    let p = engine.spawn(Vec2::ZERO, &store.snapshot());
    assert_eq!(p.hue, 0.0);
}

#[test]
fn reset_restores_the_canonical_defaults() {
    let mut store = SettingsStore::default();
    store.apply_json(r#"{"masterVol":1,"octaveShift":-2,"showGrid":false}"#).unwrap();
    assert_ne!(store.snapshot(), Settings::default());
    store.reset();
    let d = store.snapshot();
    assert_eq!(d.master_vol, 0.4);
    assert_eq!(d.octave_shift, 0);
    assert_eq!(d.filter_base, 200.0);
    assert_eq!(d.reflection_radius, 100.0);
    assert!(d.show_grid);
}

#[test]
fn out_of_range_snapshots_are_sanitized_on_replace() {
    let mut store = SettingsStore::default();
    store.replace(Settings {
        spawn_rate: 4.0,
        reflection_radius: f32::NAN,
        octave_shift: 9,
        ..Settings::default()
    });
    let snap = store.snapshot();
    assert_eq!(snap.spawn_rate, 1.0);
    assert_eq!(snap.reflection_radius, 100.0);
    assert_eq!(snap.octave_shift, 2);
}
