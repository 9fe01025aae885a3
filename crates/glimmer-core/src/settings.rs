//! Named parameter snapshot shared by every subsystem.
//!
//! `Settings` is a small `Copy` value. Subsystems never hold on to the store;
//! they receive a snapshot by value for each spawn, step, tone or draw, so a
//! reader can never observe a half-applied update.

use crate::constants::HUE_TURN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Cycle,
    Fixed,
}

impl FromStr for ColorMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cycle" => Ok(ColorMode::Cycle),
            "fixed" => Ok(ColorMode::Fixed),
            other => Err(SettingsError::UnknownColorMode(other.to_string())),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Cycle => f.write_str("cycle"),
            ColorMode::Fixed => f.write_str("fixed"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub master_vol: f32,
    pub delay_time: f32,
    pub feedback: f32,
    pub octave_shift: i32,

    pub spawn_rate: f32,
    pub particle_size: f32,
    pub particle_decay: f32,
    pub filter_base: f32,

    pub color_mode: ColorMode,
    pub fixed_hue: f32,
    pub color_speed: f32,

    pub show_grid: bool,
    pub reflection_radius: f32,
    pub reflection_strength: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_vol: 0.4,
            delay_time: 0.3,
            feedback: 0.3,
            octave_shift: 0,
            spawn_rate: 0.3,
            particle_size: 1.0,
            particle_decay: 1.0,
            filter_base: 200.0,
            color_mode: ColorMode::Cycle,
            fixed_hue: 200.0,
            color_speed: 2.0,
            show_grid: true,
            reflection_radius: 100.0,
            reflection_strength: 0.15,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("unknown setting: {0}")]
    UnknownKey(String),
    #[error("setting {key} expects a {expected} value")]
    WrongType { key: String, expected: &'static str },
    #[error("setting {0} must be a finite number")]
    NotFinite(String),
    #[error("unknown color mode: {0}")]
    UnknownColorMode(String),
    #[error("invalid settings json: {0}")]
    Json(String),
}

/// A raw value from the settings UI before it is validated against a key.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        SettingValue::Number(v)
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Text(v.to_string())
    }
}

impl SettingValue {
    fn number(&self, key: &str) -> Result<f32, SettingsError> {
        let v = match self {
            SettingValue::Number(n) => *n,
            // Range inputs deliver their value as text
            SettingValue::Text(t) => t.trim().parse::<f64>().map_err(|_| SettingsError::WrongType {
                key: key.to_string(),
                expected: "number",
            })?,
            SettingValue::Bool(_) => {
                return Err(SettingsError::WrongType {
                    key: key.to_string(),
                    expected: "number",
                })
            }
        };
        if !v.is_finite() {
            return Err(SettingsError::NotFinite(key.to_string()));
        }
        Ok(v as f32)
    }

    fn flag(&self, key: &str) -> Result<bool, SettingsError> {
        match self {
            SettingValue::Bool(b) => Ok(*b),
            SettingValue::Number(n) => Ok(*n != 0.0),
            SettingValue::Text(t) => match t.as_str() {
                "true" | "on" | "1" => Ok(true),
                "false" | "off" | "0" => Ok(false),
                _ => Err(SettingsError::WrongType {
                    key: key.to_string(),
                    expected: "boolean",
                }),
            },
        }
    }
}

/// Wrap any finite angle into [0, 360).
#[inline]
pub fn wrap_hue(hue: f32) -> f32 {
    let h = hue.rem_euclid(HUE_TURN);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if h >= HUE_TURN {
        0.0
    } else {
        h
    }
}

impl Settings {
    /// Assign one named parameter, clamping numbers into their accepted range.
    pub fn set(&mut self, key: &str, value: impl Into<SettingValue>) -> Result<(), SettingsError> {
        let value = value.into();
        match key {
            "masterVol" => self.master_vol = value.number(key)?.clamp(0.0, 1.0),
            "delayTime" => self.delay_time = value.number(key)?.clamp(0.0, 1.0),
            "feedback" => self.feedback = value.number(key)?.clamp(0.0, 0.9),
            "octaveShift" => self.octave_shift = value.number(key)?.round().clamp(-2.0, 2.0) as i32,
            "spawnRate" => self.spawn_rate = value.number(key)?.clamp(0.05, 1.0),
            "particleSize" => self.particle_size = value.number(key)?.clamp(0.5, 3.0),
            "particleDecay" => self.particle_decay = value.number(key)?.clamp(0.5, 3.0),
            "filterBase" => self.filter_base = value.number(key)?.clamp(20.0, 20_000.0),
            "colorMode" => {
                self.color_mode = match &value {
                    SettingValue::Text(t) => t.parse()?,
                    // Checkbox style: checked means cycling
                    other => {
                        if other.flag(key)? {
                            ColorMode::Cycle
                        } else {
                            ColorMode::Fixed
                        }
                    }
                }
            }
            "fixedHue" => self.fixed_hue = wrap_hue(value.number(key)?),
            "colorSpeed" => self.color_speed = value.number(key)?.clamp(0.0, 10.0),
            "showGrid" => self.show_grid = value.flag(key)?,
            "reflectionRadius" => self.reflection_radius = value.number(key)?.clamp(50.0, 300.0),
            "reflectionStrength" => {
                self.reflection_strength = value.number(key)?.clamp(0.0, 0.5)
            }
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Clamp every field into range; used for snapshots that bypassed `set`.
    pub fn sanitized(mut self) -> Self {
        let d = Settings::default();
        let finite_or = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        self.master_vol = finite_or(self.master_vol, d.master_vol).clamp(0.0, 1.0);
        self.delay_time = finite_or(self.delay_time, d.delay_time).clamp(0.0, 1.0);
        self.feedback = finite_or(self.feedback, d.feedback).clamp(0.0, 0.9);
        self.octave_shift = self.octave_shift.clamp(-2, 2);
        self.spawn_rate = finite_or(self.spawn_rate, d.spawn_rate).clamp(0.05, 1.0);
        self.particle_size = finite_or(self.particle_size, d.particle_size).clamp(0.5, 3.0);
        self.particle_decay = finite_or(self.particle_decay, d.particle_decay).clamp(0.5, 3.0);
        self.filter_base = finite_or(self.filter_base, d.filter_base).clamp(20.0, 20_000.0);
        self.fixed_hue = wrap_hue(finite_or(self.fixed_hue, d.fixed_hue));
        self.color_speed = finite_or(self.color_speed, d.color_speed).clamp(0.0, 10.0);
        self.reflection_radius =
            finite_or(self.reflection_radius, d.reflection_radius).clamp(50.0, 300.0);
        self.reflection_strength =
            finite_or(self.reflection_strength, d.reflection_strength).clamp(0.0, 0.5);
        self
    }
}

/// Single-writer holder of the current snapshot.
#[derive(Clone, Debug, Default)]
pub struct SettingsStore {
    current: Settings,
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        Self {
            current: initial.sanitized(),
        }
    }

    /// Latest complete snapshot, by value.
    #[inline]
    pub fn snapshot(&self) -> Settings {
        self.current
    }

    pub fn update(&mut self, key: &str, value: impl Into<SettingValue>) -> Result<(), SettingsError> {
        // Validate on a copy so a rejected value never leaves a partial write
        let mut next = self.current;
        next.set(key, value)?;
        self.current = next;
        log::debug!("[settings] {} updated", key);
        Ok(())
    }

    pub fn replace(&mut self, settings: Settings) {
        self.current = settings.sanitized();
    }

    pub fn reset(&mut self) {
        self.current = Settings::default();
    }

    /// Merge a (possibly partial) JSON object over the current snapshot.
    ///
    /// Keys are applied one at a time through [`Settings::set`]; rejected keys
    /// are skipped and reported in the returned list, the rest still apply.
    pub fn apply_json(&mut self, json: &str) -> Result<Vec<SettingsError>, SettingsError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| SettingsError::Json(e.to_string()))?;
        let obj = value
            .as_object()
            .ok_or_else(|| SettingsError::Json("expected an object".to_string()))?;
        let mut rejected = Vec::new();
        for (key, raw) in obj {
            let v = match raw {
                serde_json::Value::Bool(b) => SettingValue::Bool(*b),
                serde_json::Value::Number(n) => match n.as_f64() {
                    Some(f) => SettingValue::Number(f),
                    None => {
                        rejected.push(SettingsError::NotFinite(key.clone()));
                        continue;
                    }
                },
                serde_json::Value::String(s) => SettingValue::Text(s.clone()),
                _ => {
                    rejected.push(SettingsError::WrongType {
                        key: key.clone(),
                        expected: "scalar",
                    });
                    continue;
                }
            };
            if let Err(e) = self.update(key, v) {
                rejected.push(e);
            }
        }
        Ok(rejected)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.current).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reset() {
        let mut store = SettingsStore::default();
        store.update("masterVol", 0.9).unwrap();
        store.reset();
        assert_eq!(store.snapshot(), Settings::default());
    }

    #[test]
    fn numbers_are_clamped() {
        let mut s = Settings::default();
        s.set("feedback", 2.0).unwrap();
        assert_eq!(s.feedback, 0.9);
        s.set("octaveShift", 7.4).unwrap();
        assert_eq!(s.octave_shift, 2);
        s.set("octaveShift", -1.6).unwrap();
        assert_eq!(s.octave_shift, -2);
        s.set("reflectionRadius", 10.0).unwrap();
        assert_eq!(s.reflection_radius, 50.0);
    }

    #[test]
    fn slider_text_is_parsed() {
        let mut s = Settings::default();
        s.set("spawnRate", "0.75").unwrap();
        assert!((s.spawn_rate - 0.75).abs() < 1e-6);
    }

    #[test]
    fn fixed_hue_wraps() {
        let mut s = Settings::default();
        s.set("fixedHue", 360.0).unwrap();
        assert_eq!(s.fixed_hue, 0.0);
        s.set("fixedHue", -30.0).unwrap();
        assert!((s.fixed_hue - 330.0).abs() < 1e-4);
    }

    #[test]
    fn rejected_update_keeps_previous_value() {
        let mut store = SettingsStore::default();
        let before = store.snapshot();
        assert!(matches!(
            store.update("masterVol", f64::NAN),
            Err(SettingsError::NotFinite(_))
        ));
        assert!(matches!(
            store.update("volume", 0.5),
            Err(SettingsError::UnknownKey(_))
        ));
        assert!(matches!(
            store.update("colorMode", "rainbow"),
            Err(SettingsError::UnknownColorMode(_))
        ));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn color_mode_accepts_text_and_checkbox() {
        let mut s = Settings::default();
        s.set("colorMode", "fixed").unwrap();
        assert_eq!(s.color_mode, ColorMode::Fixed);
        s.set("colorMode", true).unwrap();
        assert_eq!(s.color_mode, ColorMode::Cycle);
    }

    #[test]
    fn json_merges_partially() {
        let mut store = SettingsStore::default();
        let rejected = store
            .apply_json(r#"{"showGrid": false, "colorMode": "fixed", "bogus": 1, "fixedHue": 90}"#)
            .unwrap();
        let s = store.snapshot();
        assert!(!s.show_grid);
        assert_eq!(s.color_mode, ColorMode::Fixed);
        assert_eq!(s.fixed_hue, 90.0);
        assert_eq!(s.master_vol, Settings::default().master_vol);
        assert_eq!(rejected, vec![SettingsError::UnknownKey("bogus".into())]);
    }

    #[test]
    fn json_round_trips_through_export() {
        let mut store = SettingsStore::default();
        store.update("delayTime", 0.6).unwrap();
        let exported = store.to_json();
        let parsed: Settings = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed, store.snapshot());
        assert!(exported.contains("\"colorMode\":\"cycle\""));
    }
}
