//! Physics tuning and rule timers
//!
//! Loaded from JSON next to the runner; every field has a default so partial
//! files only override what they mention.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::PIXEL_SCALE;

/// Tunable simulation parameters (per-tick units, world pixels)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Vertical ===
    /// Downward acceleration added every tick
    pub gravity: f32,
    /// Terminal fall speed
    pub max_fall: f32,
    /// Initial vertical velocity of a jump
    pub jump_velocity: f32,
    /// Upward speed kept when jump is released early
    pub jump_cut_velocity: f32,
    /// Upward kick after stomping an enemy
    pub stomp_bounce: f32,

    // === Horizontal ===
    pub walk_accel: f32,
    pub run_accel: f32,
    pub max_walk_speed: f32,
    pub max_run_speed: f32,
    /// Velocity multiplier when grounded without input
    pub ground_friction: f32,
    /// Velocity multiplier when airborne without input
    pub air_friction: f32,
    /// Speeds below this snap to zero
    pub stop_threshold: f32,

    // === Timers (ticks) ===
    /// Post-damage window in which contacts are ignored
    pub invulnerable_ticks: u32,
    /// Star power duration
    pub star_ticks: u32,
    /// Ticks a stomped enemy stays visible
    pub stomp_despawn_ticks: u32,
    /// Ticks a score popup lives
    pub popup_ticks: u32,

    // === Run ===
    /// Level clock start value
    pub level_time: u32,
    pub starting_lives: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: 0.4 * PIXEL_SCALE,
            max_fall: 4.5 * PIXEL_SCALE,
            jump_velocity: -6.5 * PIXEL_SCALE,
            jump_cut_velocity: -2.0 * PIXEL_SCALE,
            stomp_bounce: -4.0 * PIXEL_SCALE,

            walk_accel: 0.08 * PIXEL_SCALE,
            run_accel: 0.12 * PIXEL_SCALE,
            max_walk_speed: 1.5 * PIXEL_SCALE,
            max_run_speed: 2.5 * PIXEL_SCALE,
            ground_friction: 0.92,
            air_friction: 0.98,
            stop_threshold: 0.05 * PIXEL_SCALE,

            invulnerable_ticks: 120,
            star_ticks: 600,
            stomp_despawn_ticks: 30,
            popup_ticks: 30,

            level_time: 400,
            starting_lives: 3,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from disk, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Acceleration and speed cap for the current run button state
    pub fn horizontal_limits(&self, running: bool) -> (f32, f32) {
        if running {
            (self.run_accel, self.max_run_speed)
        } else {
            (self.walk_accel, self.max_walk_speed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "gravity": 2.0, "starting_lives": 5 }"#).unwrap();
        assert_eq!(settings.gravity, 2.0);
        assert_eq!(settings.starting_lives, 5);
        assert_eq!(settings.max_fall, Settings::default().max_fall);
        assert_eq!(settings.star_ticks, 600);
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings::default();
        let parsed = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load(Path::new("/definitely/not/here.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_horizontal_limits() {
        let settings = Settings::default();
        assert_eq!(settings.horizontal_limits(true).1, settings.max_run_speed);
        assert_eq!(settings.horizontal_limits(false).0, settings.walk_accel);
    }
}
