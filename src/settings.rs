//! Simulation settings
//!
//! Tick rate, loop length and physics tuning. Changing any of these changes
//! every trajectory, so recordings are only valid under the settings they
//! were made with. Persisted in LocalStorage on the web.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Physics tuning, all values per tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Horizontal speed while left/right is held
    pub speed: f32,
    /// Added to vertical velocity every tick
    pub gravity: f32,
    /// Vertical velocity set by a jump (negative is up)
    pub jump_velocity: f32,
    pub world_width: f32,
    pub world_height: f32,
    pub body_width: f32,
    pub body_height: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            body_width: BODY_WIDTH,
            body_height: BODY_HEIGHT,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulation ticks per second
    pub tick_hz: u32,
    /// Ticks per attempt, unless the level overrides it
    pub loop_ticks: u32,
    pub physics: PhysicsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_hz: TICK_HZ,
            loop_ticks: LOOP_TICKS,
            physics: PhysicsSettings::default(),
        }
    }
}

impl Settings {
    /// Fixed tick duration in seconds
    pub fn tick_duration(&self) -> f64 {
        1.0 / self.tick_hz.max(1) as f64
    }

    /// Parse settings JSON, falling back to defaults for anything invalid
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Invalid settings ({err}), using defaults");
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "echo_loop_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
