//! Echo Loop - A time-loop puzzle platformer
//!
//! Every attempt at a level is recorded tick by tick and replayed as a ghost
//! in every later attempt.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (recording, physics, interactions, scheduler)
//! - `input`: Input sources feeding one snapshot per tick
//! - `persistence`: Recordings export/import
//! - `settings`: Tunable simulation constants
//! - `web`: wasm-bindgen bridge for the browser page

pub mod input;
pub mod persistence;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{AutoPilot, InputSource, ScriptedInput};
pub use settings::Settings;
pub use sim::{InputSnapshot, LevelData, Recording, Session, SessionPhase, SimEvent};

/// Game configuration constants (defaults for `Settings`)
pub mod consts {
    /// Simulation ticks per second
    pub const TICK_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f64 = 1.0 / TICK_HZ as f64;
    /// Ticks per attempt (10 seconds)
    pub const LOOP_TICKS: u32 = 600;

    /// World dimensions (canvas-equivalent)
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Player/ghost body size
    pub const BODY_WIDTH: f32 = 24.0;
    pub const BODY_HEIGHT: f32 = 32.0;

    /// Horizontal speed (pixels per tick)
    pub const PLAYER_SPEED: f32 = 4.0;
    /// Gravity (pixels per tick², no terminal velocity)
    pub const GRAVITY: f32 = 0.5;
    /// Jump impulse (negative is up)
    pub const JUMP_VELOCITY: f32 = -10.0;
}

/// Clamp `value` into `[lo, hi]`; an empty range resolves to `lo`
#[inline]
pub fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    if value > hi {
        if hi < lo { lo } else { hi }
    } else if value < lo {
        lo
    } else {
        value
    }
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(4.0, 0.0, 10.0), 4.0);
        // Body wider than the world pins to the left edge
        assert_eq!(clamp(3.0, 0.0, -2.0), 0.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }
}
