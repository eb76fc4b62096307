//! Input sources
//!
//! The simulation never sees key events, only the snapshot an `InputSource`
//! hands it once per tick.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::InputSnapshot;

/// Produces the input for the next simulation tick
pub trait InputSource {
    /// Sample the current intents. Called exactly once per tick.
    fn sample(&mut self) -> InputSnapshot;
}

/// A snapshot kept up to date by the key handlers (held keys)
impl InputSource for InputSnapshot {
    fn sample(&mut self) -> InputSnapshot {
        *self
    }
}

/// Plays back a fixed list of snapshots, then idles
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: Vec<InputSnapshot>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(script: Vec<InputSnapshot>) -> Self {
        Self { script, cursor: 0 }
    }

    /// True once every scripted snapshot has been handed out
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.script.len()
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self) -> InputSnapshot {
        let input = self
            .script
            .get(self.cursor)
            .copied()
            .unwrap_or(InputSnapshot::IDLE);
        self.cursor = self.cursor.saturating_add(1);
        input
    }
}

/// Idle/demo mode: wanders with seeded randomness.
///
/// Holds a direction for a random number of ticks, jumps now and then.
/// The same seed always produces the same input stream.
#[derive(Debug, Clone)]
pub struct AutoPilot {
    rng: Pcg32,
    current: InputSnapshot,
    hold_ticks: u32,
}

impl AutoPilot {
    /// Chance per tick of pressing jump
    const JUMP_CHANCE: f64 = 0.04;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            current: InputSnapshot::IDLE,
            hold_ticks: 0,
        }
    }

    fn pick_direction(&mut self) {
        // Rightward bias: levels run left to right
        let roll: f64 = self.rng.random();
        self.current.left = roll < 0.2;
        self.current.right = roll >= 0.45;
        self.current.action = self.rng.random_bool(0.1);
        self.hold_ticks = self.rng.random_range(10..60);
    }
}

impl InputSource for AutoPilot {
    fn sample(&mut self) -> InputSnapshot {
        if self.hold_ticks == 0 {
            self.pick_direction();
        }
        self.hold_ticks -= 1;

        let mut input = self.current;
        input.up = self.rng.random_bool(Self::JUMP_CHANCE);
        input
    }
}
