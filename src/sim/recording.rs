//! Tick-indexed input recording and replay
//!
//! A recording is an append-only list of input snapshots, one per simulation
//! tick. Replay reads the snapshot at the ghost's local tick; running out of
//! snapshots means the ghost is done. Nothing here depends on wall-clock time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The five boolean intents sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    /// Jump
    pub up: bool,
    pub down: bool,
    pub action: bool,
}

impl InputSnapshot {
    const LEFT: u8 = 1 << 0;
    const RIGHT: u8 = 1 << 1;
    const UP: u8 = 1 << 2;
    const DOWN: u8 = 1 << 3;
    const ACTION: u8 = 1 << 4;

    /// No intents held
    pub const IDLE: Self = Self {
        left: false,
        right: false,
        up: false,
        down: false,
        action: false,
    };

    /// Pack into a bit field (bit 0 left .. bit 4 action)
    pub fn to_bits(self) -> u8 {
        let mut bits = 0;
        if self.left {
            bits |= Self::LEFT;
        }
        if self.right {
            bits |= Self::RIGHT;
        }
        if self.up {
            bits |= Self::UP;
        }
        if self.down {
            bits |= Self::DOWN;
        }
        if self.action {
            bits |= Self::ACTION;
        }
        bits
    }

    /// Unpack from a bit field; unknown bits are ignored
    pub fn from_bits(bits: u8) -> Self {
        Self {
            left: bits & Self::LEFT != 0,
            right: bits & Self::RIGHT != 0,
            up: bits & Self::UP != 0,
            down: bits & Self::DOWN != 0,
            action: bits & Self::ACTION != 0,
        }
    }
}

impl From<u8> for InputSnapshot {
    fn from(bits: u8) -> Self {
        Self::from_bits(bits)
    }
}

impl From<InputSnapshot> for u8 {
    fn from(input: InputSnapshot) -> Self {
        input.to_bits()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordingError {
    #[error("recording {id}: expected input for tick {expected}, got tick {got}")]
    OutOfOrder { id: u64, expected: u32, got: u32 },
}

/// The input history of one attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: u64,
    /// 1-based loop this recording was made in
    pub loop_index: u32,
    pub reached_goal: bool,
    pub end_tick: u32,
    inputs: Vec<InputSnapshot>,
}

impl Recording {
    /// Start an empty recording
    pub fn new(id: u64, loop_index: u32) -> Self {
        Self {
            id,
            loop_index,
            reached_goal: false,
            end_tick: 0,
            inputs: Vec::new(),
        }
    }

    /// Append the snapshot for `tick`, which must be the next tick in sequence
    pub fn record_input(&mut self, tick: u32, input: InputSnapshot) -> Result<(), RecordingError> {
        let expected = self.len();
        if tick != expected {
            return Err(RecordingError::OutOfOrder {
                id: self.id,
                expected,
                got: tick,
            });
        }
        self.inputs.push(input);
        Ok(())
    }

    /// Snapshot recorded for `tick`, or `None` once the recording is exhausted
    #[inline]
    pub fn input_at(&self, tick: u32) -> Option<InputSnapshot> {
        self.inputs.get(tick as usize).copied()
    }

    /// Whether a ghost replaying this recording still has input at `tick`
    #[inline]
    pub fn is_ghost_active(&self, tick: u32) -> bool {
        tick < self.len()
    }

    /// Close the recording. Inputs past `end_tick` are dropped, and an
    /// `end_tick` past the last input is pulled back so that
    /// `len() == end_tick` always holds afterwards.
    pub fn finalize(mut self, end_tick: u32, reached_goal: bool) -> Recording {
        self.inputs.truncate(end_tick as usize);
        self.end_tick = self.len();
        self.reached_goal = reached_goal;
        self
    }

    /// Re-apply the finalize invariant to a recording from outside the
    /// session (e.g. an import)
    pub fn normalized(self) -> Recording {
        let end_tick = self.end_tick;
        let reached_goal = self.reached_goal;
        self.finalize(end_tick, reached_goal)
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.inputs.len() as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &[InputSnapshot] {
        &self.inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jump() -> InputSnapshot {
        InputSnapshot {
            up: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_recording_is_empty() {
        let rec = Recording::new(1, 1);
        assert!(rec.is_empty());
        assert_eq!(rec.end_tick, 0);
        assert!(!rec.reached_goal);
        assert_eq!(rec.input_at(0), None);
    }

    #[test]
    fn test_record_and_read_back() {
        let mut rec = Recording::new(1, 1);
        rec.record_input(0, jump()).unwrap();
        rec.record_input(1, InputSnapshot::IDLE).unwrap();

        assert_eq!(rec.input_at(0), Some(jump()));
        assert_eq!(rec.input_at(1), Some(InputSnapshot::IDLE));
        assert_eq!(rec.input_at(2), None);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut rec = Recording::new(7, 1);
        rec.record_input(0, jump()).unwrap();

        let err = rec.record_input(2, jump()).unwrap_err();
        assert_eq!(
            err,
            RecordingError::OutOfOrder {
                id: 7,
                expected: 1,
                got: 2
            }
        );
        // Re-recording an existing tick is also refused
        assert!(rec.record_input(0, InputSnapshot::IDLE).is_err());
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.input_at(0), Some(jump()));
    }

    #[test]
    fn test_finalize_density() {
        let mut rec = Recording::new(1, 1);
        for tick in 0..10 {
            rec.record_input(tick, InputSnapshot::IDLE).unwrap();
        }

        let trimmed = rec.clone().finalize(6, false);
        assert_eq!(trimmed.len(), 6);
        assert_eq!(trimmed.end_tick, 6);

        // Asking for more ticks than were recorded cannot create gaps
        let short = rec.finalize(25, true);
        assert_eq!(short.len(), 10);
        assert_eq!(short.end_tick, 10);
        assert!(short.reached_goal);
    }

    #[test]
    fn test_ghost_active_boundary() {
        let mut rec = Recording::new(1, 1);
        for tick in 0..50 {
            rec.record_input(tick, InputSnapshot::IDLE).unwrap();
        }
        let rec = rec.finalize(50, false);

        assert!((0..50).all(|t| rec.is_ghost_active(t)));
        assert!(!rec.is_ghost_active(50));
        assert!(!rec.is_ghost_active(1000));
    }

    #[test]
    fn test_snapshot_bits() {
        let all = InputSnapshot {
            left: true,
            right: true,
            up: true,
            down: true,
            action: true,
        };
        assert_eq!(all.to_bits(), 0b1_1111);
        assert_eq!(InputSnapshot::from_bits(0b1_1111), all);
        assert_eq!(InputSnapshot::from_bits(0b100), jump());
        assert_eq!(InputSnapshot::from_bits(0b1110_0000), InputSnapshot::IDLE);
    }

    #[test]
    fn test_normalized_fixes_inconsistent_import() {
        let mut rec = Recording::new(3, 2);
        for tick in 0..4 {
            rec.record_input(tick, jump()).unwrap();
        }
        rec.end_tick = 9;

        let rec = rec.normalized();
        assert_eq!(rec.end_tick, 4);
        assert_eq!(rec.len(), 4);
    }
}
