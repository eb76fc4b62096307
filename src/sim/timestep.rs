//! Fixed timestep accumulator
//!
//! Decouples the display's frame rate from the simulation's tick rate.

/// Turns variable frame deltas into a whole number of fixed simulation ticks.
///
/// There is no cap on ticks per frame: a stalled frame is caught up in full
/// so the simulation never loses ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Tick duration in seconds.
    dt: f64,
    /// Real time not yet consumed by a tick.
    accumulator: f64,
}

impl FixedTimestep {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Negative, zero and non-finite
    /// deltas are ignored.
    pub fn accumulate(&mut self, frame_dt: f64) {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
    }

    /// Consume one tick's worth of time if available.
    pub fn try_consume(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }

    /// Drop leftover time (used on resume so a pause does not cause a burst).
    pub fn discard(&mut self) {
        self.accumulator = 0.0;
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.dt) as f32
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}
