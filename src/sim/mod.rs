//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, velocities in per-tick units
//! - Input enters only as one recorded snapshot per tick
//! - Stable iteration order (player, then ghosts oldest first, then entities
//!   in level order)
//! - No rendering or platform dependencies

pub mod geom;
pub mod interaction;
pub mod level;
pub mod physics;
pub mod recording;
pub mod session;
pub mod state;
pub mod tick;
pub mod timestep;

pub use geom::{Rect, Segment};
pub use level::{EntityDescriptor, EntityKind, LevelData, LevelError};
pub use recording::{InputSnapshot, Recording, RecordingError};
pub use session::{FrameView, Session, SessionPhase};
pub use state::{
    AttemptState, Body, Door, DoorRequirement, Entity, EntityId, Ghost, Goal, Laser, SimEvent,
    Switch, Wall, World,
};
pub use tick::{TickOutcome, tick};
pub use timestep::FixedTimestep;
