//! Fixed timestep simulation tick
//!
//! Advances one attempt by exactly one tick. The order of the steps below is
//! what makes a ghost replay identical to the attempt it was recorded from:
//!
//! 1. Record the sampled input into the live recording
//! 2. Move the player
//! 3. Move each ghost, oldest recording first (or retire it when its input
//!    runs out)
//! 4. Update switches, doors, lasers
//! 5. Check the goal
//! 6. Advance the local tick
//! 7. Check the loop length

use super::geom::Rect;
use super::interaction::update_world;
use super::physics::step_body;
use super::recording::{InputSnapshot, Recording};
use super::state::{AttemptState, SimEvent};
use crate::settings::PhysicsSettings;

/// What the scheduler must do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Attempt still running
    Continue,
    /// Attempt over; the live recording holds exactly `local_tick` inputs
    Ended { reached_goal: bool },
}

/// Advance the attempt by one fixed timestep
pub fn tick(
    state: &mut AttemptState,
    live: &mut Recording,
    input: InputSnapshot,
    loop_ticks: u32,
    physics: &PhysicsSettings,
    events: &mut Vec<SimEvent>,
) -> TickOutcome {
    let now = state.local_tick;

    if let Err(err) = live.record_input(now, input) {
        log::error!("{err}");
    }

    // Door solidity is whatever the previous tick left
    let solids: Vec<Rect> = state.world.solids().collect();

    if state.player.active {
        step_body(&mut state.player, input, &solids, physics);
    }

    for ghost in &mut state.ghosts {
        if !ghost.body.active {
            continue;
        }
        match ghost.recording.input_at(now) {
            Some(recorded) => step_body(&mut ghost.body, recorded, &solids, physics),
            None => {
                ghost.body.active = false;
                ghost.body.prev_pos = ghost.body.pos;
                log::debug!(
                    "Ghost of loop {} expired at tick {}",
                    ghost.recording.loop_index,
                    now
                );
                events.push(SimEvent::GhostExpired {
                    recording_id: ghost.recording.id,
                });
            }
        }
    }

    let bodies = state.active_body_rects();
    update_world(&mut state.world, &bodies, events);

    let reached_goal = state.player.active
        && state
            .world
            .goal()
            .is_some_and(|goal| state.player.rect().overlaps(&goal.rect));
    if reached_goal {
        if let Some(goal) = state.world.goal_mut() {
            goal.reached = true;
        }
    }

    state.local_tick += 1;

    if reached_goal {
        TickOutcome::Ended { reached_goal: true }
    } else if state.local_tick >= loop_ticks {
        TickOutcome::Ended {
            reached_goal: false,
        }
    } else {
        TickOutcome::Continue
    }
}
