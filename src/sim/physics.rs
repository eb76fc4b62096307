//! Body movement and collision against axis-aligned solids
//!
//! The same pipeline runs for the player and every ghost, so a ghost fed the
//! player's recorded inputs retraces the player's path exactly:
//! input -> gravity/integration -> collision -> world bounds.

use super::geom::Rect;
use super::recording::InputSnapshot;
use super::state::Body;
use crate::settings::PhysicsSettings;

/// Turn intents into velocity. Movement is instantaneous, no acceleration.
pub fn apply_input(body: &mut Body, input: InputSnapshot, physics: &PhysicsSettings) {
    if input.left {
        body.vel.x = -physics.speed;
        body.facing_right = false;
    } else if input.right {
        body.vel.x = physics.speed;
        body.facing_right = true;
    } else {
        body.vel.x = 0.0;
    }

    if input.up && body.grounded {
        body.vel.y = physics.jump_velocity;
        body.grounded = false;
    }
}

/// Gravity and integration. Grounded is re-derived by collision afterwards.
pub fn apply_physics(body: &mut Body, physics: &PhysicsSettings) {
    body.vel.y += physics.gravity;
    body.pos += body.vel;
    body.grounded = false;
}

/// Push the body out of every overlapping solid, one axis per solid.
///
/// The axis with the smaller penetration wins (ties go to Y). Solids are
/// visited once in order; pushing out of one may leave the body inside a
/// later one until the next tick. Recorded trajectories depend on this.
pub fn resolve_collisions<I>(body: &mut Body, solids: I)
where
    I: IntoIterator<Item = Rect>,
{
    for solid in solids {
        let rect = body.rect();
        if !rect.overlaps(&solid) {
            continue;
        }

        let delta = rect.center() - solid.center();
        let pen_x = (rect.w + solid.w) / 2.0 - delta.x.abs();
        let pen_y = (rect.h + solid.h) / 2.0 - delta.y.abs();

        if pen_x < pen_y {
            body.pos.x = if delta.x < 0.0 {
                solid.x - body.size.x
            } else {
                solid.right()
            };
            body.vel.x = 0.0;
        } else {
            if delta.y < 0.0 {
                // Landed on top
                body.pos.y = solid.y - body.size.y;
                body.grounded = true;
            } else {
                body.pos.y = solid.bottom();
            }
            body.vel.y = 0.0;
        }
    }
}

/// Keep the body inside the world rectangle. The floor of the world counts
/// as ground.
pub fn clamp_to_bounds(body: &mut Body, physics: &PhysicsSettings) {
    let max_x = physics.world_width - body.size.x;
    let max_y = physics.world_height - body.size.y;

    let x = crate::clamp(body.pos.x, 0.0, max_x);
    if x != body.pos.x {
        body.pos.x = x;
        body.vel.x = 0.0;
    }

    if body.pos.y >= max_y {
        body.pos.y = crate::clamp(max_y, 0.0, max_y);
        body.vel.y = 0.0;
        body.grounded = true;
    } else if body.pos.y < 0.0 {
        body.pos.y = 0.0;
        body.vel.y = 0.0;
    }
}

/// Advance one body by one tick
pub fn step_body(body: &mut Body, input: InputSnapshot, solids: &[Rect], physics: &PhysicsSettings) {
    body.prev_pos = body.pos;
    apply_input(body, input, physics);
    apply_physics(body, physics);
    resolve_collisions(body, solids.iter().copied());
    clamp_to_bounds(body, physics);
}
