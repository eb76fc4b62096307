//! Simulation state types
//!
//! Bodies, world entities and the per-attempt state the scheduler owns.
//! Derived entity flags (pressed/open/blocked) are rewritten every tick by
//! `interaction`; nothing else mutates them.

use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Rect, Segment};
use super::level::LevelData;
use super::recording::Recording;
use crate::settings::PhysicsSettings;

/// Stable identity of a world entity (its index in the level data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// A moving rectangle: the player or a ghost
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    /// Position at the start of the last tick (render interpolation)
    pub prev_pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    pub facing_right: bool,
    /// Inactive bodies neither move nor press anything
    pub active: bool,
}

impl Body {
    pub fn spawn(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            prev_pos: pos,
            vel: Vec2::ZERO,
            size,
            grounded: false,
            facing_right: true,
            active: true,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Position blended between the last two ticks
    pub fn interpolated_pos(&self, alpha: f32) -> Vec2 {
        Vec2::new(
            crate::lerp(self.prev_pos.x, self.pos.x, alpha),
            crate::lerp(self.prev_pos.y, self.pos.y, alpha),
        )
    }
}

/// A body replaying a finalized recording
#[derive(Debug, Clone)]
pub struct Ghost {
    pub body: Body,
    pub recording: Rc<Recording>,
}

/// Whether a door with several switches needs any or all of them held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorRequirement {
    #[default]
    Any,
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub id: EntityId,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub id: EntityId,
    pub rect: Rect,
    pub pressed: bool,
    /// Doors this switch actuates
    pub doors: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    pub id: EntityId,
    /// Closed extent
    pub rect: Rect,
    /// Current visible height (collapses to 0 while open)
    pub height: f32,
    pub open: bool,
    pub initially_open: bool,
    pub requirement: DoorRequirement,
    /// Switches linked to this door (reverse of `Switch::doors`)
    pub switches: Vec<EntityId>,
}

impl Door {
    pub fn new(
        id: EntityId,
        rect: Rect,
        initially_open: bool,
        requirement: DoorRequirement,
    ) -> Self {
        let mut door = Self {
            id,
            rect,
            height: rect.h,
            open: false,
            initially_open,
            requirement,
            switches: Vec::new(),
        };
        door.set_open(initially_open);
        door
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
        self.height = if open { 0.0 } else { self.rect.h };
    }

    /// Rectangle as currently drawn
    pub fn current_rect(&self) -> Rect {
        Rect {
            h: self.height,
            ..self.rect
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Laser {
    pub id: EntityId,
    pub beam: Segment,
    pub blocked: bool,
    /// False while a linked switch is pressed
    pub powered: bool,
    pub switches: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: EntityId,
    pub rect: Rect,
    /// Presentation only; win detection never reads it
    pub reached: bool,
}

/// A world entity
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Wall(Wall),
    Switch(Switch),
    Door(Door),
    Laser(Laser),
    Goal(Goal),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Wall(w) => w.id,
            Entity::Switch(s) => s.id,
            Entity::Door(d) => d.id,
            Entity::Laser(l) => l.id,
            Entity::Goal(g) => g.id,
        }
    }

    /// Collision rectangle if this entity currently blocks movement
    pub fn solid_rect(&self) -> Option<Rect> {
        match self {
            Entity::Wall(w) => Some(w.rect),
            Entity::Door(d) if !d.open => Some(d.rect),
            Entity::Door(_) | Entity::Switch(_) | Entity::Laser(_) | Entity::Goal(_) => None,
        }
    }
}

/// The entity set of one attempt, in level order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    pub entities: Vec<Entity>,
}

impl World {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Rectangles that bodies collide with this tick
    pub fn solids(&self) -> impl Iterator<Item = Rect> + '_ {
        self.entities.iter().filter_map(Entity::solid_rect)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.entities.iter().find_map(|e| match e {
            Entity::Goal(g) => Some(g),
            _ => None,
        })
    }

    pub fn goal_mut(&mut self) -> Option<&mut Goal> {
        self.entities.iter_mut().find_map(|e| match e {
            Entity::Goal(g) => Some(g),
            _ => None,
        })
    }

    pub fn switches(&self) -> impl Iterator<Item = &Switch> + '_ {
        self.entities.iter().filter_map(|e| match e {
            Entity::Switch(s) => Some(s),
            _ => None,
        })
    }

    pub fn doors(&self) -> impl Iterator<Item = &Door> + '_ {
        self.entities.iter().filter_map(|e| match e {
            Entity::Door(d) => Some(d),
            _ => None,
        })
    }

    pub fn lasers(&self) -> impl Iterator<Item = &Laser> + '_ {
        self.entities.iter().filter_map(|e| match e {
            Entity::Laser(l) => Some(l),
            _ => None,
        })
    }
}

/// Everything that lives for exactly one attempt
#[derive(Debug, Clone)]
pub struct AttemptState {
    /// Tick within this attempt (0-based)
    pub local_tick: u32,
    pub player: Body,
    /// One per finalized recording, oldest first
    pub ghosts: Vec<Ghost>,
    pub world: World,
}

impl AttemptState {
    /// Fresh attempt: player and one ghost per recording at the spawn point,
    /// world rebuilt from level data
    pub fn spawn(level: &LevelData, recordings: &[Rc<Recording>], physics: &PhysicsSettings) -> Self {
        let size = Vec2::new(physics.body_width, physics.body_height);
        let ghosts = recordings
            .iter()
            .map(|recording| Ghost {
                body: Body::spawn(level.spawn, size),
                recording: Rc::clone(recording),
            })
            .collect();

        Self {
            local_tick: 0,
            player: Body::spawn(level.spawn, size),
            ghosts,
            world: level.build_world(),
        }
    }

    /// Rectangles of every body that can press switches and block lasers
    pub fn active_body_rects(&self) -> Vec<Rect> {
        std::iter::once(&self.player)
            .chain(self.ghosts.iter().map(|g| &g.body))
            .filter(|b| b.active)
            .map(Body::rect)
            .collect()
    }
}

/// Things that happened during a tick, for audio/UI cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    SwitchChanged { id: EntityId, pressed: bool },
    DoorChanged { id: EntityId, open: bool },
    LaserChanged { id: EntityId, blocked: bool },
    /// A ghost ran out of recorded input
    GhostExpired { recording_id: u64 },
    /// A failed attempt ended and a new loop started
    AttemptEnded { loop_index: u32, reached_goal: bool },
    LevelComplete { loop_index: u32 },
}
