//! Level data and the entity factory
//!
//! A level is a spawn point plus an ordered list of entity descriptors.
//! Links between entities are indices into that list; the factory turns them
//! into `EntityId`s when it materializes a fresh `World` for each attempt.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geom::{Rect, Segment};
use super::state::{Door, DoorRequirement, Entity, EntityId, Goal, Laser, Switch, Wall, World};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("malformed level data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Entity kinds the factory knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Wall,
    Switch,
    Door,
    Laser,
    Goal,
}

impl EntityKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "wall" => Some(EntityKind::Wall),
            "switch" => Some(EntityKind::Switch),
            "door" => Some(EntityKind::Door),
            "laser" => Some(EntityKind::Laser),
            "goal" => Some(EntityKind::Goal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Wall => "wall",
            EntityKind::Switch => "switch",
            EntityKind::Door => "door",
            EntityKind::Laser => "laser",
            EntityKind::Goal => "goal",
        }
    }
}

/// One entry of a level's entity list.
///
/// Rect kinds use `x/y/w/h`, lasers use `x1/y1/x2/y2`. `links` holds
/// indices of the doors a switch drives, or of the switches that cut a
/// laser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityDescriptor {
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub links: Vec<usize>,
    pub initially_open: bool,
    pub requires: DoorRequirement,
}

impl EntityDescriptor {
    fn rect_kind(kind: EntityKind, rect: Rect) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            ..Default::default()
        }
    }

    pub fn wall(rect: Rect) -> Self {
        Self::rect_kind(EntityKind::Wall, rect)
    }

    pub fn switch(rect: Rect, doors: Vec<usize>) -> Self {
        Self {
            links: doors,
            ..Self::rect_kind(EntityKind::Switch, rect)
        }
    }

    pub fn door(rect: Rect, initially_open: bool, requires: DoorRequirement) -> Self {
        Self {
            initially_open,
            requires,
            ..Self::rect_kind(EntityKind::Door, rect)
        }
    }

    pub fn laser(from: Vec2, to: Vec2, switches: Vec<usize>) -> Self {
        Self {
            kind: EntityKind::Laser.as_str().to_string(),
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            links: switches,
            ..Default::default()
        }
    }

    pub fn goal(rect: Rect) -> Self {
        Self::rect_kind(EntityKind::Goal, rect)
    }

    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Build the entity with default derived state and unresolved links
    fn to_entity(&self, kind: EntityKind, id: EntityId) -> Entity {
        match kind {
            EntityKind::Wall => Entity::Wall(Wall {
                id,
                rect: self.rect(),
            }),
            EntityKind::Switch => Entity::Switch(Switch {
                id,
                rect: self.rect(),
                pressed: false,
                doors: Vec::new(),
            }),
            EntityKind::Door => Entity::Door(Door::new(
                id,
                self.rect(),
                self.initially_open,
                self.requires,
            )),
            EntityKind::Laser => Entity::Laser(Laser {
                id,
                beam: Segment::new(Vec2::new(self.x1, self.y1), Vec2::new(self.x2, self.y2)),
                blocked: false,
                powered: true,
                switches: Vec::new(),
            }),
            EntityKind::Goal => Entity::Goal(Goal {
                id,
                rect: self.rect(),
                reached: false,
            }),
        }
    }
}

/// A level as authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    /// Top-left corner where the player and every ghost appear
    pub spawn: Vec2,
    /// Per-level attempt length, overriding `Settings::loop_ticks`
    #[serde(default)]
    pub loop_ticks: Option<u32>,
    pub entities: Vec<EntityDescriptor>,
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Materialize a fresh world: all derived state at its defaults, links
    /// resolved to ids. Unknown kinds and dangling links are skipped.
    pub fn build_world(&self) -> World {
        let mut entities = Vec::with_capacity(self.entities.len());
        for (index, desc) in self.entities.iter().enumerate() {
            match EntityKind::parse(&desc.kind) {
                Some(kind) => entities.push(desc.to_entity(kind, EntityId(index as u32))),
                None => log::warn!(
                    "Level '{}': skipping entity {} of unknown kind '{}'",
                    self.name,
                    index,
                    desc.kind
                ),
            }
        }

        self.resolve_links(&mut entities);
        World::new(entities)
    }

    fn resolve_links(&self, entities: &mut [Entity]) {
        let ids_of = |want: EntityKind| -> Vec<EntityId> {
            entities
                .iter()
                .filter(|e| entity_kind(e) == want)
                .map(Entity::id)
                .collect()
        };
        let door_ids = ids_of(EntityKind::Door);
        let switch_ids = ids_of(EntityKind::Switch);

        for entity in entities.iter_mut() {
            let id = entity.id();
            match entity {
                Entity::Switch(switch) => {
                    switch.doors = self.link_targets(id, &door_ids, EntityKind::Door);
                }
                Entity::Laser(laser) => {
                    laser.switches = self.link_targets(id, &switch_ids, EntityKind::Switch);
                }
                Entity::Wall(_) | Entity::Door(_) | Entity::Goal(_) => {}
            }
        }

        let door_links: Vec<(EntityId, Vec<EntityId>)> = entities
            .iter()
            .filter_map(|e| match e {
                Entity::Switch(s) => Some((s.id, s.doors.clone())),
                _ => None,
            })
            .collect();
        for entity in entities.iter_mut() {
            if let Entity::Door(door) = entity {
                door.switches = door_links
                    .iter()
                    .filter(|(_, doors)| doors.contains(&door.id))
                    .map(|(switch, _)| *switch)
                    .collect();
            }
        }
    }

    fn link_targets(&self, from: EntityId, valid: &[EntityId], target: EntityKind) -> Vec<EntityId> {
        let mut targets = Vec::new();
        for &index in &self.entities[from.0 as usize].links {
            let id = EntityId(index as u32);
            if !valid.contains(&id) {
                log::warn!(
                    "Level '{}': entity {} links to {} which is not a {}",
                    self.name,
                    from.0,
                    index,
                    target.as_str()
                );
            } else if !targets.contains(&id) {
                targets.push(id);
            }
        }
        targets
    }
}

fn entity_kind(entity: &Entity) -> EntityKind {
    match entity {
        Entity::Wall(_) => EntityKind::Wall,
        Entity::Switch(_) => EntityKind::Switch,
        Entity::Door(_) => EntityKind::Door,
        Entity::Laser(_) => EntityKind::Laser,
        Entity::Goal(_) => EntityKind::Goal,
    }
}
