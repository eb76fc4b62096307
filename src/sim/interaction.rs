//! Switches, doors and lasers
//!
//! Evaluated once per tick after every body has moved, always in the order
//! switches -> doors -> lasers. Doors read the switch states left by the
//! previous tick, so a switch pressed on tick T opens its door on tick T+1.

use super::geom::Rect;
use super::state::{Door, DoorRequirement, Entity, EntityId, SimEvent, World};

/// Pressed state of every switch, keyed by id
pub type SwitchStates = Vec<(EntityId, bool)>;

pub fn switch_states(world: &World) -> SwitchStates {
    world.switches().map(|s| (s.id, s.pressed)).collect()
}

fn is_pressed(states: &[(EntityId, bool)], id: EntityId) -> bool {
    states
        .iter()
        .find(|(switch, _)| *switch == id)
        .is_some_and(|(_, pressed)| *pressed)
}

/// Recompute all derived entity state from the active bodies
pub fn update_world(world: &mut World, bodies: &[Rect], events: &mut Vec<SimEvent>) {
    let previous = switch_states(world);
    update_switches(world, bodies, events);
    update_doors(world, &previous, events);
    let current = switch_states(world);
    update_lasers(world, &current, bodies, events);
}

/// A switch is pressed while any active body overlaps it
pub fn update_switches(world: &mut World, bodies: &[Rect], events: &mut Vec<SimEvent>) {
    for entity in &mut world.entities {
        if let Entity::Switch(switch) = entity {
            let pressed = bodies.iter().any(|b| b.overlaps(&switch.rect));
            if pressed != switch.pressed {
                switch.pressed = pressed;
                events.push(SimEvent::SwitchChanged {
                    id: switch.id,
                    pressed,
                });
            }
        }
    }
}

/// Open/closed state a door should have given switch states
pub fn door_should_open(door: &Door, switches: &[(EntityId, bool)]) -> bool {
    if door.switches.is_empty() {
        return door.initially_open;
    }
    let mut linked = door.switches.iter().map(|id| is_pressed(switches, *id));
    match door.requirement {
        DoorRequirement::Any => linked.any(|pressed| pressed),
        DoorRequirement::All => linked.all(|pressed| pressed),
    }
}

pub fn update_doors(world: &mut World, switches: &[(EntityId, bool)], events: &mut Vec<SimEvent>) {
    for entity in &mut world.entities {
        if let Entity::Door(door) = entity {
            let open = door_should_open(door, switches);
            if open != door.open {
                door.set_open(open);
                events.push(SimEvent::DoorChanged { id: door.id, open });
            }
        }
    }
}

/// A laser is blocked while its beam crosses any active body. A linked switch
/// cuts the power while pressed; `powered` and `blocked` are independent.
pub fn update_lasers(
    world: &mut World,
    switches: &[(EntityId, bool)],
    bodies: &[Rect],
    events: &mut Vec<SimEvent>,
) {
    for entity in &mut world.entities {
        if let Entity::Laser(laser) = entity {
            laser.powered = !laser.switches.iter().any(|id| is_pressed(switches, *id));
            let blocked = bodies.iter().any(|b| laser.beam.intersects_rect(b));
            if blocked != laser.blocked {
                laser.blocked = blocked;
                events.push(SimEvent::LaserChanged {
                    id: laser.id,
                    blocked,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geom::Segment;
    use crate::sim::state::{Laser, Switch};
    use glam::Vec2;

    fn switch(id: u32, x: f32, doors: Vec<EntityId>) -> Entity {
        Entity::Switch(Switch {
            id: EntityId(id),
            rect: Rect::new(x, 550.0, 40.0, 10.0),
            pressed: false,
            doors,
        })
    }

    fn door(id: u32, initially_open: bool, req: DoorRequirement, switches: Vec<EntityId>) -> Door {
        let mut door = Door::new(EntityId(id), Rect::new(600.0, 400.0, 20.0, 160.0), initially_open, req);
        door.switches = switches;
        door
    }

    fn door_open(world: &World, id: u32) -> bool {
        world.doors().find(|d| d.id == EntityId(id)).map(|d| d.open).unwrap()
    }

    /// Body standing on the switch at `x`
    fn on_switch(x: f32) -> Rect {
        Rect::new(x + 8.0, 528.0, 24.0, 32.0)
    }

    #[test]
    fn test_unlinked_door_keeps_initial_state() {
        let states = vec![(EntityId(0), true), (EntityId(1), true)];
        assert!(door_should_open(&door(5, true, DoorRequirement::Any, vec![]), &states));
        assert!(!door_should_open(&door(5, false, DoorRequirement::Any, vec![]), &states));
        assert!(!door_should_open(&door(5, false, DoorRequirement::All, vec![]), &[]));
    }

    #[test]
    fn test_door_any_and_all() {
        let linked = vec![EntityId(0), EntityId(1)];
        let any = door(5, false, DoorRequirement::Any, linked.clone());
        let all = door(6, false, DoorRequirement::All, linked);

        let none = [(EntityId(0), false), (EntityId(1), false)];
        let one = [(EntityId(0), true), (EntityId(1), false)];
        let both = [(EntityId(0), true), (EntityId(1), true)];

        assert!(!door_should_open(&any, &none));
        assert!(door_should_open(&any, &one));
        assert!(door_should_open(&any, &both));

        assert!(!door_should_open(&all, &none));
        assert!(!door_should_open(&all, &one));
        assert!(door_should_open(&all, &both));
    }

    #[test]
    fn test_switch_press_opens_door_next_tick() {
        let mut world = World::new(vec![
            switch(0, 100.0, vec![EntityId(1)]),
            Entity::Door(door(1, false, DoorRequirement::Any, vec![EntityId(0)])),
        ]);
        let mut events = Vec::new();

        // Tick T: body arrives on the switch
        update_world(&mut world, &[on_switch(100.0)], &mut events);
        assert!(world.switches().next().unwrap().pressed);
        assert!(!door_open(&world, 1));
        assert_eq!(
            events,
            vec![SimEvent::SwitchChanged {
                id: EntityId(0),
                pressed: true
            }]
        );

        // Tick T+1
        events.clear();
        update_world(&mut world, &[on_switch(100.0)], &mut events);
        assert!(door_open(&world, 1));
        assert_eq!(
            events,
            vec![SimEvent::DoorChanged {
                id: EntityId(1),
                open: true
            }]
        );

        // Body leaves: switch releases at once, door closes a tick later
        events.clear();
        update_world(&mut world, &[], &mut events);
        assert!(!world.switches().next().unwrap().pressed);
        assert!(door_open(&world, 1));
        update_world(&mut world, &[], &mut events);
        assert!(!door_open(&world, 1));
    }

    #[test]
    fn test_touching_body_does_not_press() {
        let mut world = World::new(vec![switch(0, 100.0, vec![])]);
        let mut events = Vec::new();
        // Bottom edge exactly on the switch top
        update_switches(&mut world, &[Rect::new(100.0, 518.0, 24.0, 32.0)], &mut events);
        assert!(!world.switches().next().unwrap().pressed);
        assert!(events.is_empty());
    }

    #[test]
    fn test_laser_blocking_and_power() {
        let mut world = World::new(vec![
            switch(0, 100.0, vec![]),
            Entity::Laser(Laser {
                id: EntityId(1),
                beam: Segment::new(Vec2::new(300.0, 500.0), Vec2::new(500.0, 500.0)),
                blocked: false,
                powered: true,
                switches: vec![EntityId(0)],
            }),
        ]);
        let in_beam = Rect::new(390.0, 480.0, 24.0, 32.0);
        let mut events = Vec::new();

        update_world(&mut world, &[in_beam], &mut events);
        let laser = world.lasers().next().unwrap();
        assert!(laser.powered);
        assert!(laser.blocked);

        // Someone on the linked switch cuts the power; the beam stays blocked
        events.clear();
        update_world(&mut world, &[in_beam, on_switch(100.0)], &mut events);
        let laser = world.lasers().next().unwrap();
        assert!(!laser.powered);
        assert!(laser.blocked);
        assert!(!events.iter().any(|e| matches!(e, SimEvent::LaserChanged { .. })));

        // Body leaves the beam while the power is still cut
        events.clear();
        update_world(&mut world, &[on_switch(100.0)], &mut events);
        let laser = world.lasers().next().unwrap();
        assert!(!laser.powered);
        assert!(!laser.blocked);
        assert_eq!(
            events,
            vec![SimEvent::LaserChanged {
                id: EntityId(1),
                blocked: false
            }]
        );
    }
}
