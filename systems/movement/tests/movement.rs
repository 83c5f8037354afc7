use deck_defence_core::{
    Archetype, AttackerId, CellCoord, Command, DefenderId, DefenderKind, Event, HpMultiplier,
};
use deck_defence_system_movement::Movement;
use deck_defence_world::{self as world, query, World};

fn world_with_single_attacker(archetype: Archetype) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartWave {
            composition: vec![archetype],
            hp_multiplier: HpMultiplier::UNIT,
        },
        &mut events,
    );
    world::apply(&mut world, Command::SpawnAttacker, &mut events);
    world
}

fn step(world: &mut World, movement: &mut Movement) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);

    let mut commands = Vec::new();
    movement.handle(
        &events,
        query::phase(world),
        &query::attacker_view(world),
        &mut commands,
    );
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn path_index(world: &World) -> Option<u32> {
    query::attacker_view(world)
        .iter()
        .next()
        .map(|snapshot| snapshot.path_index)
}

#[test]
fn attacker_walks_one_cell_per_tick_until_it_leaks() {
    let mut world = world_with_single_attacker(Archetype::Weak);
    let mut movement = Movement::new();

    for expected in 1..=13 {
        let _ = step(&mut world, &mut movement);
        assert_eq!(path_index(&world), Some(expected));
    }

    let events = step(&mut world, &mut movement);
    assert!(events.contains(&Event::LivesLost {
        attacker: AttackerId::new(0),
        remaining: 19,
    }));
    assert_eq!(path_index(&world), None);
    assert_eq!(query::economy(&world).lives(), 19);
}

#[test]
fn slowed_attacker_skips_alternate_ticks() {
    let mut world = world_with_single_attacker(Archetype::Armored);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Build {
            kind: DefenderKind::Chill,
            cell: CellCoord::new(0, 1),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::FireDefender {
            defender: DefenderId::new(0),
            attacker: AttackerId::new(0),
        },
        &mut events,
    );

    let mut movement = Movement::new();
    let mut trail = Vec::new();
    for _ in 0..5 {
        let _ = step(&mut world, &mut movement);
        trail.push(path_index(&world).expect("attacker on path"));
    }

    assert_eq!(trail, vec![0, 1, 1, 2, 3]);
    let snapshot = query::attacker_view(&world)
        .into_vec()
        .pop()
        .expect("attacker on path");
    assert_eq!(snapshot.slow_remaining, 0);
}
