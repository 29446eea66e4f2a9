//! Integration of the wave spawner against a live world.

use std::time::Duration;

use rushline_core::{CollectibleKind, Command, DropRequest, EnemyKind, Event, SegmentKind, WorldPos};
use rushline_system_enemy_waves::{Config, WaveSpawner};
use rushline_world::{apply, query, Spawner, World};

fn react(world: &mut World, spawner: &mut WaveSpawner, events: &[Event]) -> Vec<Event> {
    let roster = query::enemy_roster_kinds(world);
    let mut commands = Vec::new();
    spawner.handle(events, &roster, &mut commands);

    let mut produced = Vec::new();
    for command in commands {
        apply(world, command, &mut produced);
    }
    produced
}

#[test]
fn wave_tick_spawns_onto_safe_ground() {
    let mut world = World::new();
    let mut spawner = WaveSpawner::new(Config::default(), 4);

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::SpawnSegment {
            kind: SegmentKind::Normal,
            position: WorldPos::new(10.0, 2.0),
        },
        &mut events,
    );
    apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(800),
        },
        &mut events,
    );

    let produced = react(&mut world, &mut spawner, &events);
    assert!(matches!(
        produced[0],
        Event::EnemySpawned {
            kind: EnemyKind::Brute,
            ..
        }
    ));
    assert_eq!(query::enemies(&world).active_count(), 1);
    let enemy = query::enemies(&world).iter().next().expect("live enemy");
    assert_eq!(enemy.position(), WorldPos::new(10.0, 3.0));
}

#[test]
fn delegated_request_lands_in_the_world() {
    let mut world = World::new();
    let mut spawner = WaveSpawner::new(Config::default(), 4);

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::RequestEnemySpawn {
            position: WorldPos::new(42.0, 3.0),
        },
        &mut events,
    );

    let produced = react(&mut world, &mut spawner, &events);
    assert!(matches!(produced[0], Event::EnemySpawned { .. }));
    assert_eq!(query::enemies(&world).active_count(), 1);
}

#[test]
fn forwarded_drop_spawns_the_exact_kind() {
    let mut world = World::new();
    let mut spawner = WaveSpawner::new(Config::default(), 4);

    let death_position = WorldPos::new(33.0, 4.0);
    let produced = react(
        &mut world,
        &mut spawner,
        &[Event::DropRequested {
            request: DropRequest::new(CollectibleKind::Gem, death_position),
        }],
    );

    assert!(matches!(
        produced[0],
        Event::CollectibleSpawned {
            kind: CollectibleKind::Gem,
            ..
        }
    ));
    let collectible = query::collectibles(&world).iter().next().expect("drop");
    assert_eq!(collectible.position(), death_position);
    assert_eq!(
        query::reserved_cells(&world),
        0,
        "drops bypass the reservation grid"
    );
}
