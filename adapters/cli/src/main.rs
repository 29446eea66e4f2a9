#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless driver for the Rushline level generator.
//!
//! Runs the full command/event loop for a fixed number of ticks: the world
//! applies commands, the pure systems react to the emitted events on the
//! next tick, and a generation report is printed at the end.

mod report;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use rushline_core::{Command, Event, WorldPos, WELCOME_BANNER};
use rushline_system_enemy_waves::WaveSpawner;
use rushline_system_terrain::TerrainGenerator;
use rushline_system_wall::WallDriver;
use rushline_world::{apply, query, World};

use crate::report::Report;

/// Command-line arguments for the headless demo run.
#[derive(Debug, Parser)]
#[command(name = "rushline", about = "Headless endless-level generation demo")]
struct Args {
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Deterministic seed shared by every system.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Player speed in world units per second.
    #[arg(long, default_value_t = 6.0)]
    player_speed: f32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    println!("{WELCOME_BANNER}");
    let report = run(&args);
    println!("{}", report.render()?);
    Ok(())
}

fn run(args: &Args) -> Report {
    let dt = Duration::from_millis(args.tick_ms);
    let mut world = World::new();
    let mut terrain =
        TerrainGenerator::new(rushline_system_terrain::Config::default(), args.seed);
    let mut waves = WaveSpawner::new(rushline_system_enemy_waves::Config::default(), args.seed);
    let mut wall = WallDriver::new(
        rushline_system_wall::Tuning::default(),
        query::wall_position(&world),
    );

    let mut report = Report::default();
    let mut player_x = 0.0_f32;
    let mut events: Vec<Event> = Vec::new();
    let mut commands: Vec<Command> = Vec::new();

    for _ in 0..args.ticks {
        // Systems react to everything the world emitted last tick.
        commands.clear();
        let roster = query::enemy_roster_kinds(&world);
        terrain.handle(&events, &mut commands);
        waves.handle(&events, &roster, &mut commands);
        wall.handle(&events, &mut commands);

        events.clear();
        player_x += args.player_speed * dt.as_secs_f32();
        apply(
            &mut world,
            Command::SetPlayerPosition {
                position: WorldPos::new(player_x, 0.0),
            },
            &mut events,
        );
        apply(&mut world, Command::Tick { dt }, &mut events);
        for command in commands.drain(..) {
            apply(&mut world, command, &mut events);
        }
        report.observe(&events);
    }

    report.finish(&world);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_flags_override_their_defaults() {
        let args = Args::parse_from(["rushline", "--ticks", "120", "--seed", "42"]);
        assert_eq!(args.ticks, 120);
        assert_eq!(args.seed, 42);
        assert_eq!(args.tick_ms, 50);
        assert_eq!(args.player_speed, 6.0);
    }

    #[test]
    fn bare_invocation_uses_the_documented_defaults() {
        let args = Args::parse_from(["rushline"]);
        assert_eq!(args.ticks, 600);
        assert_eq!(args.tick_ms, 50);
        assert_eq!(args.seed, 7);
    }

    #[test]
    fn short_run_produces_a_renderable_report() {
        let args = Args::parse_from(["rushline", "--ticks", "40"]);
        let report = run(&args);
        let rendered = report.render().unwrap();
        assert!(rendered.contains("generation report"));
    }
}
