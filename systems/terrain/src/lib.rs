#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frontier terrain generation system.
//!
//! Keeps the platform and floor frontiers populated ahead of the player,
//! rolls the height-pattern machine for each placement, and delegates
//! content (collectibles, enemies, scenery, throwables) onto freshly placed
//! platforms. The system is pure: it consumes [`Event`] values and emits
//! [`Command`] values, never touching the world directly.

mod height;

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rushline_core::{CollectibleSource, Command, Event, SegmentKind, WorldPos};
use sha2::{Digest, Sha256};

use crate::height::HeightMachine;

const RNG_STREAM_TERRAIN: &str = "terrain";

/// Tuning parameters for the terrain generator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Accumulated simulation time between generation passes.
    pub tick_interval: Duration,
    /// How far ahead of the player both frontiers are kept populated.
    pub lookahead: f32,
    /// Distance behind the player at which objects are recycled.
    pub trailing: f32,
    /// Horizontal extent of a platform.
    pub platform_width: f32,
    /// Minimum gap rolled between consecutive platforms.
    pub gap_min: f32,
    /// Maximum gap rolled between consecutive platforms.
    pub gap_max: f32,
    /// Horizontal extent of one floor strip.
    pub floor_segment_len: f32,
    /// Fixed height of the floor lane.
    pub floor_y: f32,
    /// Lower edge of the platform height band.
    pub min_height: i32,
    /// Upper edge of the platform height band.
    pub max_height: i32,
    /// Probability that a non-starter platform is breakable.
    pub breakable_ratio: f32,
    /// Number of opening platforms that are always sturdy.
    pub starter_platforms: u32,
    /// Platforms closer than this to the player carry no content.
    pub min_player_gap: f32,
    /// Independent per-platform collectible probability.
    pub collectible_chance: f32,
    /// Width of the enemy delegation band.
    pub enemy_band: f32,
    /// Width of the scenery band, stacked after the enemy band.
    pub scenery_band: f32,
    /// Width of the throwable band, stacked after the scenery band.
    pub throwable_band: f32,
    /// Platforms that must pass after a successful enemy spawn before the
    /// enemy band is eligible again.
    pub enemy_gate: u32,
    /// Platform spacing gate for the scenery band.
    pub scenery_gate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(250),
            lookahead: 60.0,
            trailing: 40.0,
            platform_width: 3.0,
            gap_min: 1.0,
            gap_max: 3.0,
            floor_segment_len: 4.0,
            floor_y: -2.0,
            min_height: 1,
            max_height: 6,
            breakable_ratio: 0.2,
            starter_platforms: 3,
            min_player_gap: 6.0,
            collectible_chance: 0.35,
            enemy_band: 0.15,
            scenery_band: 0.25,
            throwable_band: 0.20,
            enemy_gate: 4,
            scenery_gate: 2,
        }
    }
}

/// Pure system that keeps the terrain frontier ahead of the player.
#[derive(Debug)]
pub struct TerrainGenerator {
    config: Config,
    seed: u64,
    rng: ChaCha8Rng,
    accumulated: Duration,
    player_x: f32,
    next_platform_x: f32,
    next_floor_x: f32,
    placed_platforms: u32,
    placed_floors: u32,
    platforms_since_enemy: u32,
    platforms_since_scenery: u32,
    enemy_pending: bool,
    scenery_pending: bool,
    heights: HeightMachine,
}

impl TerrainGenerator {
    /// Creates a generator with its own labeled RNG stream.
    #[must_use]
    pub fn new(config: Config, seed: u64) -> Self {
        Self {
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(derive_stream_seed(seed)),
            accumulated: Duration::ZERO,
            player_x: 0.0,
            next_platform_x: 0.0,
            next_floor_x: 0.0,
            placed_platforms: 0,
            placed_floors: 0,
            platforms_since_enemy: 0,
            platforms_since_scenery: 0,
            enemy_pending: false,
            scenery_pending: false,
            heights: HeightMachine::new(config.min_height, config.min_height, config.max_height),
        }
    }

    /// Consumes world events and emits generation commands for due passes.
    pub fn handle(&mut self, events: &[Event], out_commands: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.accumulated = self.accumulated.saturating_add(*dt);
                }
                Event::PlayerMoved { position } => self.player_x = position.x(),
                Event::EnemySpawned { .. } => {
                    self.enemy_pending = false;
                    self.platforms_since_enemy = 0;
                }
                Event::ScenerySpawned { .. } => {
                    self.scenery_pending = false;
                    self.platforms_since_scenery = 0;
                }
                Event::WorldReset => self.reset(),
                _ => {}
            }
        }

        while self.accumulated >= self.config.tick_interval {
            self.accumulated -= self.config.tick_interval;
            self.generation_pass(out_commands);
        }
    }

    fn generation_pass(&mut self, out_commands: &mut Vec<Command>) {
        let frontier = self.player_x + self.config.lookahead;

        while self.next_platform_x < frontier {
            self.place_platform(out_commands);
        }

        while self.next_floor_x < frontier {
            let position = WorldPos::new(self.next_floor_x, self.config.floor_y);
            out_commands.push(Command::SpawnSegment {
                kind: SegmentKind::Floor,
                position,
            });

            // Floor strips carry content too, under the same starter and
            // player-distance rules as platforms.
            let starter = self.placed_floors < self.config.starter_platforms;
            self.placed_floors = self.placed_floors.saturating_add(1);
            if !starter && position.x() - self.player_x >= self.config.min_player_gap {
                self.roll_content(SegmentKind::Floor, position, out_commands);
            }

            self.next_floor_x += self.config.floor_segment_len;
        }

        out_commands.push(Command::RecycleBehind {
            threshold_x: self.player_x - self.config.trailing,
        });
    }

    fn place_platform(&mut self, out_commands: &mut Vec<Command>) {
        let x = self.next_platform_x;
        let height = self.heights.advance(&mut self.rng);
        let position = WorldPos::new(x, height as f32);

        // The opening stretch must hold under the player no matter what.
        let starter = self.placed_platforms < self.config.starter_platforms;
        let kind = if !starter && self.rng.gen::<f32>() < self.config.breakable_ratio {
            SegmentKind::Breakable
        } else {
            SegmentKind::Normal
        };
        out_commands.push(Command::SpawnSegment { kind, position });

        self.placed_platforms = self.placed_platforms.saturating_add(1);
        self.platforms_since_enemy = self.platforms_since_enemy.saturating_add(1);
        self.platforms_since_scenery = self.platforms_since_scenery.saturating_add(1);

        if !starter && x - self.player_x >= self.config.min_player_gap {
            self.roll_content(kind, position, out_commands);
        }

        let gap = self.rng.gen_range(self.config.gap_min..=self.config.gap_max);
        self.next_platform_x = x + self.config.platform_width + gap;
    }

    fn roll_content(&mut self, kind: SegmentKind, position: WorldPos, out: &mut Vec<Command>) {
        let perch = position.offset(0.0, 1.0);
        if self.rng.gen::<f32>() < self.config.collectible_chance {
            out.push(Command::SpawnCollectible {
                position: perch,
                source: CollectibleSource::GeneratorRoll,
            });
        }

        let breakable = kind == SegmentKind::Breakable;
        let band = self.rng.gen::<f32>();
        if band < self.config.enemy_band {
            if !breakable
                && !self.enemy_pending
                && self.platforms_since_enemy >= self.config.enemy_gate
            {
                self.enemy_pending = true;
                out.push(Command::RequestEnemySpawn { position: perch });
            }
        } else if band < self.config.enemy_band + self.config.scenery_band {
            if !breakable
                && !self.scenery_pending
                && self.platforms_since_scenery >= self.config.scenery_gate
            {
                self.scenery_pending = true;
                out.push(Command::SpawnScenery { position: perch });
            }
        } else if band
            < self.config.enemy_band + self.config.scenery_band + self.config.throwable_band
        {
            out.push(Command::SpawnThrowable { position: perch });
        }
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(derive_stream_seed(self.seed));
        self.accumulated = Duration::ZERO;
        self.player_x = 0.0;
        self.next_platform_x = 0.0;
        self.next_floor_x = 0.0;
        self.placed_platforms = 0;
        self.placed_floors = 0;
        self.platforms_since_enemy = 0;
        self.platforms_since_scenery = 0;
        self.enemy_pending = false;
        self.scenery_pending = false;
        self.heights.reset(self.config.min_height);
    }
}

fn derive_stream_seed(global_seed: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(RNG_STREAM_TERRAIN.as_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance(generator: &mut TerrainGenerator, passes: u32) -> Vec<Command> {
        let mut commands = Vec::new();
        for _ in 0..passes {
            generator.handle(
                &[Event::TimeAdvanced {
                    dt: Duration::from_millis(250),
                }],
                &mut commands,
            );
        }
        commands
    }

    fn platform_spawns(commands: &[Command]) -> Vec<(SegmentKind, WorldPos)> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::SpawnSegment { kind, position } if *kind != SegmentKind::Floor => {
                    Some((*kind, *position))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn no_pass_runs_before_the_interval_accumulates() {
        let mut generator = TerrainGenerator::new(Config::default(), 1);
        let mut commands = Vec::new();
        generator.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(100),
            }],
            &mut commands,
        );
        assert!(commands.is_empty());
    }

    #[test]
    fn platform_frontier_is_strictly_monotonic() {
        let mut generator = TerrainGenerator::new(Config::default(), 42);
        let commands = advance(&mut generator, 4);
        let platforms = platform_spawns(&commands);
        assert!(platforms.len() >= 2);
        for pair in platforms.windows(2) {
            assert!(pair[0].1.x() < pair[1].1.x());
        }
    }

    #[test]
    fn floor_frontier_advances_in_fixed_strides() {
        let config = Config::default();
        let mut generator = TerrainGenerator::new(config, 42);
        let commands = advance(&mut generator, 1);
        let floors: Vec<f32> = commands
            .iter()
            .filter_map(|command| match command {
                Command::SpawnSegment {
                    kind: SegmentKind::Floor,
                    position,
                } => Some(position.x()),
                _ => None,
            })
            .collect();
        assert!(!floors.is_empty());
        for pair in floors.windows(2) {
            assert_eq!(pair[1] - pair[0], config.floor_segment_len);
        }
    }

    #[test]
    fn heights_respect_the_configured_band() {
        let config = Config::default();
        let mut generator = TerrainGenerator::new(config, 7);
        let commands = advance(&mut generator, 20);
        for (_, position) in platform_spawns(&commands) {
            let height = position.y() as i32;
            assert!(
                (config.min_height..=config.max_height).contains(&height),
                "height {height} left the band"
            );
        }
    }

    #[test]
    fn starter_platforms_are_never_breakable() {
        for seed in 0..16 {
            let config = Config::default();
            let mut generator = TerrainGenerator::new(config, seed);
            let commands = advance(&mut generator, 2);
            let platforms = platform_spawns(&commands);
            for (kind, _) in platforms.iter().take(config.starter_platforms as usize) {
                assert_eq!(*kind, SegmentKind::Normal, "seed {seed} broke a starter");
            }
        }
    }

    #[test]
    fn every_pass_emits_exactly_one_recycle() {
        let mut generator = TerrainGenerator::new(Config::default(), 3);
        let commands = advance(&mut generator, 5);
        let recycles = commands
            .iter()
            .filter(|command| matches!(command, Command::RecycleBehind { .. }))
            .count();
        assert_eq!(recycles, 5);
    }

    #[test]
    fn floor_strips_receive_content_delegation() {
        let config = Config::default();
        let mut generator = TerrainGenerator::new(config, 11);
        let mut commands = Vec::new();
        for step in 1..=400_u32 {
            generator.handle(
                &[
                    Event::PlayerMoved {
                        position: WorldPos::new(step as f32 * 2.0, 0.0),
                    },
                    Event::TimeAdvanced {
                        dt: Duration::from_millis(250),
                    },
                ],
                &mut commands,
            );
        }

        // Floor content sits at the floor perch, one unit above floor_y and
        // below every platform height.
        let floor_perch_y = config.floor_y + 1.0;
        let floor_content = commands.iter().any(|command| {
            let position = match command {
                Command::SpawnCollectible { position, .. }
                | Command::SpawnThrowable { position }
                | Command::SpawnScenery { position }
                | Command::RequestEnemySpawn { position } => position,
                _ => return false,
            };
            position.y() == floor_perch_y
        });
        assert!(floor_content, "floor strips must carry content rolls");
    }

    #[test]
    fn enemy_delegation_waits_for_a_successful_spawn() {
        let mut generator = TerrainGenerator::new(Config::default(), 11);
        // Push the player far forward so plenty of content-eligible
        // platforms are placed without any spawn confirmations coming back.
        let mut commands = Vec::new();
        for step in 1..=40_u32 {
            generator.handle(
                &[
                    Event::PlayerMoved {
                        position: WorldPos::new(step as f32 * 10.0, 0.0),
                    },
                    Event::TimeAdvanced {
                        dt: Duration::from_millis(250),
                    },
                ],
                &mut commands,
            );
        }
        let requests = commands
            .iter()
            .filter(|command| matches!(command, Command::RequestEnemySpawn { .. }))
            .count();
        assert!(requests <= 1, "gate must close until a spawn is observed");
    }

    #[test]
    fn observed_enemy_spawn_reopens_the_gate() {
        let mut generator = TerrainGenerator::new(Config::default(), 11);
        generator.enemy_pending = true;
        generator.platforms_since_enemy = 9;

        generator.handle(
            &[Event::EnemySpawned {
                id: rushline_core::EnemyId::new(0),
                kind: rushline_core::EnemyKind::Creep,
                position: WorldPos::new(20.0, 2.0),
            }],
            &mut Vec::new(),
        );
        assert!(!generator.enemy_pending);
        assert_eq!(generator.platforms_since_enemy, 0);
    }

    #[test]
    fn replays_identically_for_the_same_seed() {
        let mut a = TerrainGenerator::new(Config::default(), 99);
        let mut b = TerrainGenerator::new(Config::default(), 99);
        assert_eq!(advance(&mut a, 10), advance(&mut b, 10));
    }

    #[test]
    fn reset_rewinds_the_frontier() {
        let mut generator = TerrainGenerator::new(Config::default(), 5);
        let first = advance(&mut generator, 3);
        generator.handle(&[Event::WorldReset], &mut Vec::new());
        let second = advance(&mut generator, 3);
        assert_eq!(first, second, "reset must restore the initial stream");
    }
}
