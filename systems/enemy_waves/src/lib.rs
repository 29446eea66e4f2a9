#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave-based enemy spawning system.
//!
//! Spawns enemies onto safe ground in waves: a running wave places one
//! enemy per due tick up to the active cap, a finished wave rests for a
//! rolled break, and the wave after a break opens with a short burst. Each
//! wave runs on its own RNG stream derived from the global seed, so a
//! replay of the same event log yields the same spawn decisions.

use std::collections::VecDeque;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rushline_core::{CollectibleSource, Command, EnemyKind, Event, WorldPos};
use sha2::{Digest, Sha256};

const RNG_STREAM_WAVE: &str = "wave";
const COMMON_WEIGHT: u32 = 1_000;

/// Tuning parameters for the wave spawner.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Accumulated simulation time between spawn ticks.
    pub tick_interval: Duration,
    /// Hard cap on enemies alive or in flight at once.
    pub max_active: u32,
    /// Minimum distance between consecutive successful spawns.
    pub min_spawn_gap: f32,
    /// Shortest break after a wave ends.
    pub break_min: Duration,
    /// Longest break after a wave ends.
    pub break_max: Duration,
    /// Spawn attempts granted on the first tick after a break.
    pub burst_limit: u32,
    /// Kind forced for the first spawn of every wave.
    pub opener: EnemyKind,
    /// Simulation time before which the rare kind never spawns.
    pub rare_unlock: Duration,
    /// Player distance where the rare weight ramp begins.
    pub rare_ramp_start: f32,
    /// Distance over which the rare weight ramps to full.
    pub rare_ramp_span: f32,
    /// Peak probability of a bonus rare spawn at a death position.
    pub bonus_rare_chance: f32,
    /// Cooldown between bonus rare spawns.
    pub bonus_cooldown: Duration,
    /// Maximum safe-ground candidates remembered.
    pub safe_ground_cap: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(800),
            max_active: 3,
            min_spawn_gap: 8.0,
            break_min: Duration::from_secs(5),
            break_max: Duration::from_secs(7),
            burst_limit: 3,
            opener: EnemyKind::Brute,
            rare_unlock: Duration::from_secs(60),
            rare_ramp_start: 200.0,
            rare_ramp_span: 400.0,
            bonus_rare_chance: 0.25,
            bonus_cooldown: Duration::from_secs(20),
            safe_ground_cap: 64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Break { until: Duration },
}

/// Pure system that schedules enemy spawns in waves.
#[derive(Debug)]
pub struct WaveSpawner {
    config: Config,
    global_seed: u64,
    rng: ChaCha8Rng,
    phase: Phase,
    clock: Duration,
    accumulated: Duration,
    safe_ground: VecDeque<WorldPos>,
    active: u32,
    pending: u32,
    wave_index: u32,
    opener_confirmed: bool,
    last_spawn_x: Option<f32>,
    player_x: f32,
    last_bonus_at: Option<Duration>,
}

impl WaveSpawner {
    /// Creates a spawner whose first wave stream derives from the seed.
    #[must_use]
    pub fn new(config: Config, global_seed: u64) -> Self {
        Self {
            config,
            global_seed,
            rng: ChaCha8Rng::seed_from_u64(derive_wave_seed(global_seed, 0)),
            phase: Phase::Idle,
            clock: Duration::ZERO,
            accumulated: Duration::ZERO,
            safe_ground: VecDeque::new(),
            active: 0,
            pending: 0,
            wave_index: 0,
            opener_confirmed: false,
            last_spawn_x: None,
            player_x: 0.0,
            last_bonus_at: None,
        }
    }

    /// Consumes world events and emits spawn commands for due ticks.
    ///
    /// `roster` lists the enemy kinds whose templates are registered; the
    /// forced opener falls back to a weighted roll when it is missing.
    pub fn handle(
        &mut self,
        events: &[Event],
        roster: &[EnemyKind],
        out_commands: &mut Vec<Command>,
    ) {
        for event in events {
            self.observe(event, roster, out_commands);
        }

        while self.accumulated >= self.config.tick_interval {
            self.accumulated -= self.config.tick_interval;
            self.step(roster, out_commands);
        }
    }

    fn observe(&mut self, event: &Event, roster: &[EnemyKind], out: &mut Vec<Command>) {
        match event {
            Event::TimeAdvanced { dt } => {
                self.clock = self.clock.saturating_add(*dt);
                self.accumulated = self.accumulated.saturating_add(*dt);
            }
            Event::PlayerMoved { position } => self.player_x = position.x(),
            Event::SegmentSpawned { kind, position, .. } if kind.is_safe_ground() => {
                if self.safe_ground.len() >= self.config.safe_ground_cap {
                    let _ = self.safe_ground.pop_front();
                }
                self.safe_ground.push_back(position.offset(0.0, 1.0));
            }
            Event::EnemySpawned { position, .. } => {
                self.pending = self.pending.saturating_sub(1);
                self.active = self.active.saturating_add(1);
                self.opener_confirmed = true;
                self.last_spawn_x = Some(position.x());
            }
            Event::SpawnRejected {
                category: rushline_core::SpawnCategory::Enemy,
                ..
            } => {
                self.pending = self.pending.saturating_sub(1);
            }
            Event::EnemyDied { position, .. } => {
                let was_active = self.active;
                self.active = self.active.saturating_sub(1);
                self.maybe_bonus_rare(*position, roster, out);
                if was_active == 1 && self.active == 0 {
                    self.begin_break();
                }
            }
            Event::EnemyRecycled { .. } => {
                let was_active = self.active;
                self.active = self.active.saturating_sub(1);
                if was_active == 1 && self.active == 0 {
                    self.begin_break();
                }
            }
            Event::EnemySpawnRequested { position } => {
                if self.live_total() < self.config.max_active {
                    if let Some(kind) = self.choose_kind(roster) {
                        self.pending = self.pending.saturating_add(1);
                        out.push(Command::SpawnEnemy {
                            kind,
                            position: *position,
                        });
                    }
                }
            }
            Event::DropRequested { request } => {
                // Forwarded verbatim: exact kind, exact death position.
                out.push(Command::SpawnCollectible {
                    position: request.position(),
                    source: CollectibleSource::Drop(request.kind()),
                });
            }
            Event::WorldReset => self.reset(),
            _ => {}
        }
    }

    fn step(&mut self, roster: &[EnemyKind], out: &mut Vec<Command>) {
        match self.phase {
            Phase::Idle => {
                if !self.safe_ground.is_empty() {
                    self.phase = Phase::Running;
                    self.try_spawns(1, roster, out);
                }
            }
            Phase::Break { until } => {
                if self.clock >= until {
                    self.phase = Phase::Running;
                    self.try_spawns(self.config.burst_limit, roster, out);
                }
            }
            Phase::Running => self.try_spawns(1, roster, out),
        }
    }

    fn try_spawns(&mut self, attempts: u32, roster: &[EnemyKind], out: &mut Vec<Command>) {
        for _ in 0..attempts {
            if self.live_total() >= self.config.max_active {
                return;
            }
            let Some(candidate) = self.safe_ground.pop_front() else {
                return;
            };
            if let Some(last_x) = self.last_spawn_x {
                if (candidate.x() - last_x).abs() < self.config.min_spawn_gap {
                    // Too close to the previous spawn: requeue and give the
                    // tick up rather than retrying another candidate now.
                    self.safe_ground.push_back(candidate);
                    return;
                }
            }
            let Some(kind) = self.choose_kind(roster) else {
                self.safe_ground.push_back(candidate);
                return;
            };
            self.pending = self.pending.saturating_add(1);
            out.push(Command::SpawnEnemy {
                kind,
                position: candidate,
            });
        }
    }

    fn choose_kind(&mut self, roster: &[EnemyKind]) -> Option<EnemyKind> {
        if roster.is_empty() {
            return None;
        }
        if !self.opener_confirmed && roster.contains(&self.config.opener) {
            return Some(self.config.opener);
        }

        let rare_weight = self.rare_weight();
        let weights: Vec<(EnemyKind, u32)> = roster
            .iter()
            .map(|kind| {
                let weight = if kind.is_rare() {
                    rare_weight
                } else {
                    COMMON_WEIGHT
                };
                (*kind, weight)
            })
            .collect();
        let total: u32 = weights.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return None;
        }

        let mut roll = self.rng.gen_range(0..total);
        for (kind, weight) in weights {
            if roll < weight {
                return Some(kind);
            }
            roll -= weight;
        }
        None
    }

    /// Rare-kind selection weight on the same fixed-point scale as
    /// [`COMMON_WEIGHT`]; hard-zeroed before the unlock time.
    fn rare_weight(&self) -> u32 {
        if self.clock < self.config.rare_unlock {
            return 0;
        }
        let ramp = ((self.player_x - self.config.rare_ramp_start) / self.config.rare_ramp_span)
            .clamp(0.0, 1.0);
        (ramp * COMMON_WEIGHT as f32) as u32
    }

    fn maybe_bonus_rare(
        &mut self,
        position: WorldPos,
        roster: &[EnemyKind],
        out: &mut Vec<Command>,
    ) {
        let rare_weight = self.rare_weight();
        if rare_weight == 0 {
            return;
        }
        let Some(rare) = roster.iter().copied().find(|kind| kind.is_rare()) else {
            return;
        };
        if let Some(last) = self.last_bonus_at {
            if self.clock < last.saturating_add(self.config.bonus_cooldown) {
                return;
            }
        }
        let chance = self.config.bonus_rare_chance * rare_weight as f32 / COMMON_WEIGHT as f32;
        if self.rng.gen::<f32>() < chance {
            self.last_bonus_at = Some(self.clock);
            self.pending = self.pending.saturating_add(1);
            out.push(Command::SpawnEnemy {
                kind: rare,
                position,
            });
        }
    }

    fn begin_break(&mut self) {
        let span = self
            .config
            .break_max
            .saturating_sub(self.config.break_min)
            .as_millis() as u64;
        let extra = if span == 0 {
            0
        } else {
            self.rng.gen_range(0..=span)
        };
        let length = self.config.break_min + Duration::from_millis(extra);
        self.phase = Phase::Break {
            until: self.clock.saturating_add(length),
        };
        self.wave_index = self.wave_index.wrapping_add(1);
        self.rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.global_seed, self.wave_index));
        self.opener_confirmed = false;
    }

    fn live_total(&self) -> u32 {
        self.active.saturating_add(self.pending)
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.global_seed, 0));
        self.phase = Phase::Idle;
        self.clock = Duration::ZERO;
        self.accumulated = Duration::ZERO;
        self.safe_ground.clear();
        self.active = 0;
        self.pending = 0;
        self.wave_index = 0;
        self.opener_confirmed = false;
        self.last_spawn_x = None;
        self.player_x = 0.0;
        self.last_bonus_at = None;
    }
}

fn derive_wave_seed(global_seed: u64, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(RNG_STREAM_WAVE.as_bytes());
    hasher.update(wave.to_le_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rushline_core::{DropRequest, EnemyId, SegmentId, SegmentKind};

    const ROSTER: [EnemyKind; 4] = EnemyKind::ALL;

    fn segment_spawned(id: u32, kind: SegmentKind, x: f32) -> Event {
        Event::SegmentSpawned {
            id: SegmentId::new(id),
            kind,
            position: WorldPos::new(x, 2.0),
        }
    }

    fn enemy_spawned(id: u32, x: f32) -> Event {
        Event::EnemySpawned {
            id: EnemyId::new(id),
            kind: EnemyKind::Creep,
            position: WorldPos::new(x, 3.0),
        }
    }

    fn tick(spawner: &mut WaveSpawner, dt: Duration) -> Vec<Command> {
        let mut commands = Vec::new();
        spawner.handle(&[Event::TimeAdvanced { dt }], &ROSTER, &mut commands);
        commands
    }

    fn spawn_commands(commands: &[Command]) -> Vec<(EnemyKind, WorldPos)> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::SpawnEnemy { kind, position } => Some((*kind, *position)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn only_sturdy_platforms_become_safe_ground() {
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        spawner.handle(
            &[
                segment_spawned(0, SegmentKind::Normal, 10.0),
                segment_spawned(1, SegmentKind::Breakable, 20.0),
                segment_spawned(2, SegmentKind::Floor, 30.0),
            ],
            &ROSTER,
            &mut Vec::new(),
        );
        assert_eq!(spawner.safe_ground.len(), 1);
        assert_eq!(spawner.safe_ground[0], WorldPos::new(10.0, 3.0));
    }

    #[test]
    fn first_spawn_forces_the_opener() {
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        spawner.handle(
            &[segment_spawned(0, SegmentKind::Normal, 10.0)],
            &ROSTER,
            &mut Vec::new(),
        );
        let commands = tick(&mut spawner, Duration::from_millis(800));
        assert_eq!(
            spawn_commands(&commands),
            vec![(EnemyKind::Brute, WorldPos::new(10.0, 3.0))]
        );
    }

    #[test]
    fn missing_opener_falls_back_to_the_weighted_roll() {
        let roster = [EnemyKind::Creep, EnemyKind::Spitter, EnemyKind::Revenant];
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        spawner.handle(
            &[segment_spawned(0, SegmentKind::Normal, 10.0)],
            &roster,
            &mut Vec::new(),
        );
        let mut commands = Vec::new();
        spawner.handle(
            &[Event::TimeAdvanced {
                dt: Duration::from_millis(800),
            }],
            &roster,
            &mut commands,
        );
        let spawns = spawn_commands(&commands);
        assert_eq!(spawns.len(), 1);
        let kind = spawns[0].0;
        assert_ne!(kind, EnemyKind::Brute);
        assert_ne!(kind, EnemyKind::Revenant, "rare is zeroed this early");
    }

    #[test]
    fn active_cap_blocks_further_spawns() {
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        spawner.handle(
            &[
                segment_spawned(0, SegmentKind::Normal, 10.0),
                enemy_spawned(0, 10.0),
                enemy_spawned(1, 30.0),
                enemy_spawned(2, 50.0),
            ],
            &ROSTER,
            &mut Vec::new(),
        );
        let commands = tick(&mut spawner, Duration::from_millis(800));
        assert!(spawn_commands(&commands).is_empty(), "cap of 3 holds");
    }

    #[test]
    fn too_close_candidate_skips_the_tick_without_retry() {
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        spawner.handle(
            &[
                enemy_spawned(0, 10.0),
                segment_spawned(0, SegmentKind::Normal, 12.0),
                segment_spawned(1, SegmentKind::Normal, 60.0),
            ],
            &ROSTER,
            &mut Vec::new(),
        );

        // First tick pops the near candidate and gives up for the tick.
        let commands = tick(&mut spawner, Duration::from_millis(800));
        assert!(spawn_commands(&commands).is_empty());

        // Second tick reaches the far candidate.
        let commands = tick(&mut spawner, Duration::from_millis(800));
        let spawns = spawn_commands(&commands);
        assert_eq!(spawns.len(), 1);
        assert_eq!(spawns[0].1, WorldPos::new(60.0, 3.0));
    }

    #[test]
    fn wave_end_breaks_before_the_burst() {
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        spawner.handle(
            &[
                segment_spawned(0, SegmentKind::Normal, 30.0),
                enemy_spawned(0, 10.0),
                Event::EnemyDied {
                    id: EnemyId::new(0),
                    kind: EnemyKind::Creep,
                    position: WorldPos::new(10.0, 3.0),
                },
            ],
            &ROSTER,
            &mut Vec::new(),
        );
        assert!(matches!(spawner.phase, Phase::Break { .. }));

        // A due tick during the break spawns nothing.
        let commands = tick(&mut spawner, Duration::from_millis(800));
        assert!(spawn_commands(&commands).is_empty());

        // Once the longest possible break elapses the burst fires.
        spawner.handle(
            &[
                segment_spawned(1, SegmentKind::Normal, 100.0),
                segment_spawned(2, SegmentKind::Normal, 120.0),
                segment_spawned(3, SegmentKind::Normal, 140.0),
                segment_spawned(4, SegmentKind::Normal, 160.0),
            ],
            &ROSTER,
            &mut Vec::new(),
        );
        let commands = tick(&mut spawner, Duration::from_secs(8));
        let spawns = spawn_commands(&commands);
        assert_eq!(spawns.len(), 3, "burst is capped at three attempts");
        assert_eq!(spawns[0].0, EnemyKind::Brute, "new wave re-forces the opener");
    }

    #[test]
    fn delegated_requests_are_honored_below_the_cap() {
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        let mut commands = Vec::new();
        spawner.handle(
            &[Event::EnemySpawnRequested {
                position: WorldPos::new(42.0, 3.0),
            }],
            &ROSTER,
            &mut commands,
        );
        let spawns = spawn_commands(&commands);
        assert_eq!(spawns, vec![(EnemyKind::Brute, WorldPos::new(42.0, 3.0))]);
    }

    #[test]
    fn drop_requests_forward_verbatim() {
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        let request = DropRequest::new(
            rushline_core::CollectibleKind::Gem,
            WorldPos::new(33.0, 4.0),
        );
        let mut commands = Vec::new();
        spawner.handle(&[Event::DropRequested { request }], &ROSTER, &mut commands);
        assert_eq!(
            commands,
            vec![Command::SpawnCollectible {
                position: WorldPos::new(33.0, 4.0),
                source: CollectibleSource::Drop(rushline_core::CollectibleKind::Gem),
            }]
        );
    }

    #[test]
    fn rare_weight_is_hard_zeroed_before_unlock() {
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        spawner.player_x = 10_000.0;
        spawner.clock = Duration::from_secs(59);
        assert_eq!(spawner.rare_weight(), 0);

        spawner.clock = Duration::from_secs(60);
        assert_eq!(spawner.rare_weight(), COMMON_WEIGHT);
    }

    #[test]
    fn rare_weight_ramps_with_distance() {
        let mut spawner = WaveSpawner::new(Config::default(), 1);
        spawner.clock = Duration::from_secs(120);
        spawner.player_x = 100.0;
        assert_eq!(spawner.rare_weight(), 0, "before the ramp start");
        spawner.player_x = 400.0;
        assert_eq!(spawner.rare_weight(), COMMON_WEIGHT / 2);
        spawner.player_x = 1_000.0;
        assert_eq!(spawner.rare_weight(), COMMON_WEIGHT);
    }

    #[test]
    fn reset_restores_the_first_wave_stream() {
        let mut a = WaveSpawner::new(Config::default(), 9);
        let mut b = WaveSpawner::new(Config::default(), 9);

        let warmup = [
            segment_spawned(0, SegmentKind::Normal, 10.0),
            enemy_spawned(0, 10.0),
        ];
        a.handle(&warmup, &ROSTER, &mut Vec::new());
        a.handle(&[Event::WorldReset], &ROSTER, &mut Vec::new());

        let script = [segment_spawned(1, SegmentKind::Normal, 25.0)];
        a.handle(&script, &ROSTER, &mut Vec::new());
        b.handle(&script, &ROSTER, &mut Vec::new());
        let from_a = tick(&mut a, Duration::from_millis(800));
        let from_b = tick(&mut b, Duration::from_millis(800));
        assert_eq!(from_a, from_b);
    }
}
