#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Rushline generator.
//!
//! The world owns the object pool, the slot registry, the deferred-action
//! schedule, and the active stores for every object type. Systems and
//! adapters submit [`Command`] values through [`apply`]; the world mutates
//! deterministically and broadcasts [`Event`] values. Reserve/unreserve and
//! acquire/release pairing is enforced inside the stores, including on
//! every failure branch, so a rejected spawn never leaves a dead zone
//! behind.

pub mod pool;
pub mod schedule;
pub mod slots;

mod collectibles;
mod enemies;
mod scenery;
mod segments;
mod spawner;
mod throwables;

pub use collectibles::{ActiveCollectible, CollectibleField};
pub use enemies::{ActiveEnemy, DamageOutcome, EnemyRoster};
pub use scenery::{ActiveScenery, SceneryBelt};
pub use segments::{ActiveSegment, SegmentField};
pub use spawner::{SpawnServices, Spawner};
pub use throwables::{ActiveThrowable, ThrowablePhase, ThrowableRack};

use std::time::Duration;

use rushline_core::{
    CollectibleKind, Command, DropRequest, EnemyId, EnemyKind, Event, SceneryKind, SegmentKind,
    SpawnCategory, ThrowableId, ThrowableKind, WorldPos,
};

use crate::pool::{ObjectPool, PoolTemplate};
use crate::schedule::DeferredQueue;
use crate::slots::SlotRegistry;

const DROP_ROLL_SEED: u64 = 0x51c9_a3b7_0de4_6f15;
const STAGGER_RECOVERY: Duration = Duration::from_millis(600);
const THROWABLE_LIFETIME: Duration = Duration::from_secs(12);
const SEGMENT_PREWARM: usize = 12;
const CONTENT_PREWARM: usize = 4;
const WALL_START_X: f32 = -30.0;

/// Fixed active-count budgets per object type.
#[derive(Clone, Copy, Debug)]
pub struct Budgets {
    /// Maximum live platforms and floor strips.
    pub segments: usize,
    /// Maximum live enemies.
    pub enemies: usize,
    /// Maximum live collectibles.
    pub collectibles: usize,
    /// Maximum live throwables.
    pub throwables: usize,
    /// Maximum live scenery props.
    pub scenery: usize,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            segments: 256,
            enemies: 12,
            collectibles: 64,
            throwables: 24,
            scenery: 48,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum DeferredAction {
    ExpireThrowable { id: ThrowableId, epoch: u32 },
    RecoverEnemy { id: EnemyId },
}

/// Represents the authoritative Rushline world state.
#[derive(Debug)]
pub struct World {
    clock: Duration,
    tick_index: u64,
    player: WorldPos,
    wall_x: f32,
    pool: ObjectPool,
    slots: SlotRegistry,
    segments: SegmentField,
    enemies: EnemyRoster,
    collectibles: CollectibleField,
    throwables: ThrowableRack,
    scenery: SceneryBelt,
    deferred: DeferredQueue<DeferredAction>,
    drop_rng: u64,
    due_scratch: Vec<DeferredAction>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new world with default budgets and every template
    /// registered and pre-warmed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_budgets(Budgets::default())
    }

    /// Creates a new world with explicit budgets.
    #[must_use]
    pub fn with_budgets(budgets: Budgets) -> Self {
        let mut world = Self {
            clock: Duration::ZERO,
            tick_index: 0,
            player: WorldPos::default(),
            wall_x: WALL_START_X,
            pool: ObjectPool::new(),
            slots: SlotRegistry::new(),
            segments: SegmentField::new(budgets.segments),
            enemies: EnemyRoster::new(budgets.enemies),
            collectibles: CollectibleField::new(budgets.collectibles),
            throwables: ThrowableRack::new(budgets.throwables),
            scenery: SceneryBelt::new(budgets.scenery),
            deferred: DeferredQueue::new(),
            drop_rng: DROP_ROLL_SEED,
            due_scratch: Vec::new(),
        };
        world.register_templates();
        world
    }

    fn register_templates(&mut self) {
        for kind in [SegmentKind::Normal, SegmentKind::Breakable, SegmentKind::Floor] {
            self.pool
                .register(PoolTemplate::new(kind.pool_tag(), SEGMENT_PREWARM));
        }
        for kind in EnemyKind::ALL {
            self.pool
                .register(PoolTemplate::new(kind.pool_tag(), CONTENT_PREWARM));
        }
        for kind in CollectibleKind::ALL {
            self.pool
                .register(PoolTemplate::new(kind.pool_tag(), CONTENT_PREWARM));
        }
        for kind in ThrowableKind::ALL {
            self.pool
                .register(PoolTemplate::new(kind.pool_tag(), CONTENT_PREWARM));
        }
        for kind in SceneryKind::ALL {
            self.pool
                .register(PoolTemplate::new(kind.pool_tag(), CONTENT_PREWARM));
        }
    }

    fn fire_due_actions(&mut self, out_events: &mut Vec<Event>) {
        let mut due = std::mem::take(&mut self.due_scratch);
        self.deferred.drain_due(self.clock, &mut due);
        for action in due.drain(..) {
            match action {
                DeferredAction::ExpireThrowable { id, epoch } => {
                    let Self {
                        pool,
                        slots,
                        drop_rng,
                        throwables,
                        ..
                    } = self;
                    let mut services = SpawnServices::new(pool, slots, drop_rng);
                    if throwables.expire(&mut services, id, epoch) {
                        out_events.push(Event::ThrowableExpired { id });
                    }
                }
                DeferredAction::RecoverEnemy { id } => {
                    if self.enemies.recover(id) {
                        out_events.push(Event::EnemyRecovered { id });
                    }
                }
            }
        }
        self.due_scratch = due;
    }

    fn reset(&mut self) {
        self.segments.clear();
        self.enemies.clear();
        self.collectibles.clear();
        self.throwables.clear();
        self.scenery.clear();
        self.slots.clear();
        self.pool.clear();
        self.deferred.clear();
        self.due_scratch.clear();
        self.clock = Duration::ZERO;
        self.tick_index = 0;
        self.player = WorldPos::default();
        self.wall_x = WALL_START_X;
        self.drop_rng = DROP_ROLL_SEED;
        self.register_templates();
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.fire_due_actions(out_events);
        }
        Command::SetPlayerPosition { position } => {
            world.player = position;
            out_events.push(Event::PlayerMoved { position });
        }
        Command::SpawnSegment { kind, position } => {
            let World {
                pool,
                slots,
                drop_rng,
                segments,
                ..
            } = world;
            let mut services = SpawnServices::new(pool, slots, drop_rng);
            match segments.spawn_at(&mut services, kind, position) {
                Ok((id, kind, position)) => {
                    out_events.push(Event::SegmentSpawned { id, kind, position });
                }
                Err(reason) => out_events.push(Event::SpawnRejected {
                    category: SpawnCategory::Segment,
                    position,
                    reason,
                }),
            }
        }
        Command::RecycleBehind { threshold_x } => {
            let World {
                pool,
                slots,
                drop_rng,
                segments,
                enemies,
                collectibles,
                throwables,
                scenery,
                ..
            } = world;
            let mut services = SpawnServices::new(pool, slots, drop_rng);
            for (id, position) in segments.drain_behind(&mut services, threshold_x) {
                out_events.push(Event::SegmentRecycled { id, position });
            }
            for id in enemies.drain_behind(&mut services, threshold_x) {
                out_events.push(Event::EnemyRecycled { id });
            }
            for id in collectibles.drain_behind(&mut services, threshold_x) {
                out_events.push(Event::CollectibleRecycled { id });
            }
            for id in throwables.drain_behind(&mut services, threshold_x) {
                out_events.push(Event::ThrowableRecycled { id });
            }
            for id in scenery.drain_behind(&mut services, threshold_x) {
                out_events.push(Event::SceneryRecycled { id });
            }
            slots.clear_behind(threshold_x);
        }
        Command::RequestEnemySpawn { position } => {
            out_events.push(Event::EnemySpawnRequested { position });
        }
        Command::SpawnEnemy { kind, position } => {
            let World {
                pool,
                slots,
                drop_rng,
                enemies,
                ..
            } = world;
            let mut services = SpawnServices::new(pool, slots, drop_rng);
            match enemies.spawn_at(&mut services, kind, position) {
                Ok((id, kind, position)) => {
                    out_events.push(Event::EnemySpawned { id, kind, position });
                }
                Err(reason) => out_events.push(Event::SpawnRejected {
                    category: SpawnCategory::Enemy,
                    position,
                    reason,
                }),
            }
        }
        Command::SpawnCollectible { position, source } => {
            let World {
                pool,
                slots,
                drop_rng,
                collectibles,
                ..
            } = world;
            let mut services = SpawnServices::new(pool, slots, drop_rng);
            match collectibles.spawn_at(&mut services, source, position) {
                Ok((id, kind, position)) => {
                    out_events.push(Event::CollectibleSpawned { id, kind, position });
                }
                Err(reason) => out_events.push(Event::SpawnRejected {
                    category: SpawnCategory::Collectible,
                    position,
                    reason,
                }),
            }
        }
        Command::SpawnThrowable { position } => {
            let World {
                pool,
                slots,
                drop_rng,
                throwables,
                deferred,
                clock,
                ..
            } = world;
            let mut services = SpawnServices::new(pool, slots, drop_rng);
            match throwables.spawn_at(&mut services, (), position) {
                Ok((id, kind, position)) => {
                    deferred.schedule(
                        clock.saturating_add(THROWABLE_LIFETIME),
                        DeferredAction::ExpireThrowable { id, epoch: 0 },
                    );
                    out_events.push(Event::ThrowableSpawned { id, kind, position });
                }
                Err(reason) => out_events.push(Event::SpawnRejected {
                    category: SpawnCategory::Throwable,
                    position,
                    reason,
                }),
            }
        }
        Command::SpawnScenery { position } => {
            let World {
                pool,
                slots,
                drop_rng,
                scenery,
                ..
            } = world;
            let mut services = SpawnServices::new(pool, slots, drop_rng);
            match scenery.spawn_at(&mut services, (), position) {
                Ok((id, kind, position)) => {
                    out_events.push(Event::ScenerySpawned { id, kind, position });
                }
                Err(reason) => out_events.push(Event::SpawnRejected {
                    category: SpawnCategory::Scenery,
                    position,
                    reason,
                }),
            }
        }
        Command::DamageEnemy { enemy, amount } => {
            let World {
                pool,
                slots,
                drop_rng,
                enemies,
                deferred,
                clock,
                ..
            } = world;
            let mut services = SpawnServices::new(pool, slots, drop_rng);
            match enemies.apply_damage(&mut services, enemy, amount) {
                DamageOutcome::Missing => {}
                DamageOutcome::Damaged {
                    remaining,
                    newly_staggered,
                } => {
                    out_events.push(Event::EnemyDamaged {
                        id: enemy,
                        remaining,
                    });
                    if newly_staggered {
                        deferred.schedule(
                            clock.saturating_add(STAGGER_RECOVERY),
                            DeferredAction::RecoverEnemy { id: enemy },
                        );
                    }
                }
                DamageOutcome::Died {
                    kind,
                    position,
                    drop,
                } => {
                    out_events.push(Event::EnemyDied {
                        id: enemy,
                        kind,
                        position,
                    });
                    if let Some(kind) = drop {
                        out_events.push(Event::DropRequested {
                            request: DropRequest::new(kind, position),
                        });
                    }
                }
            }
        }
        Command::CollectCollectible { collectible } => {
            let World {
                pool,
                slots,
                drop_rng,
                collectibles,
                ..
            } = world;
            let mut services = SpawnServices::new(pool, slots, drop_rng);
            if collectibles.despawn(&mut services, collectible) {
                out_events.push(Event::CollectibleCollected { id: collectible });
            }
        }
        Command::PickUpThrowable { throwable } => {
            if world.throwables.pick_up(throwable) {
                out_events.push(Event::ThrowablePickedUp { id: throwable });
            }
        }
        Command::LaunchThrowable { throwable } => {
            if let Some(epoch) = world.throwables.launch(throwable) {
                world.deferred.schedule(
                    world.clock.saturating_add(THROWABLE_LIFETIME),
                    DeferredAction::ExpireThrowable {
                        id: throwable,
                        epoch,
                    },
                );
                out_events.push(Event::ThrowableLaunched { id: throwable });
            }
        }
        Command::SettleThrowable { throwable } => {
            if world.throwables.settle(throwable) {
                out_events.push(Event::ThrowableSettled { id: throwable });
            }
        }
        Command::AdvanceWall { dx } => {
            if dx.is_finite() && dx > 0.0 {
                world.wall_x += dx;
            }
            out_events.push(Event::WallAdvanced { x: world.wall_x });
        }
        Command::Reset => {
            world.reset();
            out_events.push(Event::WorldReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use rushline_core::{EnemyKind, PoolTag, WorldPos};

    use super::{
        CollectibleField, EnemyRoster, SceneryBelt, SegmentField, Spawner, ThrowableRack, World,
    };

    /// Current reference-point position.
    #[must_use]
    pub fn player_position(world: &World) -> WorldPos {
        world.player
    }

    /// Current pressure-wall position.
    #[must_use]
    pub fn wall_position(world: &World) -> f32 {
        world.wall_x
    }

    /// Simulation time accumulated since the last reset.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks processed since the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Read-only access to the live terrain segments.
    #[must_use]
    pub fn segments(world: &World) -> &SegmentField {
        &world.segments
    }

    /// Read-only access to the live enemies.
    #[must_use]
    pub fn enemies(world: &World) -> &EnemyRoster {
        &world.enemies
    }

    /// Read-only access to the live collectibles.
    #[must_use]
    pub fn collectibles(world: &World) -> &CollectibleField {
        &world.collectibles
    }

    /// Read-only access to the live throwables.
    #[must_use]
    pub fn throwables(world: &World) -> &ThrowableRack {
        &world.throwables
    }

    /// Read-only access to the live scenery props.
    #[must_use]
    pub fn scenery(world: &World) -> &SceneryBelt {
        &world.scenery
    }

    /// Enemy kinds whose templates are currently registered.
    #[must_use]
    pub fn enemy_roster_kinds(world: &World) -> Vec<EnemyKind> {
        EnemyKind::ALL
            .iter()
            .copied()
            .filter(|kind| world.pool.has_template(kind.pool_tag()))
            .collect()
    }

    /// Number of idle pool instances queued under the tag.
    #[must_use]
    pub fn pool_idle(world: &World, tag: PoolTag) -> usize {
        world.pool.idle(tag)
    }

    /// Total pool instances constructed since the last reset.
    #[must_use]
    pub fn pool_constructed(world: &World) -> u64 {
        world.pool.constructed()
    }

    /// Pool instances discarded because their tag was unknown on release.
    #[must_use]
    pub fn pool_discarded(world: &World) -> u64 {
        world.pool.discarded()
    }

    /// Advisory occupancy check on the exact reservation cell.
    #[must_use]
    pub fn is_reserved(world: &World, position: WorldPos) -> bool {
        world.slots.is_reserved(position)
    }

    /// Number of occupied reservation cells.
    #[must_use]
    pub fn reserved_cells(world: &World) -> usize {
        world.slots.len()
    }

    /// Number of deferred actions still pending.
    #[must_use]
    pub fn pending_deferred(world: &World) -> usize {
        world.deferred.len()
    }

    /// Total live objects across every store.
    #[must_use]
    pub fn total_active(world: &World) -> usize {
        world.segments.active_count()
            + world.enemies.active_count()
            + world.collectibles.active_count()
            + world.throwables.active_count()
            + world.scenery.active_count()
    }
}
