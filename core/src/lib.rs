#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rushline engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod kinds;

pub use kinds::{
    CollectibleKind, DropChance, EnemyKind, EnemyProfile, SceneryKind, SegmentKind, ThrowableKind,
};

/// Canonical banner emitted when the generator boots.
pub const WELCOME_BANNER: &str = "Rushline generator online.";

/// Position expressed in continuous world units.
///
/// The lane scrolls along the x-axis; y is the height above the floor line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    x: f32,
    y: f32,
}

impl WorldPos {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate along the lane.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate above the floor line.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position translated by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Absolute horizontal distance to another position.
    #[must_use]
    pub fn distance_x(self, other: WorldPos) -> f32 {
        (self.x - other.x).abs()
    }

    /// Rounds the position onto the discrete reservation grid.
    #[must_use]
    pub fn grid_key(self) -> GridKey {
        GridKey::from_world(self)
    }
}

/// Discrete reservation-grid cell obtained by rounding a [`WorldPos`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridKey {
    x: i32,
    y: i32,
}

impl GridKey {
    /// Creates a grid key from explicit cell coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds a world position onto the grid.
    #[must_use]
    pub fn from_world(position: WorldPos) -> Self {
        Self {
            x: position.x().round() as i32,
            y: position.y().round() as i32,
        }
    }

    /// Horizontal cell index.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical cell index.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Neighboring cell one step toward negative x.
    #[must_use]
    pub const fn west(&self) -> Self {
        Self::new(self.x - 1, self.y)
    }

    /// Neighboring cell one step toward positive x.
    #[must_use]
    pub const fn east(&self) -> Self {
        Self::new(self.x + 1, self.y)
    }
}

/// String tag identifying which pool template and queue an entity belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolTag(&'static str);

impl PoolTag {
    /// Creates a tag from a static template name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Template name backing the tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

entity_id!(
    /// Unique identifier assigned to a terrain segment.
    SegmentId
);
entity_id!(
    /// Unique identifier assigned to an enemy.
    EnemyId
);
entity_id!(
    /// Unique identifier assigned to a collectible.
    CollectibleId
);
entity_id!(
    /// Unique identifier assigned to a throwable.
    ThrowableId
);
entity_id!(
    /// Unique identifier assigned to a scenery prop.
    SceneryId
);

/// Ephemeral record forwarded from an enemy death to the collectible spawner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropRequest {
    kind: CollectibleKind,
    position: WorldPos,
}

impl DropRequest {
    /// Creates a new drop request.
    #[must_use]
    pub const fn new(kind: CollectibleKind, position: WorldPos) -> Self {
        Self { kind, position }
    }

    /// Collectible kind the drop should materialize as.
    #[must_use]
    pub const fn kind(&self) -> CollectibleKind {
        self.kind
    }

    /// World position where the drop should appear.
    #[must_use]
    pub const fn position(&self) -> WorldPos {
        self.position
    }
}

/// Describes how a collectible spawn chooses its kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CollectibleSource {
    /// Opportunistic generator spawn; the store rolls a weighted kind and
    /// the placement must pass the reservation spacing check.
    GeneratorRoll,
    /// Reward drop carrying an exact kind; reward-critical, so the spacing
    /// check is bypassed.
    Drop(CollectibleKind),
}

impl CollectibleSource {
    /// Reports whether the spawn originates from a reward drop.
    #[must_use]
    pub const fn is_drop(&self) -> bool {
        matches!(self, Self::Drop(_))
    }
}

/// Object category used when reporting spawn rejections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnCategory {
    /// Terrain platform or floor segment.
    Segment,
    /// Wave or delegation enemy.
    Enemy,
    /// Coin, gem, or other pickup.
    Collectible,
    /// Throwable weapon.
    Throwable,
    /// Decorative scenery prop.
    Scenery,
}

/// Reasons the world may reject a spawn request.
///
/// All rejections are locally recovered: the caller treats them as "nothing
/// spawned this attempt" and the generation loop continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnRejection {
    /// The target cell or one of its horizontal neighbors is reserved.
    SlotOccupied,
    /// The requested pool tag has no registered template.
    UnknownTemplate,
    /// The per-type active budget is exhausted.
    BudgetExhausted,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Updates the reference point every generator reads.
    SetPlayerPosition {
        /// New player position in world units.
        position: WorldPos,
    },
    /// Requests placement of a terrain segment at the frontier.
    SpawnSegment {
        /// Variant of segment to place.
        kind: SegmentKind,
        /// Placement position in world units.
        position: WorldPos,
    },
    /// Recycles every managed object whose x-position fell behind the
    /// threshold and purges stale reservation keys.
    RecycleBehind {
        /// Trailing boundary; objects strictly behind it are recycled.
        threshold_x: f32,
    },
    /// Asks the enemy wave system to consider an opportunistic spawn.
    RequestEnemySpawn {
        /// Candidate position supplied by the terrain generator.
        position: WorldPos,
    },
    /// Requests an enemy spawn of an already-selected kind.
    SpawnEnemy {
        /// Enemy kind chosen by the wave system.
        kind: EnemyKind,
        /// Placement position in world units.
        position: WorldPos,
    },
    /// Requests a collectible spawn.
    SpawnCollectible {
        /// Placement position in world units.
        position: WorldPos,
        /// Origin of the request; drops carry an exact kind.
        source: CollectibleSource,
    },
    /// Requests a throwable spawn with a weighted kind roll.
    SpawnThrowable {
        /// Placement position in world units.
        position: WorldPos,
    },
    /// Requests a scenery spawn with a weighted kind roll.
    SpawnScenery {
        /// Placement position in world units.
        position: WorldPos,
    },
    /// Applies damage to an active enemy.
    DamageEnemy {
        /// Identifier of the enemy taking damage.
        enemy: EnemyId,
        /// Amount of damage applied.
        amount: u32,
    },
    /// Consumes an active collectible (player pickup).
    CollectCollectible {
        /// Identifier of the collected item.
        collectible: CollectibleId,
    },
    /// Transitions a throwable into the held phase.
    PickUpThrowable {
        /// Identifier of the throwable being picked up.
        throwable: ThrowableId,
    },
    /// Transitions a held throwable into the thrown phase, resetting its
    /// expiry window.
    LaunchThrowable {
        /// Identifier of the throwable being launched.
        throwable: ThrowableId,
    },
    /// Marks a thrown throwable as settled on the ground.
    SettleThrowable {
        /// Identifier of the throwable that landed.
        throwable: ThrowableId,
    },
    /// Moves the pressure wall forward by a non-negative delta.
    AdvanceWall {
        /// Horizontal distance to advance, in world units.
        dx: f32,
    },
    /// Tears the level down: clears every store, the pool registry, and the
    /// slot registry so no partial state leaks into the next level load.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the reference point moved.
    PlayerMoved {
        /// Player position after the move.
        position: WorldPos,
    },
    /// Confirms that a terrain segment was placed.
    ///
    /// This event doubles as the safe-ground registration channel: the
    /// enemy wave system records positions whose kind reports
    /// [`SegmentKind::is_safe_ground`].
    SegmentSpawned {
        /// Identifier assigned to the segment.
        id: SegmentId,
        /// Variant of segment placed.
        kind: SegmentKind,
        /// Placement position.
        position: WorldPos,
    },
    /// Confirms that a segment was returned to the pool.
    SegmentRecycled {
        /// Identifier of the recycled segment.
        id: SegmentId,
        /// Position the segment occupied.
        position: WorldPos,
    },
    /// Forwards a terrain delegation request to the enemy wave system.
    EnemySpawnRequested {
        /// Candidate position supplied by the terrain generator.
        position: WorldPos,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        id: EnemyId,
        /// Kind of enemy spawned.
        kind: EnemyKind,
        /// Placement position.
        position: WorldPos,
    },
    /// Reports that an enemy took damage and remains alive.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        id: EnemyId,
        /// Health remaining after the hit.
        remaining: u32,
    },
    /// Reports that a staggered enemy recovered.
    EnemyRecovered {
        /// Identifier of the recovered enemy.
        id: EnemyId,
    },
    /// Confirms that an enemy died and was returned to the pool.
    EnemyDied {
        /// Identifier of the dead enemy.
        id: EnemyId,
        /// Kind of the dead enemy.
        kind: EnemyKind,
        /// Position where the enemy died.
        position: WorldPos,
    },
    /// Confirms that an enemy fell behind the trailing threshold and was
    /// returned to the pool without dying.
    EnemyRecycled {
        /// Identifier of the recycled enemy.
        id: EnemyId,
    },
    /// Carries a drop request rolled from the dead enemy's drop table.
    DropRequested {
        /// Kind and position of the requested drop.
        request: DropRequest,
    },
    /// Confirms that a collectible entered the world.
    CollectibleSpawned {
        /// Identifier assigned to the collectible.
        id: CollectibleId,
        /// Kind of collectible spawned.
        kind: CollectibleKind,
        /// Placement position.
        position: WorldPos,
    },
    /// Confirms that a collectible was consumed by the player.
    CollectibleCollected {
        /// Identifier of the consumed collectible.
        id: CollectibleId,
    },
    /// Confirms that a collectible fell behind and was recycled.
    CollectibleRecycled {
        /// Identifier of the recycled collectible.
        id: CollectibleId,
    },
    /// Confirms that a throwable entered the world.
    ThrowableSpawned {
        /// Identifier assigned to the throwable.
        id: ThrowableId,
        /// Kind of throwable spawned.
        kind: ThrowableKind,
        /// Placement position.
        position: WorldPos,
    },
    /// Confirms that a throwable entered the held phase.
    ThrowablePickedUp {
        /// Identifier of the held throwable.
        id: ThrowableId,
    },
    /// Confirms that a throwable entered the thrown phase.
    ThrowableLaunched {
        /// Identifier of the launched throwable.
        id: ThrowableId,
    },
    /// Confirms that a thrown throwable settled on the ground.
    ThrowableSettled {
        /// Identifier of the settled throwable.
        id: ThrowableId,
    },
    /// Reports that a throwable's expiry window elapsed and it was returned
    /// to the pool.
    ThrowableExpired {
        /// Identifier of the expired throwable.
        id: ThrowableId,
    },
    /// Confirms that a throwable fell behind and was recycled.
    ThrowableRecycled {
        /// Identifier of the recycled throwable.
        id: ThrowableId,
    },
    /// Confirms that a scenery prop entered the world.
    ScenerySpawned {
        /// Identifier assigned to the prop.
        id: SceneryId,
        /// Kind of prop spawned.
        kind: SceneryKind,
        /// Placement position.
        position: WorldPos,
    },
    /// Confirms that a scenery prop fell behind and was recycled.
    SceneryRecycled {
        /// Identifier of the recycled prop.
        id: SceneryId,
    },
    /// Reports that a spawn request was rejected and recovered locally.
    SpawnRejected {
        /// Category of object that failed to spawn.
        category: SpawnCategory,
        /// Position requested for the spawn.
        position: WorldPos,
        /// Specific reason the spawn failed.
        reason: SpawnRejection,
    },
    /// Reports that the pressure wall advanced.
    WallAdvanced {
        /// Wall position after the advance.
        x: f32,
    },
    /// Announces that the level was torn down and all registries cleared.
    WorldReset,
}
