//! Closed kind enums and their per-kind data tables.
//!
//! Dynamic subclass hierarchies from the original design are flattened into
//! tagged variants plus constant data tables: stats, rarity weights, and
//! drop tables all live here so spawners dispatch on plain enums.

use serde::{Deserialize, Serialize};

use crate::PoolTag;

/// Variants of terrain segment the frontier generator can place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Regular platform; eligible for every kind of content.
    Normal,
    /// Platform that collapses on contact; never carries enemies or props.
    Breakable,
    /// Ground strip running below the platform lane.
    Floor,
}

impl SegmentKind {
    /// Pool tag of the template backing the segment variant.
    #[must_use]
    pub const fn pool_tag(self) -> PoolTag {
        match self {
            Self::Normal => PoolTag::new("platform.normal"),
            Self::Breakable => PoolTag::new("platform.breakable"),
            Self::Floor => PoolTag::new("floor.strip"),
        }
    }

    /// Reports whether enemies may stand on this segment variant.
    ///
    /// Only regular platforms count as safe ground; breakable platforms
    /// collapse under enemies and floor strips sit below the lane.
    #[must_use]
    pub const fn is_safe_ground(self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// Chance entry inside an enemy drop table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropChance {
    kind: CollectibleKind,
    permille: u16,
}

impl DropChance {
    /// Creates a drop entry with the provided chance in permille.
    #[must_use]
    pub const fn new(kind: CollectibleKind, permille: u16) -> Self {
        Self { kind, permille }
    }

    /// Collectible produced when the entry fires.
    #[must_use]
    pub const fn kind(&self) -> CollectibleKind {
        self.kind
    }

    /// Chance of the entry firing, in permille of a single roll.
    #[must_use]
    pub const fn permille(&self) -> u16 {
        self.permille
    }
}

/// Static combat and reward profile for an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyProfile {
    max_health: u32,
    contact_damage: u32,
    drops: &'static [DropChance],
}

impl EnemyProfile {
    /// Hit points the enemy spawns with.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Damage dealt to a damageable collaborator on contact.
    #[must_use]
    pub const fn contact_damage(&self) -> u32 {
        self.contact_damage
    }

    /// Drop table rolled once when the enemy dies.
    #[must_use]
    pub const fn drops(&self) -> &'static [DropChance] {
        self.drops
    }
}

const CREEP_DROPS: &[DropChance] = &[DropChance::new(CollectibleKind::Coin, 400)];
const SPITTER_DROPS: &[DropChance] = &[
    DropChance::new(CollectibleKind::Coin, 350),
    DropChance::new(CollectibleKind::Gem, 100),
];
const BRUTE_DROPS: &[DropChance] = &[
    DropChance::new(CollectibleKind::Coin, 500),
    DropChance::new(CollectibleKind::Heart, 150),
];
const REVENANT_DROPS: &[DropChance] = &[
    DropChance::new(CollectibleKind::Gem, 600),
    DropChance::new(CollectibleKind::Heart, 250),
];

/// Kinds of enemy the wave spawner can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline walker.
    Creep,
    /// Ranged attacker.
    Spitter,
    /// Slow heavy hitter; the designated opener of every wave.
    Brute,
    /// Rare kind whose weight ramps with distance traveled.
    Revenant,
}

impl EnemyKind {
    /// Every enemy kind in deterministic order.
    pub const ALL: [Self; 4] = [Self::Creep, Self::Spitter, Self::Brute, Self::Revenant];

    /// Pool tag of the template backing the enemy kind.
    #[must_use]
    pub const fn pool_tag(self) -> PoolTag {
        match self {
            Self::Creep => PoolTag::new("enemy.creep"),
            Self::Spitter => PoolTag::new("enemy.spitter"),
            Self::Brute => PoolTag::new("enemy.brute"),
            Self::Revenant => PoolTag::new("enemy.revenant"),
        }
    }

    /// Static combat and reward profile of the kind.
    #[must_use]
    pub const fn profile(self) -> EnemyProfile {
        match self {
            Self::Creep => EnemyProfile {
                max_health: 3,
                contact_damage: 1,
                drops: CREEP_DROPS,
            },
            Self::Spitter => EnemyProfile {
                max_health: 2,
                contact_damage: 1,
                drops: SPITTER_DROPS,
            },
            Self::Brute => EnemyProfile {
                max_health: 6,
                contact_damage: 2,
                drops: BRUTE_DROPS,
            },
            Self::Revenant => EnemyProfile {
                max_health: 8,
                contact_damage: 3,
                drops: REVENANT_DROPS,
            },
        }
    }

    /// Reports whether the kind is the rare, distance-gated one.
    #[must_use]
    pub const fn is_rare(self) -> bool {
        matches!(self, Self::Revenant)
    }
}

/// Kinds of collectible pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectibleKind {
    /// Currency pickup.
    Coin,
    /// High-value currency pickup.
    Gem,
    /// Health restore.
    Heart,
}

impl CollectibleKind {
    /// Every collectible kind in deterministic order.
    pub const ALL: [Self; 3] = [Self::Coin, Self::Gem, Self::Heart];

    /// Pool tag of the template backing the collectible kind.
    #[must_use]
    pub const fn pool_tag(self) -> PoolTag {
        match self {
            Self::Coin => PoolTag::new("pickup.coin"),
            Self::Gem => PoolTag::new("pickup.gem"),
            Self::Heart => PoolTag::new("pickup.heart"),
        }
    }

    /// Relative rarity weight used by generator spawns.
    #[must_use]
    pub const fn rarity_weight(self) -> u32 {
        match self {
            Self::Coin => 60,
            Self::Gem => 25,
            Self::Heart => 15,
        }
    }
}

/// Kinds of throwable weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThrowableKind {
    /// Straight-flying spear.
    Javelin,
    /// Area blast on impact.
    Bomb,
    /// Lingering splash on impact.
    Flask,
}

impl ThrowableKind {
    /// Every throwable kind in deterministic order.
    pub const ALL: [Self; 3] = [Self::Javelin, Self::Bomb, Self::Flask];

    /// Pool tag of the template backing the throwable kind.
    #[must_use]
    pub const fn pool_tag(self) -> PoolTag {
        match self {
            Self::Javelin => PoolTag::new("throwable.javelin"),
            Self::Bomb => PoolTag::new("throwable.bomb"),
            Self::Flask => PoolTag::new("throwable.flask"),
        }
    }

    /// Relative rarity weight used when rolling a spawn.
    #[must_use]
    pub const fn rarity_weight(self) -> u32 {
        match self {
            Self::Javelin => 50,
            Self::Bomb => 30,
            Self::Flask => 20,
        }
    }
}

/// Kinds of decorative scenery prop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SceneryKind {
    /// Low shrub.
    Bush,
    /// Weathered rock.
    Boulder,
    /// Distance marker.
    Signpost,
}

impl SceneryKind {
    /// Every scenery kind in deterministic order.
    pub const ALL: [Self; 3] = [Self::Bush, Self::Boulder, Self::Signpost];

    /// Pool tag of the template backing the scenery kind.
    #[must_use]
    pub const fn pool_tag(self) -> PoolTag {
        match self {
            Self::Bush => PoolTag::new("scenery.bush"),
            Self::Boulder => PoolTag::new("scenery.boulder"),
            Self::Signpost => PoolTag::new("scenery.signpost"),
        }
    }

    /// Relative rarity weight used when rolling a spawn.
    #[must_use]
    pub const fn rarity_weight(self) -> u32 {
        match self {
            Self::Bush => 45,
            Self::Boulder => 35,
            Self::Signpost => 20,
        }
    }
}
