//! Active enemy roster with damage, stagger, and drop-table resolution.

use rushline_core::{CollectibleKind, EnemyId, EnemyKind, SpawnRejection, WorldPos};

use crate::pool::PooledInstance;
use crate::spawner::{SpawnServices, Spawner};

/// Live enemy tracked by the world.
#[derive(Debug)]
pub struct ActiveEnemy {
    id: EnemyId,
    kind: EnemyKind,
    position: WorldPos,
    instance: PooledInstance,
    health: u32,
    staggered: bool,
}

impl ActiveEnemy {
    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Kind of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Placement position.
    #[must_use]
    pub const fn position(&self) -> WorldPos {
        self.position
    }

    /// Hit points remaining.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Reports whether the enemy is currently staggered by a recent hit.
    #[must_use]
    pub const fn is_staggered(&self) -> bool {
        self.staggered
    }
}

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    /// No enemy with the provided identifier exists; silent no-op.
    Missing,
    /// The enemy survives the hit.
    Damaged {
        /// Health remaining after the hit.
        remaining: u32,
        /// Whether the hit staggered an un-staggered enemy.
        newly_staggered: bool,
    },
    /// The enemy died; its instance and reservation were released.
    Died {
        /// Kind of the dead enemy.
        kind: EnemyKind,
        /// Position where the enemy died.
        position: WorldPos,
        /// Drop rolled from the kind's drop table, if any fired.
        drop: Option<CollectibleKind>,
    },
}

/// Store of every live enemy.
#[derive(Debug)]
pub struct EnemyRoster {
    entries: Vec<ActiveEnemy>,
    next_id: u32,
    cap: usize,
}

impl EnemyRoster {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            cap,
        }
    }

    /// Iterates the live enemies in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveEnemy> {
        self.entries.iter()
    }

    pub(crate) fn apply_damage(
        &mut self,
        services: &mut SpawnServices<'_>,
        id: EnemyId,
        amount: u32,
    ) -> DamageOutcome {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return DamageOutcome::Missing;
        };

        let entry = &mut self.entries[index];
        entry.health = entry.health.saturating_sub(amount);
        if entry.health > 0 {
            let newly_staggered = !entry.staggered;
            entry.staggered = true;
            return DamageOutcome::Damaged {
                remaining: entry.health,
                newly_staggered,
            };
        }

        let entry = self.entries.swap_remove(index);
        services.slots().unreserve(entry.position);
        let drop = roll_drop(services, entry.kind);
        services.pool().release(entry.instance);
        DamageOutcome::Died {
            kind: entry.kind,
            position: entry.position,
            drop,
        }
    }

    pub(crate) fn recover(&mut self, id: EnemyId) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        let was_staggered = entry.staggered;
        entry.staggered = false;
        was_staggered
    }

    pub(crate) fn drain_behind(
        &mut self,
        services: &mut SpawnServices<'_>,
        threshold_x: f32,
    ) -> Vec<EnemyId> {
        let mut recycled = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].position.x() < threshold_x {
                let entry = self.entries.swap_remove(index);
                services.slots().unreserve(entry.position);
                services.pool().release(entry.instance);
                recycled.push(entry.id);
            } else {
                index += 1;
            }
        }
        recycled.sort();
        recycled
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_id = 0;
    }
}

fn roll_drop(services: &mut SpawnServices<'_>, kind: EnemyKind) -> Option<CollectibleKind> {
    let drops = kind.profile().drops();
    if drops.is_empty() {
        return None;
    }
    let roll = services.roll(1_000);
    let mut cumulative = 0_u32;
    for entry in drops {
        cumulative += u32::from(entry.permille());
        if roll < cumulative {
            return Some(entry.kind());
        }
    }
    None
}

impl Spawner for EnemyRoster {
    type Request = EnemyKind;
    type Id = EnemyId;
    type Kind = EnemyKind;

    fn spawn_at(
        &mut self,
        services: &mut SpawnServices<'_>,
        kind: EnemyKind,
        position: WorldPos,
    ) -> Result<(EnemyId, EnemyKind, WorldPos), SpawnRejection> {
        if self.entries.len() >= self.cap {
            return Err(SpawnRejection::BudgetExhausted);
        }
        if !services.slots().reserve(position) {
            return Err(SpawnRejection::SlotOccupied);
        }
        let Some(instance) = services.pool().acquire(kind.pool_tag()) else {
            services.slots().unreserve(position);
            return Err(SpawnRejection::UnknownTemplate);
        };

        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(ActiveEnemy {
            id,
            kind,
            position,
            instance,
            health: kind.profile().max_health(),
            staggered: false,
        });
        Ok((id, kind, position))
    }

    fn despawn(&mut self, services: &mut SpawnServices<'_>, id: EnemyId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        let entry = self.entries.swap_remove(index);
        services.slots().unreserve(entry.position);
        services.pool().release(entry.instance);
        true
    }

    fn active_count(&self) -> usize {
        self.entries.len()
    }
}
