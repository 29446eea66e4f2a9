//! Active collectibles: generator rolls and reward drops.

use rushline_core::{CollectibleId, CollectibleKind, CollectibleSource, SpawnRejection, WorldPos};

use crate::pool::PooledInstance;
use crate::spawner::{pick_weighted, SpawnServices, Spawner};

/// Live collectible tracked by the world.
#[derive(Debug)]
pub struct ActiveCollectible {
    id: CollectibleId,
    kind: CollectibleKind,
    position: WorldPos,
    instance: PooledInstance,
    reserved: bool,
}

impl ActiveCollectible {
    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> CollectibleId {
        self.id
    }

    /// Kind of the collectible.
    #[must_use]
    pub const fn kind(&self) -> CollectibleKind {
        self.kind
    }

    /// Placement position.
    #[must_use]
    pub const fn position(&self) -> WorldPos {
        self.position
    }
}

/// Store of every live collectible.
#[derive(Debug)]
pub struct CollectibleField {
    entries: Vec<ActiveCollectible>,
    next_id: u32,
    cap: usize,
}

impl CollectibleField {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            cap,
        }
    }

    /// Iterates the live collectibles in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveCollectible> {
        self.entries.iter()
    }

    pub(crate) fn drain_behind(
        &mut self,
        services: &mut SpawnServices<'_>,
        threshold_x: f32,
    ) -> Vec<CollectibleId> {
        let mut recycled = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].position.x() < threshold_x {
                let entry = self.entries.swap_remove(index);
                if entry.reserved {
                    services.slots().unreserve(entry.position);
                }
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

impl Spawner for CollectibleField {
    type Request = CollectibleSource;
    type Id = CollectibleId;
    type Kind = CollectibleKind;

    fn spawn_at(
        &mut self,
        services: &mut SpawnServices<'_>,
        source: CollectibleSource,
        position: WorldPos,
    ) -> Result<(CollectibleId, CollectibleKind, WorldPos), SpawnRejection> {
        if self.entries.len() >= self.cap {
            return Err(SpawnRejection::BudgetExhausted);
        }

        // Reward drops bypass the spacing check entirely; they take no
        // reservation, so their despawn releases none either.
        let (kind, reserved) = match source {
            CollectibleSource::Drop(kind) => (kind, false),
            CollectibleSource::GeneratorRoll => {
                if !services.slots().reserve(position) {
                    return Err(SpawnRejection::SlotOccupied);
                }
                let total: u32 = CollectibleKind::ALL
                    .iter()
                    .map(|kind| kind.rarity_weight())
                    .sum();
                let roll = services.roll(total);
                let kind =
                    pick_weighted(&CollectibleKind::ALL, |kind| kind.rarity_weight(), roll);
                (kind, true)
            }
        };

        let Some(instance) = services.pool().acquire(kind.pool_tag()) else {
            if reserved {
                services.slots().unreserve(position);
            }
            return Err(SpawnRejection::UnknownTemplate);
        };

        let id = CollectibleId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(ActiveCollectible {
            id,
            kind,
            position,
            instance,
            reserved,
        });
        Ok((id, kind, position))
    }

    fn despawn(&mut self, services: &mut SpawnServices<'_>, id: CollectibleId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        let entry = self.entries.swap_remove(index);
        if entry.reserved {
            services.slots().unreserve(entry.position);
        }
        services.pool().release(entry.instance);
        true
    }

    fn active_count(&self) -> usize {
        self.entries.len()
    }
}
