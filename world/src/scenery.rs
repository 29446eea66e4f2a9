//! Active scenery props.

use rushline_core::{SceneryId, SceneryKind, SpawnRejection, WorldPos};

use crate::pool::PooledInstance;
use crate::spawner::{pick_weighted, SpawnServices, Spawner};

/// Live scenery prop tracked by the world.
#[derive(Debug)]
pub struct ActiveScenery {
    id: SceneryId,
    kind: SceneryKind,
    position: WorldPos,
    instance: PooledInstance,
}

impl ActiveScenery {
    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> SceneryId {
        self.id
    }

    /// Kind of the prop.
    #[must_use]
    pub const fn kind(&self) -> SceneryKind {
        self.kind
    }

    /// Placement position.
    #[must_use]
    pub const fn position(&self) -> WorldPos {
        self.position
    }
}

/// Store of every live scenery prop.
#[derive(Debug)]
pub struct SceneryBelt {
    entries: Vec<ActiveScenery>,
    next_id: u32,
    cap: usize,
}

impl SceneryBelt {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            cap,
        }
    }

    /// Iterates the live props in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveScenery> {
        self.entries.iter()
    }

    pub(crate) fn drain_behind(
        &mut self,
        services: &mut SpawnServices<'_>,
        threshold_x: f32,
    ) -> Vec<SceneryId> {
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

impl Spawner for SceneryBelt {
    type Request = ();
    type Id = SceneryId;
    type Kind = SceneryKind;

    fn spawn_at(
        &mut self,
        services: &mut SpawnServices<'_>,
        _request: (),
        position: WorldPos,
    ) -> Result<(SceneryId, SceneryKind, WorldPos), SpawnRejection> {
        if self.entries.len() >= self.cap {
            return Err(SpawnRejection::BudgetExhausted);
        }
        if !services.slots().reserve(position) {
            return Err(SpawnRejection::SlotOccupied);
        }

        let total: u32 = SceneryKind::ALL
            .iter()
            .map(|kind| kind.rarity_weight())
            .sum();
        let roll = services.roll(total);
        let kind = pick_weighted(&SceneryKind::ALL, |kind| kind.rarity_weight(), roll);

        let Some(instance) = services.pool().acquire(kind.pool_tag()) else {
            services.slots().unreserve(position);
            return Err(SpawnRejection::UnknownTemplate);
        };

        let id = SceneryId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(ActiveScenery {
            id,
            kind,
            position,
            instance,
        });
        Ok((id, kind, position))
    }

    fn despawn(&mut self, services: &mut SpawnServices<'_>, id: SceneryId) -> bool {
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
