//! Active terrain segments: platforms and floor strips.

use rushline_core::{SegmentId, SegmentKind, SpawnRejection, WorldPos};

use crate::pool::PooledInstance;
use crate::spawner::{SpawnServices, Spawner};

/// Live terrain segment tracked by the world.
#[derive(Debug)]
pub struct ActiveSegment {
    id: SegmentId,
    kind: SegmentKind,
    position: WorldPos,
    instance: PooledInstance,
}

impl ActiveSegment {
    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> SegmentId {
        self.id
    }

    /// Variant of the segment.
    #[must_use]
    pub const fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Placement position.
    #[must_use]
    pub const fn position(&self) -> WorldPos {
        self.position
    }
}

/// Store of every live platform and floor strip.
#[derive(Debug)]
pub struct SegmentField {
    entries: Vec<ActiveSegment>,
    next_id: u32,
    cap: usize,
}

impl SegmentField {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            cap,
        }
    }

    /// Iterates the live segments in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveSegment> {
        self.entries.iter()
    }

    pub(crate) fn drain_behind(
        &mut self,
        services: &mut SpawnServices<'_>,
        threshold_x: f32,
    ) -> Vec<(SegmentId, WorldPos)> {
        let mut recycled = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].position.x() < threshold_x {
                let entry = self.entries.swap_remove(index);
                services.slots().unreserve(entry.position);
                services.pool().release(entry.instance);
                recycled.push((entry.id, entry.position));
            } else {
                index += 1;
            }
        }
        recycled.sort_by_key(|(id, _)| *id);
        recycled
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_id = 0;
    }
}

impl Spawner for SegmentField {
    type Request = SegmentKind;
    type Id = SegmentId;
    type Kind = SegmentKind;

    fn spawn_at(
        &mut self,
        services: &mut SpawnServices<'_>,
        kind: SegmentKind,
        position: WorldPos,
    ) -> Result<(SegmentId, SegmentKind, WorldPos), SpawnRejection> {
        if self.entries.len() >= self.cap {
            return Err(SpawnRejection::BudgetExhausted);
        }
        if !services.slots().reserve(position) {
            return Err(SpawnRejection::SlotOccupied);
        }
        let Some(instance) = services.pool().acquire(kind.pool_tag()) else {
            // The tentative reservation must not outlive the failed spawn.
            services.slots().unreserve(position);
            return Err(SpawnRejection::UnknownTemplate);
        };

        let id = SegmentId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(ActiveSegment {
            id,
            kind,
            position,
            instance,
        });
        Ok((id, kind, position))
    }

    fn despawn(&mut self, services: &mut SpawnServices<'_>, id: SegmentId) -> bool {
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
