//! Active throwables and their physical lifecycle.
//!
//! A throwable moves through `Idle -> Held -> Thrown -> Settled`. Its expiry
//! window opens at spawn and is *reset* every time the entity re-enters the
//! thrown phase; the epoch counter lets stale deferred expiries be told
//! apart from the live one.

use rushline_core::{SpawnRejection, ThrowableId, ThrowableKind, WorldPos};

use crate::pool::PooledInstance;
use crate::spawner::{pick_weighted, SpawnServices, Spawner};

/// Offset applied when the first reservation attempt is blocked.
const RETRY_OFFSET_X: f32 = 2.0;

/// Lifecycle phase of a throwable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrowablePhase {
    /// Resting on its spawn platform, waiting to be picked up.
    Idle,
    /// Carried by the player.
    Held,
    /// In flight after a launch.
    Thrown,
    /// Landed after a flight; can be picked up again.
    Settled,
}

/// Live throwable tracked by the world.
#[derive(Debug)]
pub struct ActiveThrowable {
    id: ThrowableId,
    kind: ThrowableKind,
    position: WorldPos,
    instance: PooledInstance,
    phase: ThrowablePhase,
    epoch: u32,
}

impl ActiveThrowable {
    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> ThrowableId {
        self.id
    }

    /// Kind of the throwable.
    #[must_use]
    pub const fn kind(&self) -> ThrowableKind {
        self.kind
    }

    /// Placement position.
    #[must_use]
    pub const fn position(&self) -> WorldPos {
        self.position
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> ThrowablePhase {
        self.phase
    }
}

/// Store of every live throwable.
#[derive(Debug)]
pub struct ThrowableRack {
    entries: Vec<ActiveThrowable>,
    next_id: u32,
    cap: usize,
}

impl ThrowableRack {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            cap,
        }
    }

    /// Iterates the live throwables in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ActiveThrowable> {
        self.entries.iter()
    }

    /// Transitions an idle or settled throwable into the held phase.
    pub(crate) fn pick_up(&mut self, id: ThrowableId) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        match entry.phase {
            ThrowablePhase::Idle | ThrowablePhase::Settled => {
                entry.phase = ThrowablePhase::Held;
                true
            }
            ThrowablePhase::Held | ThrowablePhase::Thrown => false,
        }
    }

    /// Transitions a held throwable into the thrown phase.
    ///
    /// Returns the new expiry epoch so the caller can schedule a fresh
    /// deferred expiry; the bumped epoch invalidates the previous one.
    pub(crate) fn launch(&mut self, id: ThrowableId) -> Option<u32> {
        let entry = self.entries.iter_mut().find(|entry| entry.id == id)?;
        if entry.phase != ThrowablePhase::Held {
            return None;
        }
        entry.phase = ThrowablePhase::Thrown;
        entry.epoch = entry.epoch.wrapping_add(1);
        Some(entry.epoch)
    }

    /// Marks a thrown throwable as settled on the ground.
    pub(crate) fn settle(&mut self, id: ThrowableId) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        if entry.phase != ThrowablePhase::Thrown {
            return false;
        }
        entry.phase = ThrowablePhase::Settled;
        true
    }

    /// Expires a throwable if the deferred epoch is still the live one.
    ///
    /// A stale epoch means the window was reset by a later launch; the entry
    /// is left untouched.
    pub(crate) fn expire(
        &mut self,
        services: &mut SpawnServices<'_>,
        id: ThrowableId,
        epoch: u32,
    ) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.id == id && entry.epoch == epoch)
        else {
            return false;
        };
        let entry = self.entries.swap_remove(index);
        services.slots().unreserve(entry.position);
        services.pool().release(entry.instance);
        true
    }

    pub(crate) fn drain_behind(
        &mut self,
        services: &mut SpawnServices<'_>,
        threshold_x: f32,
    ) -> Vec<ThrowableId> {
        let mut recycled = Vec::new();
        let mut index = 0;
        while index < self.entries.len() {
            let entry = &self.entries[index];
            // A held throwable travels with the player; its stale spawn
            // position must not get it swept out from under them.
            if entry.position.x() < threshold_x && entry.phase != ThrowablePhase::Held {
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

impl Spawner for ThrowableRack {
    type Request = ();
    type Id = ThrowableId;
    type Kind = ThrowableKind;

    fn spawn_at(
        &mut self,
        services: &mut SpawnServices<'_>,
        _request: (),
        position: WorldPos,
    ) -> Result<(ThrowableId, ThrowableKind, WorldPos), SpawnRejection> {
        if self.entries.len() >= self.cap {
            return Err(SpawnRejection::BudgetExhausted);
        }

        // Blocked placements retry once at a horizontal offset before
        // giving up; a platform often carries a pickup at the exact spot.
        let placed = if services.slots().reserve(position) {
            position
        } else {
            let retry = position.offset(RETRY_OFFSET_X, 0.0);
            if !services.slots().reserve(retry) {
                return Err(SpawnRejection::SlotOccupied);
            }
            retry
        };

        let total: u32 = ThrowableKind::ALL
            .iter()
            .map(|kind| kind.rarity_weight())
            .sum();
        let roll = services.roll(total);
        let kind = pick_weighted(&ThrowableKind::ALL, |kind| kind.rarity_weight(), roll);

        let Some(instance) = services.pool().acquire(kind.pool_tag()) else {
            services.slots().unreserve(placed);
            return Err(SpawnRejection::UnknownTemplate);
        };

        let id = ThrowableId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(ActiveThrowable {
            id,
            kind,
            position: placed,
            instance,
            phase: ThrowablePhase::Idle,
            epoch: 0,
        });
        Ok((id, kind, placed))
    }

    fn despawn(&mut self, services: &mut SpawnServices<'_>, id: ThrowableId) -> bool {
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
