//! Common spawner capability implemented by every content store.

use rushline_core::{SpawnRejection, WorldPos};

use crate::pool::ObjectPool;
use crate::slots::SlotRegistry;

const ROLL_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const ROLL_INCREMENT: u64 = 1;

/// Mutable services a store needs while spawning or despawning.
///
/// Bundling the pool, the slot registry, and the shared roll state keeps the
/// reserve/unreserve and acquire/release pairing discipline in one place:
/// every failure branch inside a store has both halves in reach.
#[derive(Debug)]
pub struct SpawnServices<'a> {
    pool: &'a mut ObjectPool,
    slots: &'a mut SlotRegistry,
    roll_state: &'a mut u64,
}

impl<'a> SpawnServices<'a> {
    /// Bundles the world-owned services for one store call.
    #[must_use]
    pub fn new(
        pool: &'a mut ObjectPool,
        slots: &'a mut SlotRegistry,
        roll_state: &'a mut u64,
    ) -> Self {
        Self {
            pool,
            slots,
            roll_state,
        }
    }

    /// Object pool the store acquires from and releases to.
    pub fn pool(&mut self) -> &mut ObjectPool {
        self.pool
    }

    /// Reservation grid the store places through.
    pub fn slots(&mut self) -> &mut SlotRegistry {
        self.slots
    }

    /// Draws a deterministic value in `0..bound` from the shared roll state.
    pub fn roll(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0, "roll requires a positive bound");
        *self.roll_state = self
            .roll_state
            .wrapping_mul(ROLL_MULTIPLIER)
            .wrapping_add(ROLL_INCREMENT);
        ((*self.roll_state >> 33) % u64::from(bound)) as u32
    }
}

/// Capability shared by the segment, enemy, collectible, throwable, and
/// scenery stores.
pub trait Spawner {
    /// Input describing what to spawn.
    type Request;
    /// Identifier assigned to live entries.
    type Id: Copy;
    /// Kind ultimately placed.
    type Kind: Copy;

    /// Attempts a spawn at the given position.
    ///
    /// Returns the identifier, the resolved kind, and the actual placement
    /// position, which may differ from the request when the store retries at
    /// an offset. A rejection leaves the pool and the registry untouched.
    fn spawn_at(
        &mut self,
        services: &mut SpawnServices<'_>,
        request: Self::Request,
        position: WorldPos,
    ) -> Result<(Self::Id, Self::Kind, WorldPos), SpawnRejection>;

    /// Removes a live entry, releasing its pool instance and reservation.
    ///
    /// Returns `false` when the identifier is unknown.
    fn despawn(&mut self, services: &mut SpawnServices<'_>, id: Self::Id) -> bool;

    /// Number of currently live entries.
    fn active_count(&self) -> usize;
}

/// Resolves a weighted-rarity roll into a kind.
///
/// `roll` must lie in `0..total_weight`; the final kind absorbs any rounding
/// remainder.
pub(crate) fn pick_weighted<K: Copy>(kinds: &[K], weight: impl Fn(&K) -> u32, roll: u32) -> K {
    let mut remaining = roll;
    for kind in kinds {
        let bucket = weight(kind);
        if remaining < bucket {
            return *kind;
        }
        remaining -= bucket;
    }
    kinds[kinds.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_pick_walks_cumulative_buckets() {
        let kinds = ["a", "b", "c"];
        let weight = |kind: &&str| match *kind {
            "a" => 5,
            "b" => 3,
            _ => 2,
        };
        assert_eq!(pick_weighted(&kinds, weight, 0), "a");
        assert_eq!(pick_weighted(&kinds, weight, 4), "a");
        assert_eq!(pick_weighted(&kinds, weight, 5), "b");
        assert_eq!(pick_weighted(&kinds, weight, 7), "b");
        assert_eq!(pick_weighted(&kinds, weight, 8), "c");
        assert_eq!(pick_weighted(&kinds, weight, 9), "c");
    }

    #[test]
    fn rolls_stay_within_bound() {
        let mut pool = ObjectPool::new();
        let mut slots = SlotRegistry::new();
        let mut state = 0x4d59_5df4_d0f3_3173_u64;
        let mut services = SpawnServices::new(&mut pool, &mut slots, &mut state);
        for _ in 0..1_000 {
            assert!(services.roll(17) < 17);
        }
    }
}
