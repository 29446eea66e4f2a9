//! Reference-counted reservation grid shared by every spawner.
//!
//! Positions are rounded onto integer cells; reserving a cell also inspects
//! the two horizontal neighbors so minimum spacing falls out of the grid
//! without a separate distance check. All calls happen on the single
//! simulation tick, so strict reserve/unreserve pairing replaces locking.

use std::collections::HashMap;

use rushline_core::{GridKey, WorldPos};

/// Process-wide occupancy map preventing overlapping placements.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    cells: HashMap<GridKey, u32>,
}

impl SlotRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to reserve the cell containing `position`.
    ///
    /// Fails without mutation when the cell or either horizontal neighbor is
    /// occupied; otherwise increments the center cell's count.
    #[must_use]
    pub fn reserve(&mut self, position: WorldPos) -> bool {
        let key = position.grid_key();
        if self.occupied(key) || self.occupied(key.west()) || self.occupied(key.east()) {
            return false;
        }
        *self.cells.entry(key).or_insert(0) += 1;
        true
    }

    /// Releases one reservation on the cell containing `position`.
    ///
    /// Releasing a vacant cell is a silent no-op; despawn paths may race
    /// with registry resets and must stay idempotent.
    pub fn unreserve(&mut self, position: WorldPos) {
        let key = position.grid_key();
        if let Some(count) = self.cells.get_mut(&key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                let _ = self.cells.remove(&key);
            }
        }
    }

    /// Advisory occupancy check on the exact cell only, no neighbor check.
    #[must_use]
    pub fn is_reserved(&self, position: WorldPos) -> bool {
        self.occupied(position.grid_key())
    }

    /// Purges every cell strictly behind the threshold to bound memory.
    pub fn clear_behind(&mut self, threshold_x: f32) {
        self.cells.retain(|key, _| (key.x() as f32) >= threshold_x);
    }

    /// Removes every reservation; used between levels.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is reserved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn occupied(&self, key: GridKey) -> bool {
        self.cells.get(&key).copied().unwrap_or(0) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_cell_is_blocked_until_release() {
        let mut slots = SlotRegistry::new();
        assert!(slots.reserve(WorldPos::new(10.0, 0.0)));
        assert!(
            !slots.reserve(WorldPos::new(11.0, 0.0)),
            "east neighbor must be blocked"
        );
        assert!(
            !slots.reserve(WorldPos::new(9.0, 0.0)),
            "west neighbor must be blocked"
        );

        slots.unreserve(WorldPos::new(10.0, 0.0));
        assert!(slots.reserve(WorldPos::new(11.0, 0.0)));
    }

    #[test]
    fn different_rows_do_not_interfere() {
        let mut slots = SlotRegistry::new();
        assert!(slots.reserve(WorldPos::new(10.0, 0.0)));
        assert!(slots.reserve(WorldPos::new(10.0, 3.0)));
        assert!(slots.reserve(WorldPos::new(11.0, 6.0)));
    }

    #[test]
    fn rounding_maps_nearby_positions_to_one_cell() {
        let mut slots = SlotRegistry::new();
        assert!(slots.reserve(WorldPos::new(10.4, 0.1)));
        assert!(!slots.reserve(WorldPos::new(9.6, -0.2)));
        assert!(slots.is_reserved(WorldPos::new(10.0, 0.0)));
    }

    #[test]
    fn unreserve_is_idempotent_on_vacant_cells() {
        let mut slots = SlotRegistry::new();
        slots.unreserve(WorldPos::new(5.0, 5.0));
        assert!(slots.is_empty());

        assert!(slots.reserve(WorldPos::new(5.0, 5.0)));
        slots.unreserve(WorldPos::new(5.0, 5.0));
        slots.unreserve(WorldPos::new(5.0, 5.0));
        assert!(slots.is_empty(), "double release must not underflow");
        assert!(slots.reserve(WorldPos::new(5.0, 5.0)));
    }

    #[test]
    fn full_cycle_vacates_the_cell() {
        let mut slots = SlotRegistry::new();
        let position = WorldPos::new(24.0, 2.0);
        assert!(slots.reserve(position));
        assert_eq!(slots.len(), 1);
        slots.unreserve(position);
        assert!(slots.is_empty(), "cell must be absent after the cycle");
    }

    #[test]
    fn clear_behind_purges_only_trailing_cells() {
        let mut slots = SlotRegistry::new();
        assert!(slots.reserve(WorldPos::new(4.0, 0.0)));
        assert!(slots.reserve(WorldPos::new(20.0, 0.0)));
        assert!(slots.reserve(WorldPos::new(40.0, 0.0)));

        slots.clear_behind(10.0);
        assert!(!slots.is_reserved(WorldPos::new(4.0, 0.0)));
        assert!(slots.is_reserved(WorldPos::new(20.0, 0.0)));
        assert!(slots.is_reserved(WorldPos::new(40.0, 0.0)));
    }

    #[test]
    fn exact_check_ignores_neighbors() {
        let mut slots = SlotRegistry::new();
        assert!(slots.reserve(WorldPos::new(10.0, 0.0)));
        assert!(!slots.is_reserved(WorldPos::new(11.0, 0.0)));
        assert!(!slots.is_reserved(WorldPos::new(9.0, 0.0)));
    }
}
