//! Generation report accumulated over a demo run.

use std::fmt::Write;

use rushline_core::{Event, SpawnRejection};
use rushline_world::{query, Spawner, World};
use thiserror::Error;

/// Errors surfaced while rendering the report.
#[derive(Debug, Error)]
pub(crate) enum ReportError {
    /// The run never processed a tick, so there is nothing to report.
    #[error("no ticks were simulated")]
    EmptyRun,
    /// Formatting into the output buffer failed.
    #[error("report rendering failed: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Event counters plus an end-of-run world snapshot.
#[derive(Debug, Default)]
pub(crate) struct Report {
    ticks: u64,
    segments_spawned: u64,
    enemies_spawned: u64,
    enemies_died: u64,
    collectibles_spawned: u64,
    throwables_spawned: u64,
    throwables_expired: u64,
    scenery_spawned: u64,
    drops_requested: u64,
    recycled: u64,
    rejected_slot: u64,
    rejected_template: u64,
    rejected_budget: u64,
    snapshot: Option<Snapshot>,
}

#[derive(Debug)]
struct Snapshot {
    player_x: f32,
    wall_x: f32,
    segments: usize,
    enemies: usize,
    collectibles: usize,
    throwables: usize,
    scenery: usize,
    reserved_cells: usize,
    pool_constructed: u64,
}

impl Report {
    /// Folds one tick's event batch into the counters.
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => self.ticks += 1,
                Event::SegmentSpawned { .. } => self.segments_spawned += 1,
                Event::EnemySpawned { .. } => self.enemies_spawned += 1,
                Event::EnemyDied { .. } => self.enemies_died += 1,
                Event::CollectibleSpawned { .. } => self.collectibles_spawned += 1,
                Event::ThrowableSpawned { .. } => self.throwables_spawned += 1,
                Event::ThrowableExpired { .. } => self.throwables_expired += 1,
                Event::ScenerySpawned { .. } => self.scenery_spawned += 1,
                Event::DropRequested { .. } => self.drops_requested += 1,
                Event::SegmentRecycled { .. }
                | Event::EnemyRecycled { .. }
                | Event::CollectibleRecycled { .. }
                | Event::ThrowableRecycled { .. }
                | Event::SceneryRecycled { .. } => self.recycled += 1,
                Event::SpawnRejected { reason, .. } => match reason {
                    SpawnRejection::SlotOccupied => self.rejected_slot += 1,
                    SpawnRejection::UnknownTemplate => self.rejected_template += 1,
                    SpawnRejection::BudgetExhausted => self.rejected_budget += 1,
                },
                _ => {}
            }
        }
    }

    /// Captures the end-of-run world state.
    pub(crate) fn finish(&mut self, world: &World) {
        self.snapshot = Some(Snapshot {
            player_x: query::player_position(world).x(),
            wall_x: query::wall_position(world),
            segments: query::segments(world).active_count(),
            enemies: query::enemies(world).active_count(),
            collectibles: query::collectibles(world).active_count(),
            throwables: query::throwables(world).active_count(),
            scenery: query::scenery(world).active_count(),
            reserved_cells: query::reserved_cells(world),
            pool_constructed: query::pool_constructed(world),
        });
    }

    /// Renders the counters and the snapshot as a printable report.
    pub(crate) fn render(&self) -> Result<String, ReportError> {
        if self.ticks == 0 {
            return Err(ReportError::EmptyRun);
        }

        let mut out = String::new();
        writeln!(out, "=== generation report ({} ticks) ===", self.ticks)?;
        writeln!(out, "segments spawned:     {}", self.segments_spawned)?;
        writeln!(out, "enemies spawned:      {}", self.enemies_spawned)?;
        writeln!(out, "enemies died:         {}", self.enemies_died)?;
        writeln!(out, "collectibles spawned: {}", self.collectibles_spawned)?;
        writeln!(out, "throwables spawned:   {}", self.throwables_spawned)?;
        writeln!(out, "throwables expired:   {}", self.throwables_expired)?;
        writeln!(out, "scenery spawned:      {}", self.scenery_spawned)?;
        writeln!(out, "drops requested:      {}", self.drops_requested)?;
        writeln!(out, "objects recycled:     {}", self.recycled)?;
        writeln!(
            out,
            "rejections:           slot {} / template {} / budget {}",
            self.rejected_slot, self.rejected_template, self.rejected_budget
        )?;
        if let Some(snapshot) = &self.snapshot {
            writeln!(
                out,
                "final state:          player x {:.1}, wall x {:.1}",
                snapshot.player_x, snapshot.wall_x
            )?;
            writeln!(
                out,
                "active:               {} segments, {} enemies, {} collectibles, {} throwables, {} scenery",
                snapshot.segments,
                snapshot.enemies,
                snapshot.collectibles,
                snapshot.throwables,
                snapshot.scenery
            )?;
            writeln!(
                out,
                "registry:             {} reserved cells, {} pool instances built",
                snapshot.reserved_cells, snapshot.pool_constructed
            )?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rushline_core::{SegmentId, SegmentKind, SpawnCategory, WorldPos};
    use std::time::Duration;

    #[test]
    fn empty_run_refuses_to_render() {
        let report = Report::default();
        assert!(matches!(report.render(), Err(ReportError::EmptyRun)));
    }

    #[test]
    fn counters_follow_the_event_stream() {
        let mut report = Report::default();
        report.observe(&[
            Event::TimeAdvanced {
                dt: Duration::from_millis(50),
            },
            Event::SegmentSpawned {
                id: SegmentId::new(0),
                kind: SegmentKind::Normal,
                position: WorldPos::new(0.0, 1.0),
            },
            Event::SpawnRejected {
                category: SpawnCategory::Segment,
                position: WorldPos::new(1.0, 1.0),
                reason: SpawnRejection::SlotOccupied,
            },
        ]);

        let rendered = report.render().expect("non-empty run renders");
        assert!(rendered.contains("segments spawned:     1"));
        assert!(rendered.contains("slot 1 / template 0 / budget 0"));
    }
}
