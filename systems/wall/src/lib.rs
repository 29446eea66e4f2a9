#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pressure-wall follower system.
//!
//! Drives the wall toward the player: the farther the player pulls ahead of
//! the slack distance, the faster the wall advances, clamped between the
//! base and maximum speeds. The wall never moves backwards.

use std::time::Duration;

use rushline_core::{Command, Event};

/// Tuning parameters for the wall follower.
#[derive(Clone, Copy, Debug)]
pub struct Tuning {
    /// Speed while the player is within the slack distance.
    pub base_speed: f32,
    /// Upper bound on the wall speed.
    pub max_speed: f32,
    /// Additional speed per world unit of gap beyond the slack.
    pub catchup_rate: f32,
    /// Gap the wall tolerates before speeding up.
    pub slack: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 2.0,
            max_speed: 9.0,
            catchup_rate: 0.15,
            slack: 25.0,
        }
    }
}

/// Pure system that advances the pressure wall every tick.
#[derive(Debug)]
pub struct WallDriver {
    tuning: Tuning,
    player_x: f32,
    wall_x: f32,
}

impl WallDriver {
    /// Creates a driver that starts tracking from the given wall position.
    #[must_use]
    pub fn new(tuning: Tuning, wall_x: f32) -> Self {
        Self {
            tuning,
            player_x: 0.0,
            wall_x,
        }
    }

    /// Current speed for the tracked gap.
    #[must_use]
    pub fn speed(&self) -> f32 {
        let gap = self.player_x - self.wall_x;
        let boosted = self.tuning.base_speed + self.tuning.catchup_rate * (gap - self.tuning.slack);
        boosted.clamp(self.tuning.base_speed, self.tuning.max_speed)
    }

    /// Consumes world events and emits one advance per time step.
    pub fn handle(&mut self, events: &[Event], out_commands: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    let dx = self.speed() * dt.as_secs_f32();
                    out_commands.push(Command::AdvanceWall { dx });
                }
                Event::PlayerMoved { position } => self.player_x = position.x(),
                Event::WallAdvanced { x } => self.wall_x = *x,
                Event::WorldReset => self.player_x = 0.0,
                _ => {}
            }
        }
    }
}
