//! Height-pattern state machine for platform placement.
//!
//! The machine walks one of five patterns for a rolled number of steps,
//! then re-rolls. Candidate heights are clamped to the configured band
//! *before* being committed; a clamp flips the machine into the opposite
//! direction with a shortened step count so the frontier bounces off the
//! band edges instead of crawling along them.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

const PATTERN_WEIGHTS: [(Pattern, u32); 5] = [
    (Pattern::Normal, 30),
    (Pattern::AscendingSteps, 25),
    (Pattern::DescendingSteps, 25),
    (Pattern::HillUp, 10),
    (Pattern::HillDown, 10),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pattern {
    Normal,
    AscendingSteps,
    DescendingSteps,
    HillUp,
    HillDown,
}

impl Pattern {
    const fn delta(self) -> i32 {
        match self {
            Pattern::Normal => 0,
            Pattern::AscendingSteps => 1,
            Pattern::DescendingSteps => -1,
            Pattern::HillUp => 2,
            Pattern::HillDown => -2,
        }
    }

    const fn flipped(self) -> Self {
        match self {
            Pattern::Normal => Pattern::Normal,
            Pattern::AscendingSteps => Pattern::DescendingSteps,
            Pattern::DescendingSteps => Pattern::AscendingSteps,
            Pattern::HillUp => Pattern::HillDown,
            Pattern::HillDown => Pattern::HillUp,
        }
    }
}

#[derive(Debug)]
pub(crate) struct HeightMachine {
    height: i32,
    min: i32,
    max: i32,
    pattern: Pattern,
    remaining: u32,
}

impl HeightMachine {
    pub(crate) fn new(start: i32, min: i32, max: i32) -> Self {
        debug_assert!(min <= max, "height band must be ordered");
        Self {
            height: start.clamp(min, max),
            min,
            max,
            pattern: Pattern::Normal,
            remaining: 0,
        }
    }

    /// Advances one placement and returns the committed height.
    pub(crate) fn advance(&mut self, rng: &mut ChaCha8Rng) -> i32 {
        if self.remaining == 0 {
            self.pattern = roll_pattern(rng);
            self.remaining = rng.gen_range(3..=5);
        }

        let candidate = self.height.saturating_add(self.pattern.delta());
        if candidate > self.max || candidate < self.min {
            self.pattern = self.pattern.flipped();
            self.remaining = rng.gen_range(1..=2);
        }
        self.height = candidate.clamp(self.min, self.max);
        self.remaining -= 1;
        self.height
    }

    pub(crate) fn reset(&mut self, start: i32) {
        self.height = start.clamp(self.min, self.max);
        self.pattern = Pattern::Normal;
        self.remaining = 0;
    }
}

fn roll_pattern(rng: &mut ChaCha8Rng) -> Pattern {
    let total: u32 = PATTERN_WEIGHTS.iter().map(|(_, weight)| weight).sum();
    let mut roll = rng.gen_range(0..total);
    for (pattern, weight) in PATTERN_WEIGHTS {
        if roll < weight {
            return pattern;
        }
        roll -= weight;
    }
    Pattern::Normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn heights_stay_inside_the_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut machine = HeightMachine::new(2, 1, 6);
        for _ in 0..500 {
            let height = machine.advance(&mut rng);
            assert!((1..=6).contains(&height), "height {height} left the band");
        }
    }

    #[test]
    fn clamp_flips_the_direction() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut machine = HeightMachine::new(6, 1, 6);
        machine.pattern = Pattern::AscendingSteps;
        machine.remaining = 4;

        let height = machine.advance(&mut rng);
        assert_eq!(height, 6, "clamped at the upper edge");
        assert_eq!(machine.pattern, Pattern::DescendingSteps);
        assert!(machine.remaining <= 1, "shortened counter after the flip");
    }

    #[test]
    fn replays_identically_for_the_same_seed() {
        let mut a = (ChaCha8Rng::seed_from_u64(77), HeightMachine::new(3, 1, 6));
        let mut b = (ChaCha8Rng::seed_from_u64(77), HeightMachine::new(3, 1, 6));
        for _ in 0..200 {
            assert_eq!(a.1.advance(&mut a.0), b.1.advance(&mut b.0));
        }
    }
}
