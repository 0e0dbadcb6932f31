//! Reproducible input sequences
//!
//! Used by tests and the headless runner to drive the simulation without an
//! input device.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::tick::TickInput;

/// A fixed list of per-tick button snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputScript {
    inputs: Vec<TickInput>,
}

impl InputScript {
    /// Build from raw button states; held flags are derived tick to tick
    pub fn from_buttons(buttons: impl IntoIterator<Item = TickInput>) -> Self {
        let mut prev = TickInput::default();
        let inputs = buttons
            .into_iter()
            .map(|now| {
                let input = TickInput::from_buttons(&prev, now);
                prev = input;
                input
            })
            .collect();
        Self { inputs }
    }

    /// Walk right, pressing jump at the start of every period (held up to 20 ticks)
    pub fn hold_right_and_hop(ticks: usize, period: usize) -> Self {
        let period = period.max(2);
        let press = (period / 2).clamp(1, 20);
        Self::from_buttons((0..ticks).map(|t| TickInput {
            right: true,
            jump: t % period < press,
            ..Default::default()
        }))
    }

    /// Seeded random play biased toward moving right
    pub fn random(seed: u64, ticks: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut buttons = TickInput::default();
        let mut hold = 0u32;

        Self::from_buttons((0..ticks).map(|_| {
            if hold == 0 {
                let right = rng.random_bool(0.7);
                buttons = TickInput {
                    right,
                    left: !right && rng.random_bool(0.5),
                    run: rng.random_bool(0.4),
                    jump: rng.random_bool(0.3),
                    jump_held: false,
                };
                hold = rng.random_range(4..30);
            }
            hold -= 1;
            buttons
        }))
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn get(&self, tick: usize) -> Option<&TickInput> {
        self.inputs.get(tick)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TickInput> {
        self.inputs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_flag_derived() {
        let down = TickInput {
            jump: true,
            ..Default::default()
        };
        let script = InputScript::from_buttons([down, down, TickInput::default(), down]);
        let pressed: Vec<bool> = script.iter().map(TickInput::jump_pressed).collect();
        assert_eq!(pressed, vec![true, false, false, true]);
    }

    #[test]
    fn test_hop_script_shape() {
        let script = InputScript::hold_right_and_hop(90, 45);
        assert_eq!(script.len(), 90);
        assert!(script.iter().all(|i| i.right));
        let presses = script.iter().filter(|i| i.jump_pressed()).count();
        assert_eq!(presses, 2);
        assert!(script.get(25).is_some_and(|i| !i.jump));
    }

    #[test]
    fn test_random_script_reproducible() {
        let a = InputScript::random(42, 500);
        let b = InputScript::random(42, 500);
        let c = InputScript::random(43, 500);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 500);
        assert!(!a.is_empty());
    }
}
