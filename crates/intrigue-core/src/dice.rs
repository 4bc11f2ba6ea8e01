//! Randomness for diplomatic actions.
//!
//! All chance in the action core goes through [`Dice::roll`]. The server
//! seeds one [`SeededDice`] per process and hands it to every action so a
//! session can be replayed from its seed; tests use [`ScriptedDice`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Uniform integer source.
pub trait Dice {
    /// A value in `[0, n)`. `roll(0)` is always 0.
    fn roll(&mut self, n: u32) -> u32;
}

/// Reproducible dice backed by a seeded PRNG.
#[derive(Clone, Debug)]
pub struct SeededDice {
    rng: StdRng,
    seed: u64,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Dice for SeededDice {
    fn roll(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }
}

/// Dice that replay a fixed sequence and record every request.
///
/// Values larger than the requested range are clamped to `n - 1`. Once the
/// script runs out, `fallback` is used.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDice {
    script: VecDeque<u32>,
    fallback: u32,
    /// Every `n` passed to `roll`, in order.
    pub requests: Vec<u32>,
}

impl ScriptedDice {
    pub fn new(values: &[u32]) -> Self {
        Self {
            script: values.iter().copied().collect(),
            fallback: 0,
            requests: Vec::new(),
        }
    }

    /// Dice that always produce `value` (clamped to the range).
    pub fn always(value: u32) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: value,
            requests: Vec::new(),
        }
    }

    pub fn push(&mut self, value: u32) {
        self.script.push_back(value);
    }

    /// Number of rolls made so far.
    pub fn rolls(&self) -> usize {
        self.requests.len()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self, n: u32) -> u32 {
        self.requests.push(n);
        if n == 0 {
            return 0;
        }
        let value = self.script.pop_front().unwrap_or(self.fallback);
        value.min(n - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_reproducible() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        for _ in 0..50 {
            assert_eq!(a.roll(100), b.roll(100));
        }
    }

    #[test]
    fn test_seeded_dice_range() {
        let mut dice = SeededDice::new(7);
        for _ in 0..200 {
            assert!(dice.roll(6) < 6);
        }
        assert_eq!(dice.roll(0), 0);
    }

    #[test]
    fn test_scripted_dice_replays_and_clamps() {
        let mut dice = ScriptedDice::new(&[5, 200]);
        assert_eq!(dice.roll(10), 5);
        assert_eq!(dice.roll(100), 99);
        assert_eq!(dice.roll(100), 0);
        assert_eq!(dice.requests, vec![10, 100, 100]);
    }

    #[test]
    fn test_scripted_dice_always() {
        let mut dice = ScriptedDice::always(99);
        assert_eq!(dice.roll(100), 99);
        assert_eq!(dice.roll(3), 2);
        assert_eq!(dice.rolls(), 2);
    }
}
