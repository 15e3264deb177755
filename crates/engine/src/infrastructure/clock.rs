//! Clock and random implementations.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Utc};

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        use rand::Rng;
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Replays scripted die results, then falls back to `min`.
///
/// Used by the dev binary's `--dice` flag and by tests.
pub struct ScriptedRandom(Mutex<VecDeque<i32>>);

impl ScriptedRandom {
    pub fn new(results: impl IntoIterator<Item = i32>) -> Self {
        Self(Mutex::new(results.into_iter().collect()))
    }
}

impl RandomPort for ScriptedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        let next = match self.0.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.unwrap_or(min).clamp(min, max)
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_random_replays_then_falls_back() {
        let random = ScriptedRandom::new([4, 9]);
        assert_eq!(random.gen_range(1, 6), 4);
        // Out-of-range scripted values are clamped to the die.
        assert_eq!(random.gen_range(1, 6), 6);
        assert_eq!(random.gen_range(1, 20), 1);
    }

    #[test]
    fn system_random_stays_in_range() {
        let random = SystemRandom::new();
        for _ in 0..100 {
            let value = random.gen_range(1, 6);
            assert!((1..=6).contains(&value));
        }
    }
}
