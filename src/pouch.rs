// tabellone/src/pouch.rs
// The pouch owns the universe of drawable numbers: what is still available,
// what came out, and in which order.

use crate::defs::{FIRSTNUMBER, LASTNUMBER, Number, RECENT_WINDOW, TOTALNUMBERS};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PouchError {
    #[error("pouch is empty")]
    Exhausted,
    #[error("number {0} is not available for drawing")]
    NotAvailable(Number),
    #[error("recent window must be at least 1")]
    InvalidWindow,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Pouch {
    available: Vec<Number>,
    drawn: HashSet<Number>,
    history: Vec<Number>,
}

impl Pouch {
    pub fn new() -> Self {
        Pouch {
            available: (FIRSTNUMBER..=LASTNUMBER).collect(),
            drawn: HashSet::new(),
            history: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn drawn_count(&self) -> usize {
        self.history.len()
    }

    // Moves one number from available to drawn and records it, in one step.
    fn take(&mut self, index: usize) -> Number {
        let number = self.available.remove(index);
        self.drawn.insert(number);
        self.history.push(number);
        number
    }

    /// Draw uniformly among the remaining numbers with the process RNG.
    pub fn draw(&mut self) -> Result<Number, PouchError> {
        self.draw_with(&mut rand::rng())
    }

    /// Draw uniformly among the remaining numbers.
    pub fn draw_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Number, PouchError> {
        if self.is_empty() {
            return Err(PouchError::Exhausted);
        }
        let index = rng.random_range(0..self.available.len());
        Ok(self.take(index))
    }

    /// Draw a specific number, replaying a recorded extraction order.
    pub fn draw_exact(&mut self, number: Number) -> Result<Number, PouchError> {
        if self.is_empty() {
            return Err(PouchError::Exhausted);
        }
        match self.available.iter().position(|&n| n == number) {
            Some(index) => Ok(self.take(index)),
            None => Err(PouchError::NotAvailable(number)),
        }
    }

    /// Whether `number` has come out of the pouch. Out-of-range values are
    /// never drawn, so they simply report false.
    pub fn is_drawn(&self, number: Number) -> bool {
        self.drawn.contains(&number)
    }

    pub fn last_drawn(&self) -> Option<Number> {
        self.history.last().copied()
    }

    /// The last `n` extractions in temporal order, oldest first. Returns
    /// fewer than `n` while the history is still short.
    pub fn recent(&self, n: usize) -> Result<Vec<Number>, PouchError> {
        if n == 0 {
            return Err(PouchError::InvalidWindow);
        }
        let start = self.history.len().saturating_sub(n);
        Ok(self.history[start..].to_vec())
    }

    /// Full extraction history in draw order.
    pub fn history(&self) -> &[Number] {
        &self.history
    }

    pub fn snapshot(&self) -> PouchSnapshot {
        let start = self.history.len().saturating_sub(RECENT_WINDOW);
        let progress = self.drawn_count() as f64 * 100.0 / TOTALNUMBERS as f64;
        PouchSnapshot {
            total_numbers: TOTALNUMBERS,
            drawn_count: self.drawn_count(),
            available_count: self.available_count(),
            recent: self.history[start..].to_vec(),
            last_drawn: self.last_drawn(),
            progress_percent: (progress * 10.0).round() / 10.0,
        }
    }

    /// Refill the pouch to its initial state.
    pub fn reset(&mut self) {
        *self = Pouch::new();
    }
}

impl Default for Pouch {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only pouch state for status displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PouchSnapshot {
    pub total_numbers: usize,
    pub drawn_count: usize,
    pub available_count: usize,
    pub recent: Vec<Number>,
    pub last_drawn: Option<Number>,
    pub progress_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_new_pouch_is_full() {
        let pouch = Pouch::new();
        assert_eq!(pouch.available_count(), 90);
        assert_eq!(pouch.drawn_count(), 0);
        assert_eq!(pouch.last_drawn(), None);
        assert!(!pouch.is_empty());
    }

    #[test]
    fn test_draw_moves_number_out_of_available() {
        let mut pouch = Pouch::new();
        let number = pouch.draw().unwrap();
        assert!((1..=90).contains(&number));
        assert!(pouch.is_drawn(number));
        assert_eq!(pouch.available_count(), 89);
        assert_eq!(pouch.drawn_count(), 1);
        assert_eq!(pouch.last_drawn(), Some(number));
    }

    #[test]
    fn test_ninety_draws_exhaust_the_pouch() {
        let mut pouch = Pouch::new();
        let mut seen = HashSet::new();
        for _ in 0..90 {
            let number = pouch.draw().unwrap();
            assert!(seen.insert(number), "number {number} drawn twice");
        }
        assert!(pouch.is_empty());
        assert_eq!(pouch.drawn_count(), 90);
        assert_eq!(seen.len(), 90);
        assert_eq!(pouch.draw(), Err(PouchError::Exhausted));
    }

    #[test]
    fn test_draw_exact_follows_a_recorded_order() {
        let mut pouch = Pouch::new();
        for number in [42, 7, 90, 1] {
            assert_eq!(pouch.draw_exact(number), Ok(number));
        }
        assert_eq!(pouch.history(), &[42, 7, 90, 1]);
        assert_eq!(pouch.draw_exact(42), Err(PouchError::NotAvailable(42)));
    }

    #[test]
    fn test_is_drawn_is_permissive_out_of_range() {
        let pouch = Pouch::new();
        assert!(!pouch.is_drawn(0));
        assert!(!pouch.is_drawn(91));
        assert!(!pouch.is_drawn(255));
    }

    #[test]
    fn test_recent_window_semantics() {
        let mut pouch = Pouch::new();
        assert_eq!(pouch.recent(0), Err(PouchError::InvalidWindow));
        assert_eq!(pouch.recent(5), Ok(Vec::new()));
        for number in [10, 20, 30] {
            pouch.draw_exact(number).unwrap();
        }
        // Fewer entries than the window while the history is short.
        assert_eq!(pouch.recent(5).unwrap(), vec![10, 20, 30]);
        assert_eq!(pouch.recent(2).unwrap(), vec![20, 30]);
        assert_eq!(pouch.recent(1).unwrap(), vec![30]);
    }

    #[test]
    fn test_snapshot_progress_rounding() {
        let mut pouch = Pouch::new();
        pouch.draw_exact(5).unwrap();
        let snapshot = pouch.snapshot();
        assert_eq!(snapshot.total_numbers, 90);
        assert_eq!(snapshot.drawn_count, 1);
        assert_eq!(snapshot.available_count, 89);
        assert_eq!(snapshot.last_drawn, Some(5));
        // 1/90 = 1.111..% rounded to one decimal.
        assert_eq!(snapshot.progress_percent, 1.1);

        for number in 6..=49 {
            pouch.draw_exact(number).unwrap();
        }
        assert_eq!(pouch.snapshot().progress_percent, 50.0);
    }

    #[test]
    fn test_snapshot_recent_is_capped_at_window() {
        let mut pouch = Pouch::new();
        for number in 1..=8 {
            pouch.draw_exact(number).unwrap();
        }
        assert_eq!(pouch.snapshot().recent, vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut pouch = Pouch::new();
        for _ in 0..30 {
            pouch.draw().unwrap();
        }
        pouch.reset();
        assert_eq!(pouch.available_count(), 90);
        assert_eq!(pouch.drawn_count(), 0);
        assert_eq!(pouch.last_drawn(), None);
        assert_eq!(pouch.recent(5).unwrap(), Vec::<Number>::new());
    }

    proptest! {
        // Drawn and available always partition 1..=90, whatever the draw count.
        #[test]
        fn prop_pouch_stays_consistent(seed in any::<u64>(), draws in 0usize..=90) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut pouch = Pouch::new();
            for _ in 0..draws {
                pouch.draw_with(&mut rng).unwrap();
            }
            prop_assert_eq!(pouch.drawn_count(), draws);
            prop_assert_eq!(pouch.available_count(), 90 - draws);
            let history: HashSet<Number> = pouch.history().iter().copied().collect();
            prop_assert_eq!(history.len(), draws);
            for number in 1..=90u8 {
                prop_assert_eq!(pouch.is_drawn(number), history.contains(&number));
            }
        }
    }
}
