//! Round history
//!
//! Crash points of completed rounds, oldest first, bounded so the strip of
//! history pills never grows without limit.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::HISTORY_CAPACITY;

/// Multiplier at or above which a round counts as a "good" round in the strip
pub const HIGH_ROUND_THRESHOLD: f64 = 2.0;

/// Crash points of past rounds (most recent last)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundHistory {
    entries: VecDeque<f64>,
    capacity: usize,
}

impl Default for RoundHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl RoundHistory {
    /// Create an empty history keeping at most `capacity` rounds
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a completed round, evicting the oldest if full
    pub fn push(&mut self, crash_point: f64) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(crash_point);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent crash point
    pub fn last(&self) -> Option<f64> {
        self.entries.back().copied()
    }

    /// Copy out all entries, oldest to newest
    pub fn to_vec(&self) -> Vec<f64> {
        self.entries.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut history = RoundHistory::new(10);
        for cp in [1.5, 2.25, 10.0, 1.01, 3.45] {
            history.push(cp);
        }
        assert_eq!(history.len(), 5);
        assert_eq!(history.to_vec(), vec![1.5, 2.25, 10.0, 1.01, 3.45]);
        assert_eq!(history.last(), Some(3.45));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = RoundHistory::new(3);
        for cp in [1.0, 2.0, 3.0, 4.0] {
            history.push(cp);
        }
        assert_eq!(history.to_vec(), vec![2.0, 3.0, 4.0]);
    }
}
