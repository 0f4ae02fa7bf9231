//! Crash point selection
//!
//! The crash point is drawn from the inverse CDF `m = (1 - edge) / (1 - u)`,
//! `u ~ U[0, 1)`. That gives `P(m >= x) = (1 - edge) / x`, so a bet that
//! cashes out at any fixed target `x` returns `(1 - edge)` of its stake on
//! average. Most rounds end low, a few run long.

use rand::{Rng, RngCore};

use crate::consts::{HOUSE_EDGE, MAX_CRASH_POINT, MIN_CRASH_POINT};
use crate::round2;

/// Anything that can pick the next round's crash point.
///
/// The engine normalizes whatever a source returns, so sources don't need to
/// clamp or round themselves.
pub trait CrashPointSource {
    fn next_crash_point(&mut self, rng: &mut dyn RngCore) -> f64;
}

/// Production crash point distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrashPointGenerator {
    house_edge: f64,
}

impl Default for CrashPointGenerator {
    fn default() -> Self {
        Self::new(HOUSE_EDGE)
    }
}

impl CrashPointGenerator {
    pub fn new(house_edge: f64) -> Self {
        Self {
            house_edge: house_edge.clamp(0.0, 0.999),
        }
    }

    /// Draw a crash point, clamped to bounds and rounded to 2 decimals
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.random();
        Self::normalize((1.0 - self.house_edge) / (1.0 - u))
    }

    /// Clamp to `[MIN_CRASH_POINT, MAX_CRASH_POINT]` and round to 2 decimals.
    /// NaN maps to the lower bound.
    pub fn normalize(raw: f64) -> f64 {
        if raw.is_nan() {
            return MIN_CRASH_POINT;
        }
        round2(raw.clamp(MIN_CRASH_POINT, MAX_CRASH_POINT))
    }
}

impl CrashPointSource for CrashPointGenerator {
    fn next_crash_point(&mut self, rng: &mut dyn RngCore) -> f64 {
        self.generate(rng)
    }
}
