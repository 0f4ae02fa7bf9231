//! Multiplier growth law
//!
//! `dm/dt = k * m^p`. With `p > 0` the rate itself grows with the multiplier,
//! which gives the curve its hockey-stick shape.

use serde::{Deserialize, Serialize};

use crate::consts::{GROWTH_K, GROWTH_P};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthLaw {
    pub k: f64,
    pub p: f64,
}

impl Default for GrowthLaw {
    fn default() -> Self {
        Self {
            k: GROWTH_K,
            p: GROWTH_P,
        }
    }
}

impl GrowthLaw {
    pub fn new(k: f64, p: f64) -> Self {
        Self { k, p }
    }

    /// Growth rate (multiplier per second) at multiplier `m`
    #[inline]
    pub fn rate(&self, m: f64) -> f64 {
        self.k * m.powf(self.p)
    }

    /// Advance `m` by `dt` seconds (explicit Euler, matches the tick loop)
    #[inline]
    pub fn step(&self, m: f64, dt: f64) -> f64 {
        m + self.rate(m) * dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_at_one() {
        let law = GrowthLaw::default();
        assert!((law.rate(1.0) - GROWTH_K).abs() < 1e-12);
    }

    #[test]
    fn test_rate_accelerates() {
        let law = GrowthLaw::default();
        assert!(law.rate(4.0) > law.rate(2.0));
        assert!(law.rate(2.0) > law.rate(1.0));
    }

    #[test]
    fn test_step() {
        let law = GrowthLaw::new(0.5, 0.7);
        let next = law.step(1.0, 0.05);
        assert!((next - 1.025).abs() < 1e-12);
    }
}
