//! Reference curve samples
//!
//! A static lookup table of (time, multiplier) points. The renderer draws the
//! curve through these samples instead of a closed-form function, so a
//! recorded round can give the plot a naturalistic shape.

use serde::{Deserialize, Serialize};

use super::growth::GrowthLaw;
use crate::consts::{DISPLAY_FLOOR, TICK_INTERVAL};

/// A single reference point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSample {
    /// Seconds since launch
    #[serde(rename = "t")]
    pub time: f64,
    /// Multiplier at that time
    #[serde(rename = "v")]
    pub value: f64,
}

impl CurveSample {
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Immutable samples ordered by multiplier (ascending)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveDataset {
    samples: Vec<CurveSample>,
}

impl CurveDataset {
    /// Build from arbitrary samples; non-finite samples are dropped
    pub fn from_samples(mut samples: Vec<CurveSample>) -> Self {
        samples.retain(|s| s.time.is_finite() && s.value.is_finite());
        samples.sort_by(|a, b| a.value.total_cmp(&b.value));
        Self { samples }
    }

    /// Load a recorded curve: `[{"t": 0.0, "v": 1.0}, ...]`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let samples: Vec<CurveSample> = serde_json::from_str(json)?;
        Ok(Self::from_samples(samples))
    }

    /// Integrate `law` from 1.0x in steps of `step` seconds until `max_value`.
    /// The final sample is exactly `max_value`.
    pub fn generate(law: &GrowthLaw, step: f64, max_value: f64) -> Self {
        let mut samples = vec![CurveSample::new(0.0, 1.0)];
        if !(step > 0.0) || !(max_value > 1.0) || !(law.k > 0.0) {
            return Self { samples };
        }

        let mut t = 0.0;
        let mut m = 1.0;
        while m < max_value {
            t += step;
            m = law.step(m, step).min(max_value);
            samples.push(CurveSample::new(t, m));
        }
        Self { samples }
    }

    /// Default curve: the default growth law sampled at tick rate up to 10x
    pub fn reference() -> Self {
        Self::generate(&GrowthLaw::default(), TICK_INTERVAL, DISPLAY_FLOOR)
    }

    pub fn samples(&self) -> &[CurveSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CurveSample> {
        self.samples.get(index)
    }

    /// Index of the first sample with `value >= target`.
    ///
    /// Returns the last index when `target` is beyond every sample and 0 for
    /// an empty dataset or a target below the first sample (NaN included).
    pub fn closest_index_for(&self, target: f64) -> usize {
        if self.samples.is_empty() {
            return 0;
        }
        let index = self.samples.partition_point(|s| s.value < target);
        index.min(self.samples.len() - 1)
    }

    /// Largest sample multiplier (0.0 when empty)
    pub fn max_value(&self) -> f64 {
        self.samples.last().map(|s| s.value).unwrap_or(0.0)
    }

    /// Latest sample time (0.0 when empty)
    pub fn max_time(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.time)
            .fold(0.0, f64::max)
    }

    /// Samples from the start through `index` (inclusive)
    pub fn slice_through(&self, index: usize) -> &[CurveSample] {
        if self.samples.is_empty() {
            return &[];
        }
        &self.samples[..=index.min(self.samples.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small() -> CurveDataset {
        CurveDataset::from_samples(vec![
            CurveSample::new(0.0, 1.0),
            CurveSample::new(1.0, 1.5),
            CurveSample::new(2.0, 2.0),
            CurveSample::new(3.0, 3.0),
        ])
    }

    #[test]
    fn test_closest_index_exact_and_between() {
        let data = small();
        assert_eq!(data.closest_index_for(1.5), 1);
        assert_eq!(data.closest_index_for(1.6), 2);
        assert_eq!(data.closest_index_for(2.0), 2);
    }

    #[test]
    fn test_closest_index_out_of_range() {
        let data = small();
        assert_eq!(data.closest_index_for(0.5), 0);
        assert_eq!(data.closest_index_for(3.0), 3);
        assert_eq!(data.closest_index_for(42.0), 3);
        assert_eq!(data.closest_index_for(f64::NAN), 0);
        assert_eq!(CurveDataset::default().closest_index_for(2.0), 0);
    }

    #[test]
    fn test_max_value() {
        assert_eq!(small().max_value(), 3.0);
        assert_eq!(small().max_time(), 3.0);
        assert_eq!(CurveDataset::default().max_value(), 0.0);
    }

    #[test]
    fn test_from_samples_sorts_and_filters() {
        let data = CurveDataset::from_samples(vec![
            CurveSample::new(2.0, 2.0),
            CurveSample::new(0.0, 1.0),
            CurveSample::new(1.0, f64::NAN),
        ]);
        assert_eq!(data.len(), 2);
        assert_eq!(data.samples()[0].value, 1.0);
    }

    #[test]
    fn test_from_json() {
        let data = CurveDataset::from_json(r#"[{"t":0,"v":1.0},{"t":0.5,"v":1.3}]"#).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.max_value(), 1.3);
        assert!(CurveDataset::from_json("[{]").is_err());
    }

    #[test]
    fn test_reference_curve() {
        let data = CurveDataset::reference();
        assert_eq!(data.samples()[0], CurveSample::new(0.0, 1.0));
        assert_eq!(data.max_value(), DISPLAY_FLOOR);
        // Accelerating: later steps cover more multiplier per tick
        let s = data.samples();
        let early = s[2].value - s[1].value;
        let late = s[s.len() - 2].value - s[s.len() - 3].value;
        assert!(late > early);
    }

    #[test]
    fn test_generate_degenerate() {
        let data = CurveDataset::generate(&GrowthLaw::default(), 0.0, 10.0);
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_slice_through() {
        let data = small();
        assert_eq!(data.slice_through(1).len(), 2);
        assert_eq!(data.slice_through(99).len(), 4);
        assert!(CurveDataset::default().slice_through(0).is_empty());
    }

    proptest! {
        #[test]
        fn prop_closest_index_monotonic(a in 0.0f64..20.0, b in 0.0f64..20.0) {
            let data = CurveDataset::reference();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(data.closest_index_for(lo) <= data.closest_index_for(hi));
        }

        #[test]
        fn prop_closest_index_first_at_or_above(target in 1.0f64..10.0) {
            let data = CurveDataset::reference();
            let i = data.closest_index_for(target);
            prop_assert!(data.samples()[i].value >= target);
            if i > 0 {
                prop_assert!(data.samples()[i - 1].value < target);
            }
        }
    }
}
