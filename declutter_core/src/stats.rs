//! Running mean / sample standard deviation for one scalar signal.
//!
//! # Update rule
//! With `n` the count after the new sample:
//! - `mean' = ((n-1)·mean + x) / n`
//! - `var'  = ((n-2)·var + (x - mean')(x - mean)) / (n-1)`, for `n ≥ 2`
//!
//! This is Welford's recurrence written over the sample variance (`ddof = 1`)
//! instead of the sum of squared deviations. The variance is clamped at zero
//! so rounding can never produce a negative radicand.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatAccumulator {
    count: u64,
    mean: f64,
    variance: f64,
}

impl StatAccumulator {
    /// Empty accumulator: no samples, mean and std reported as 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator holding exactly one sample.
    pub fn seeded(value: f64) -> Self {
        Self {
            count: 1,
            mean: value,
            variance: 0.0,
        }
    }

    /// Absorb one sample. Returns `(mean, std_dev)` after the update.
    pub fn update(&mut self, value: f64) -> (f64, f64) {
        self.count += 1;
        let n = self.count as f64;
        let prev_mean = self.mean;
        let mean = ((n - 1.0) * prev_mean + value) / n;

        if self.count >= 2 {
            let var = ((n - 2.0) * self.variance + (value - mean) * (value - prev_mean)) / (n - 1.0);
            self.variance = var.max(0.0);
        }
        self.mean = mean;

        (self.mean, self.std_dev())
    }

    /// Absorb one sample into the mean only; the spread stays at 0. Used
    /// while a signal's spread is not yet reported.
    pub fn update_mean(&mut self, value: f64) -> f64 {
        self.count += 1;
        let n = self.count as f64;
        self.mean = ((n - 1.0) * self.mean + value) / n;
        self.variance = 0.0;
        self.mean
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Running mean; 0 before the first sample.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance; 0 until two samples have been seen.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.variance
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn batch_mean(xs: &[f64]) -> f64 {
        xs.iter().sum::<f64>() / xs.len() as f64
    }

    fn batch_sample_std(xs: &[f64]) -> f64 {
        let m = batch_mean(xs);
        let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
        (ss / (xs.len() as f64 - 1.0)).sqrt()
    }

    #[test]
    fn mean_matches_batch_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let xs: Vec<f64> = (0..500).map(|_| rng.gen_range(-50.0..150.0)).collect();
        let mut acc = StatAccumulator::new();
        for &x in &xs {
            acc.update(x);
        }
        assert_eq!(acc.count(), 500);
        assert_relative_eq!(acc.mean(), batch_mean(&xs), max_relative = 1e-9);
    }

    #[test]
    fn std_matches_sample_std() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let xs: Vec<f64> = (0..200).map(|_| rng.gen_range(0.0..30.0)).collect();
        let mut acc = StatAccumulator::seeded(xs[0]);
        for &x in &xs[1..] {
            acc.update(x);
        }
        assert_relative_eq!(acc.std_dev(), batch_sample_std(&xs), max_relative = 1e-9);
    }

    #[test]
    fn std_of_prefixes_tracks_batch() {
        let xs = [10.0, 12.0, 11.0, 15.0, 9.5];
        let mut acc = StatAccumulator::new();
        for (i, &x) in xs.iter().enumerate() {
            let (mean, std) = acc.update(x);
            assert_relative_eq!(mean, batch_mean(&xs[..=i]), max_relative = 1e-12);
            if i >= 1 {
                assert_relative_eq!(std, batch_sample_std(&xs[..=i]), max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn single_sample_has_zero_std() {
        let mut acc = StatAccumulator::new();
        let (mean, std) = acc.update(42.0);
        assert_eq!(mean, 42.0);
        assert_eq!(std, 0.0);
        assert!(!acc.std_dev().is_nan());

        let seeded = StatAccumulator::seeded(3.0);
        assert_eq!(seeded.std_dev(), 0.0);
        assert_eq!(seeded.mean(), 3.0);
    }

    #[test]
    fn constant_sequence_never_goes_negative() {
        let mut acc = StatAccumulator::seeded(0.1);
        for _ in 0..10_000 {
            let (_, std) = acc.update(0.1);
            assert!(std >= 0.0 && !std.is_nan());
        }
        assert!(acc.variance() >= 0.0);
    }

    #[test]
    fn spread_starts_after_mean_only_samples() {
        let mut acc = StatAccumulator::seeded(0.0);
        assert_eq!(acc.update_mean(4.0), 2.0);
        assert_eq!(acc.std_dev(), 0.0);
        let (mean, std) = acc.update(8.0);
        assert_relative_eq!(mean, 4.0, epsilon = 1e-12);
        // ((n-2)·0 + (8-4)(8-2)) / 2
        assert_relative_eq!(std, 12.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn nan_propagates() {
        let mut acc = StatAccumulator::seeded(1.0);
        let (mean, _) = acc.update(f64::NAN);
        assert!(mean.is_nan());
    }
}
