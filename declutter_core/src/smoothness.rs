//! Smoothness factors (m1, m2) of a scalar signal.
//!
//! `m1` is the running mean squared deviation of the signal's first
//! differences from their running mean; `m2` normalises it by the running
//! mean absolute difference. Erratic signals score high on both.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothnessTracker {
    prev_value: f64,
    /// Running mean of deltas (q)
    prev_delta_running_mean: f64,
    /// Running mean of |delta| (c)
    mean_abs_delta: f64,
    m1: f64,
    m2: f64,
}

impl SmoothnessTracker {
    /// Tracker seeded with the signal's first observed value.
    pub fn new(first_value: f64) -> Self {
        Self {
            prev_value: first_value,
            prev_delta_running_mean: 0.0,
            mean_abs_delta: 0.0,
            m1: 0.0,
            m2: 0.0,
        }
    }

    /// Absorb the next value. `n` is the owning track's update count including
    /// this sample, so the first delta arrives with `n = 2`. Returns `(m1, m2)`.
    pub fn update(&mut self, value: f64, n: u64) -> (f64, f64) {
        debug_assert!(n >= 1, "smoothness update needs n >= 1");
        let n = n.max(1) as f64;
        let delta = value - self.prev_value;

        let q = ((n - 1.0) * self.prev_delta_running_mean + delta) / n;
        let resid = delta - q;
        let m1 = ((n - 1.0) * self.m1 + resid * resid) / n;
        let c = ((n - 1.0) * self.mean_abs_delta + delta.abs()) / n;
        let m2 = if c != 0.0 { m1 / c } else { 0.0 };

        self.prev_value = value;
        self.prev_delta_running_mean = q;
        self.mean_abs_delta = c;
        self.m1 = m1;
        self.m2 = m2;

        (m1, m2)
    }

    pub fn m1(&self) -> f64 {
        self.m1
    }

    pub fn m2(&self) -> f64 {
        self.m2
    }

    pub fn prev_value(&self) -> f64 {
        self.prev_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn constant_signal_is_perfectly_smooth() {
        let mut s = SmoothnessTracker::new(5.0);
        for n in 1..=50 {
            let (m1, m2) = s.update(5.0, n);
            assert_eq!(m1, 0.0);
            assert_eq!(m2, 0.0);
        }
    }

    #[test]
    fn constant_slope_is_smooth_but_m2_defined() {
        // Equal deltas fed from n = 1: q equals the delta, so no residual.
        let mut s = SmoothnessTracker::new(0.0);
        for n in 1..=10u64 {
            let (m1, m2) = s.update(n as f64 * 2.0, n);
            assert_relative_eq!(m1, 0.0, epsilon = 1e-12);
            assert_relative_eq!(m2, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn hand_computed_steps() {
        // deltas: +2, -1 at track updates 2 and 3
        let mut s = SmoothnessTracker::new(10.0);
        let (m1, m2) = s.update(12.0, 2);
        // q = 2/2 = 1, resid = 1, m1 = 1/2; c = 2/2 = 1
        assert_relative_eq!(m1, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m2, 0.5, epsilon = 1e-12);

        let (m1, m2) = s.update(11.0, 3);
        // q = (2 - 1)/3; resid = -4/3; m1 = (1 + 16/9)/3 = 25/27
        // c = (2 + 1)/3 = 1; m2 = 25/27
        assert_relative_eq!(m1, 25.0 / 27.0, epsilon = 1e-12);
        assert_relative_eq!(m2, 25.0 / 27.0, epsilon = 1e-12);
        assert_eq!(s.prev_value(), 11.0);
    }

    #[test]
    fn erratic_scores_above_smooth() {
        let mut smooth = SmoothnessTracker::new(0.0);
        let mut erratic = SmoothnessTracker::new(0.0);
        for n in 1..=40u64 {
            smooth.update(n as f64, n);
            let jitter = if n % 2 == 0 { 5.0 } else { -5.0 };
            erratic.update(n as f64 + jitter, n);
        }
        assert!(erratic.m1() > smooth.m1());
        assert!(erratic.m2() > smooth.m2());
        assert!(smooth.m1() >= 0.0);
    }
}
