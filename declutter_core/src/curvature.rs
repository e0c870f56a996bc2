//! Three-point curvature window.
//!
//! Keeps the three most recent positions and reports the interior angle at
//! the middle one. `(lat, lon, alt)` is treated as a Cartesian triple; this is
//! a shape proxy, not a geodesic.

use nalgebra::Vector3;
use std::collections::VecDeque;

const WINDOW: usize = 3;

#[derive(Clone, Debug, Default)]
pub struct CurvatureWindow {
    points: VecDeque<Vector3<f64>>,
}

impl CurvatureWindow {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(WINDOW),
        }
    }

    /// Window already holding one position.
    pub fn seeded(point: [f64; 3]) -> Self {
        let mut w = Self::new();
        w.points.push_back(Vector3::from(point));
        w
    }

    /// Push a position, evicting the oldest once full. Returns the angle at
    /// the middle point when three positions are held and it is defined.
    pub fn push(&mut self, point: [f64; 3]) -> Option<f64> {
        if self.points.len() == WINDOW {
            self.points.pop_front();
        }
        self.points.push_back(Vector3::from(point));
        if self.points.len() < WINDOW {
            return None;
        }
        interior_angle(&self.points[0], &self.points[1], &self.points[2])
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Angle at `p2` of triangle (p1, p2, p3) by the law of cosines.
/// `None` when either side meeting at `p2` has zero length.
pub fn interior_angle(p1: &Vector3<f64>, p2: &Vector3<f64>, p3: &Vector3<f64>) -> Option<f64> {
    let a = (p1 - p2).norm();
    let b = (p2 - p3).norm();
    let c = (p1 - p3).norm();
    if a == 0.0 || b == 0.0 {
        return None;
    }
    let cos = ((a * a + b * b - c * c) / (2.0 * a * b)).clamp(-1.0, 1.0);
    Some(cos.acos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn straight_line_is_pi() {
        let mut w = CurvatureWindow::seeded([0.0, 0.0, 0.0]);
        assert_eq!(w.push([1.0, 1.0, 1.0]), None);
        let angle = w.push([2.0, 2.0, 2.0]).unwrap();
        assert_abs_diff_eq!(angle, PI, epsilon = 1e-6);
    }

    #[test]
    fn right_angle_is_half_pi() {
        let mut w = CurvatureWindow::new();
        w.push([1.0, 0.0, 0.0]);
        w.push([0.0, 0.0, 0.0]);
        let angle = w.push([0.0, 1.0, 0.0]).unwrap();
        assert_abs_diff_eq!(angle, FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn window_slides() {
        let mut w = CurvatureWindow::seeded([0.0, 0.0, 0.0]);
        w.push([1.0, 0.0, 0.0]);
        w.push([2.0, 0.0, 0.0]);
        // Now (1,0,0) (2,0,0) (2,1,0): right angle at (2,0,0)
        let angle = w.push([2.0, 1.0, 0.0]).unwrap();
        assert_abs_diff_eq!(angle, FRAC_PI_2, epsilon = 1e-9);
        // (2,0,0) (2,1,0) (1,2,0): 135 degrees at (2,1,0)
        let angle = w.push([1.0, 2.0, 0.0]).unwrap();
        assert_abs_diff_eq!(angle, PI - FRAC_PI_4, epsilon = 1e-9);
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn repeated_point_is_skipped() {
        let mut w = CurvatureWindow::seeded([0.0, 0.0, 0.0]);
        w.push([0.0, 0.0, 0.0]);
        assert_eq!(w.push([1.0, 0.0, 0.0]), None);
    }

    #[test]
    fn reversal_is_zero() {
        let mut w = CurvatureWindow::seeded([0.0, 0.0, 0.0]);
        w.push([1.0, 0.0, 0.0]);
        let angle = w.push([0.0, 0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(angle, 0.0, epsilon = 1e-6);
    }
}
