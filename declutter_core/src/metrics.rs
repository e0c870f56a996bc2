//! Classification metrics: confusion counts, accuracy, precision/recall.
//!
//! `Drone` is the positive class.

use crate::classifier::Label;
use serde::{Deserialize, Serialize};

/// Accumulated confusion-matrix counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    /// Drones labelled Drone
    pub true_positives: u64,
    /// Birds labelled Drone
    pub false_positives: u64,
    /// Birds labelled Bird
    pub true_negatives: u64,
    /// Drones labelled Bird
    pub false_negatives: u64,
}

impl ClassificationMetrics {
    /// Accumulate one (predicted, actual) pair.
    pub fn accumulate(&mut self, predicted: Label, actual: Label) {
        match (predicted, actual) {
            (Label::Drone, Label::Drone) => self.true_positives += 1,
            (Label::Drone, Label::Bird) => self.false_positives += 1,
            (Label::Bird, Label::Bird) => self.true_negatives += 1,
            (Label::Bird, Label::Drone) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// (TP + TN) / total; 0 with no samples.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_positives + self.true_negatives) as f64 / total as f64
    }

    /// Precision = TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denom = (self.true_positives + self.false_positives) as f64;
        if denom == 0.0 { 1.0 } else { self.true_positives as f64 / denom }
    }

    /// Recall = TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denom = (self.true_positives + self.false_negatives) as f64;
        if denom == 0.0 { 1.0 } else { self.true_positives as f64 / denom }
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn counts_and_ratios() {
        let mut m = ClassificationMetrics::default();
        m.accumulate(Label::Drone, Label::Drone);
        m.accumulate(Label::Drone, Label::Drone);
        m.accumulate(Label::Drone, Label::Bird);
        m.accumulate(Label::Bird, Label::Bird);
        m.accumulate(Label::Bird, Label::Drone);

        assert_eq!(m.total(), 5);
        assert_relative_eq!(m.accuracy(), 0.6);
        assert_relative_eq!(m.precision(), 2.0 / 3.0);
        assert_relative_eq!(m.recall(), 2.0 / 3.0);
        assert_relative_eq!(m.f1(), 2.0 / 3.0);
    }

    #[test]
    fn empty_metrics_are_defined() {
        let m = ClassificationMetrics::default();
        assert_eq!(m.accuracy(), 0.0);
        assert_eq!(m.precision(), 1.0);
        assert_eq!(m.recall(), 1.0);
    }
}
