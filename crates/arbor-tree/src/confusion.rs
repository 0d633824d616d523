//! Binary confusion matrix.

use std::fmt;

use crate::error::TreeError;

/// A 2×2 confusion matrix for a boolean classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ConfusionMatrix {
    /// Actual `true`, predicted `true`.
    pub true_positives: usize,
    /// Actual `false`, predicted `true`.
    pub false_positives: usize,
    /// Actual `false`, predicted `false`.
    pub true_negatives: usize,
    /// Actual `true`, predicted `false`.
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from paired actual and predicted outcomes.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyTestSet`] | Zero outcomes provided |
    pub fn from_outcomes(actual: &[bool], predicted: &[bool]) -> Result<Self, TreeError> {
        if actual.is_empty() {
            return Err(TreeError::EmptyTestSet);
        }
        let mut matrix = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            matrix.record(a, p);
        }
        Ok(matrix)
    }

    /// Tally one `(actual, predicted)` pair.
    pub fn record(&mut self, actual: bool, predicted: bool) {
        match (actual, predicted) {
            (true, true) => self.true_positives += 1,
            (false, true) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (true, false) => self.false_negatives += 1,
        }
    }

    /// Total number of tallied outcomes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Proportion of correct predictions; `None` when the matrix is empty.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some((self.true_positives + self.true_negatives) as f64 / total as f64)
    }

    /// TP / (TP + FP), or 0.0 when nothing was predicted `true`.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN), or 0.0 when nothing was actually `true`.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall, or 0.0 when both are zero.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>10} {:>10}", "", "pred_true", "pred_false")?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10}",
            "actual_true", self.true_positives, self.false_negatives
        )?;
        writeln!(
            f,
            "{:>12} {:>10} {:>10}",
            "actual_false", self.false_positives, self.true_negatives
        )
    }
}
