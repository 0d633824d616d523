//! Held-out evaluation of a fitted tree.

use std::fmt;

use tracing::{info, instrument};

use crate::confusion::ConfusionMatrix;
use crate::error::TreeError;
use crate::record::Record;
use crate::schema::validate_target;
use crate::tree::DecisionTree;

/// Aggregate classification metrics over a test set.
///
/// All rates are in `[0, 1]`. Precision, recall, and F1 are defined as 0.0
/// when their denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Metrics {
    /// (TP + TN) / total.
    pub accuracy: f64,
    /// TP / (TP + FP).
    pub precision: f64,
    /// TP / (TP + FN).
    pub recall: f64,
    /// 2 · precision · recall / (precision + recall).
    pub f1: f64,
    /// The underlying outcome counts.
    pub confusion_matrix: ConfusionMatrix,
}

impl Metrics {
    /// Derive metrics from a confusion matrix.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyTestSet`] when the matrix has no outcomes.
    pub fn from_confusion(confusion_matrix: ConfusionMatrix) -> Result<Self, TreeError> {
        let accuracy = confusion_matrix.accuracy().ok_or(TreeError::EmptyTestSet)?;
        Ok(Self {
            accuracy,
            precision: confusion_matrix.precision(),
            recall: confusion_matrix.recall(),
            f1: confusion_matrix.f1(),
            confusion_matrix,
        })
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "accuracy  {:.4}", self.accuracy)?;
        writeln!(f, "precision {:.4}", self.precision)?;
        writeln!(f, "recall    {:.4}", self.recall)?;
        writeln!(f, "f1        {:.4}", self.f1)?;
        write!(f, "{}", self.confusion_matrix)
    }
}

/// Predict every test record and score the predictions against `target`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::EmptyTestSet`] | `test_records` is empty |
/// | [`TreeError::MissingTarget`] | a test record has no target value |
/// | [`TreeError::NonBooleanTarget`] | a test record's target is not a boolean |
#[instrument(skip_all, fields(n_test = test_records.len(), target = %target))]
pub fn evaluate(
    tree: &DecisionTree,
    test_records: &[Record],
    target: &str,
) -> Result<Metrics, TreeError> {
    if test_records.is_empty() {
        return Err(TreeError::EmptyTestSet);
    }

    let actual = test_records
        .iter()
        .enumerate()
        .map(|(record_index, record)| validate_target(record, record_index, target))
        .collect::<Result<Vec<bool>, TreeError>>()?;
    let predicted = tree.predict_batch(test_records);

    let confusion_matrix = ConfusionMatrix::from_outcomes(&actual, &predicted)?;
    let metrics = Metrics::from_confusion(confusion_matrix)?;

    info!(
        accuracy = metrics.accuracy,
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        "evaluation complete"
    );

    Ok(metrics)
}
