//! End-to-end training entry points.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::error::TreeError;
use crate::eval::evaluate;
use crate::record::Record;
use crate::result::TrainingResult;
use crate::tree::{DecisionTree, DecisionTreeConfig, MaxDepth};

/// Fit a tree on `training` with the bank-marketing schema, then evaluate
/// it on `test`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::InvalidMaxDepth`] | `max_depth` is negative |
/// | [`TreeError::EmptyTestSet`] | `test` is empty |
/// | [`TreeError::MissingTarget`] | a record has no `target` value |
/// | [`TreeError::NonBooleanTarget`] | a record's `target` is not a boolean |
/// | [`TreeError::MissingAttribute`] | a training record lacks a schema attribute |
/// | [`TreeError::AttributeKindMismatch`] | a training value does not match its attribute kind |
#[instrument(skip(training, test), fields(n_training = training.len(), n_test = test.len()))]
pub fn train(
    training: &[Record],
    test: &[Record],
    target: &str,
    max_depth: i64,
) -> Result<TrainingResult, TreeError> {
    let max_depth = MaxDepth::try_from(max_depth)?;
    let config = DecisionTreeConfig::new()
        .with_target(target)
        .with_max_depth(max_depth);
    train_with(&config, training, test)
}

/// Fit a tree with an explicit config, then evaluate it on `test`.
///
/// # Errors
///
/// Same as [`train`], minus [`TreeError::InvalidMaxDepth`].
pub fn train_with(
    config: &DecisionTreeConfig,
    training: &[Record],
    test: &[Record],
) -> Result<TrainingResult, TreeError> {
    let tree = config.fit(training)?;
    let metrics = evaluate(&tree, test, config.target())?;

    info!(
        n_nodes = tree.n_nodes(),
        depth = tree.depth(),
        accuracy = metrics.accuracy,
        "training complete"
    );

    Ok(TrainingResult::new(tree, metrics, training.len(), test.len()))
}

/// Predict the target for one record.
#[must_use]
pub fn predict_one(tree: &DecisionTree, record: &Record) -> bool {
    tree.predict(record)
}

/// Shuffle `records` and split them into `(training, test)`.
///
/// The training part holds `floor(len · training_ratio)` records.
///
/// # Errors
///
/// Returns [`TreeError::InvalidTrainingRatio`] unless `0 < training_ratio < 1`.
pub fn train_test_split(
    records: &[Record],
    training_ratio: f64,
    seed: u64,
) -> Result<(Vec<Record>, Vec<Record>), TreeError> {
    if !(training_ratio > 0.0 && training_ratio < 1.0) {
        return Err(TreeError::InvalidTrainingRatio {
            ratio: training_ratio,
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut shuffled = records.to_vec();
    shuffled.shuffle(&mut rng);

    let n_training = (records.len() as f64 * training_ratio).floor() as usize;
    let test = shuffled.split_off(n_training);
    Ok((shuffled, test))
}
