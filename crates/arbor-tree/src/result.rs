//! Training result types.

use crate::eval::Metrics;
use crate::tree::DecisionTree;

/// Metadata about the training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TrainingMetadata {
    /// Number of training records.
    pub n_training: usize,
    /// Number of held-out test records.
    pub n_test: usize,
    /// Total nodes in the fitted tree.
    pub n_nodes: usize,
    /// Leaf nodes in the fitted tree.
    pub n_leaves: usize,
    /// Actual depth reached.
    pub depth: usize,
    /// Configured depth bound.
    pub max_depth: usize,
}

/// Result of training and evaluating a decision tree.
#[derive(Debug, Clone)]
pub struct TrainingResult {
    tree: DecisionTree,
    metrics: Metrics,
    metadata: TrainingMetadata,
}

impl TrainingResult {
    /// Create a new training result.
    pub(crate) fn new(tree: DecisionTree, metrics: Metrics, n_training: usize, n_test: usize) -> Self {
        let metadata = TrainingMetadata {
            n_training,
            n_test,
            n_nodes: tree.n_nodes(),
            n_leaves: tree.n_leaves(),
            depth: tree.depth(),
            max_depth: tree.max_depth().get(),
        };
        Self {
            tree,
            metrics,
            metadata,
        }
    }

    /// Borrow the fitted tree.
    #[must_use]
    pub fn tree(&self) -> &DecisionTree {
        &self.tree
    }

    /// Return the held-out metrics.
    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Return training metadata.
    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }

    /// Consume the result and return the tree and its metrics.
    #[must_use]
    pub fn into_parts(self) -> (DecisionTree, Metrics) {
        (self.tree, self.metrics)
    }
}
