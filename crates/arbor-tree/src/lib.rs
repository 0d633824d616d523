//! ID3 decision tree classification: train, evaluate, predict.
//!
//! Builds a binary classifier over tabular records by greedy recursive
//! partitioning on information gain. Numeric attributes split on the best
//! midpoint threshold; categorical attributes split one branch per observed
//! value. Fitted trees live in an index arena and predict with a plain loop.

mod confusion;
mod entropy;
mod error;
mod eval;
mod node;
mod record;
mod result;
mod schema;
mod split;
mod train;
mod tree;

pub use confusion::ConfusionMatrix;
pub use entropy::entropy;
pub use error::TreeError;
pub use eval::{Metrics, evaluate};
pub use node::{ClassDistribution, Node, NodeIndex};
pub use record::{Record, Value};
pub use result::{TrainingMetadata, TrainingResult};
pub use schema::{Attribute, AttributeKind, DEFAULT_TARGET, Schema};
pub use split::{SplitGain, information_gain};
pub use train::{predict_one, train, train_test_split, train_with};
pub use tree::{DecisionTree, DecisionTreeConfig, MaxDepth, build, class_distribution, majority_class};
