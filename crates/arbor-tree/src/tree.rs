use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::{
    TreeError,
    entropy::tally,
    node::{ClassDistribution, Node, NodeIndex},
    record::{Record, Value},
    schema::{Attribute, AttributeKind, DEFAULT_TARGET, Schema},
    split::{best_attribute, partition_categorical, partition_numeric},
};

/// Maximum depth of a tree (root is depth 0).
///
/// The builder recurses once per level. Every split hands each child a strict
/// subset of its parent's records, so a tree over `n` records never grows
/// deeper than `n - 1` whatever bound is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct MaxDepth(usize);

impl MaxDepth {
    /// The default depth bound.
    pub const DEFAULT: MaxDepth = MaxDepth(5);

    /// Create a depth bound.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self(depth)
    }

    /// Return the depth bound.
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for MaxDepth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for MaxDepth {
    type Error = TreeError;

    fn try_from(max_depth: i64) -> Result<Self, Self::Error> {
        usize::try_from(max_depth)
            .map(Self)
            .map_err(|_| TreeError::InvalidMaxDepth { max_depth })
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for a single ID3 decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter   | Default                      |
/// |-------------|------------------------------|
/// | `schema`    | [`Schema::bank_marketing`]   |
/// | `target`    | `"subscribed"`               |
/// | `max_depth` | 5                            |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) schema: Schema,
    pub(crate) target: String,
    pub(crate) max_depth: MaxDepth,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: Schema::bank_marketing(),
            target: DEFAULT_TARGET.to_string(),
            max_depth: MaxDepth::DEFAULT,
        }
    }

    /// Set the split-candidate attributes.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the boolean target attribute name.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the maximum tree depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: MaxDepth) -> Self {
        self.max_depth = max_depth;
        self
    }

    // --- Getters ---

    /// Return the split-candidate schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Return the target attribute name.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Return the maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> MaxDepth {
        self.max_depth
    }

    /// Validate the training records against the schema and build a tree.
    ///
    /// An empty training set is not an error: it produces the fallback leaf.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::MissingTarget`] | a record has no target value |
    /// | [`TreeError::NonBooleanTarget`] | a record's target is not a boolean |
    /// | [`TreeError::MissingAttribute`] | a record lacks a schema attribute |
    /// | [`TreeError::AttributeKindMismatch`] | a value does not match its attribute kind |
    #[instrument(skip(self, records), fields(n_records = records.len(), max_depth = self.max_depth.get()))]
    pub fn fit(&self, records: &[Record]) -> Result<DecisionTree, TreeError> {
        for (record_index, record) in records.iter().enumerate() {
            self.schema.validate(record, record_index, &self.target)?;
        }

        debug!(
            n_records = records.len(),
            n_attributes = self.schema.len(),
            target = %self.target,
            "fitting decision tree"
        );

        Ok(build(
            records,
            self.schema.attributes(),
            &self.target,
            self.max_depth,
        ))
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a tree by greedy recursive partitioning, without validating records.
///
/// Stopping rules, in order:
/// 1. no records: a fallback leaf predicting `false` with distribution `(1, 0)`
///    and zero samples;
/// 2. all records share one target value, no attributes remain, or the depth
///    bound is reached: a majority-class leaf;
/// 3. the best information gain is not positive: a majority-class leaf.
///
/// Numeric attributes stay available below their split; a categorical
/// attribute is removed from its subtrees.
pub fn build<R: Borrow<Record>>(
    records: &[R],
    attributes: &[Attribute],
    target: &str,
    max_depth: MaxDepth,
) -> DecisionTree {
    let records: Vec<&Record> = records.iter().map(|r| r.borrow()).collect();
    let mut builder = Builder {
        target,
        max_depth: max_depth.get(),
        arena: Vec::new(),
    };
    let root = builder.grow(&records, attributes, 0);
    let tree = DecisionTree {
        nodes: builder.arena,
        target: target.to_string(),
        max_depth,
    };

    debug!(
        root_index = root.index(),
        n_nodes = tree.n_nodes(),
        depth = tree.depth(),
        "decision tree built"
    );

    tree
}

/// The most frequent target value is `true`.
///
/// Ties go to the value that appears first in `records`. An empty slice gives
/// `false`.
#[must_use]
pub fn majority_class<R: Borrow<Record>>(records: &[R], target: &str) -> bool {
    let mut top: Option<(Option<&Value>, usize)> = None;
    for (value, count) in tally(records, target) {
        if top.is_none_or(|(_, best)| count > best) {
            top = Some((value, count));
        }
    }
    matches!(top, Some((Some(Value::Bool(true)), _)))
}

/// Count falsy and truthy target values. A missing target counts as falsy.
#[must_use]
pub fn class_distribution<R: Borrow<Record>>(records: &[R], target: &str) -> ClassDistribution {
    let mut distribution = ClassDistribution::default();
    for record in records {
        if record.borrow().get(target).is_some_and(Value::is_truthy) {
            distribution.true_count += 1;
        } else {
            distribution.false_count += 1;
        }
    }
    distribution
}

struct Builder<'t> {
    target: &'t str,
    max_depth: usize,
    arena: Vec<Node>,
}

impl Builder<'_> {
    fn push(&mut self, node: Node) -> NodeIndex {
        let idx = self.arena.len();
        self.arena.push(node);
        NodeIndex::new(idx)
    }

    fn leaf(&mut self, records: &[&Record], depth: usize) -> NodeIndex {
        self.push(Node::Leaf {
            prediction: majority_class(records, self.target),
            n_samples: records.len(),
            distribution: class_distribution(records, self.target),
            depth,
        })
    }

    fn grow(&mut self, records: &[&Record], attributes: &[Attribute], depth: usize) -> NodeIndex {
        let Some(first) = records.first() else {
            return self.push(Node::Leaf {
                prediction: false,
                n_samples: 0,
                distribution: ClassDistribution::new(1, 0),
                depth,
            });
        };

        let first_label = first.get(self.target);
        let pure = records.iter().all(|r| r.get(self.target) == first_label);
        if pure || attributes.is_empty() || depth >= self.max_depth {
            return self.leaf(records, depth);
        }

        let Some(best) = best_attribute(records, attributes, self.target) else {
            return self.leaf(records, depth);
        };
        if best.gain <= 0.0 {
            return self.leaf(records, depth);
        }

        let n_samples = records.len();
        let distribution = class_distribution(records, self.target);
        let attribute = best.attribute.name.clone();

        match (best.attribute.kind, best.threshold) {
            (AttributeKind::Numeric, Some(threshold)) => {
                // Arena pattern: reserve index, recurse, then overwrite with the split.
                let node_idx = self.leaf(records, depth);
                let (left, right) = partition_numeric(records, &attribute, threshold);
                let left = self.grow(&left, attributes, depth + 1);
                let right = self.grow(&right, attributes, depth + 1);
                self.arena[node_idx.index()] = Node::NumericSplit {
                    attribute,
                    threshold,
                    gain: best.gain,
                    n_samples,
                    distribution,
                    depth,
                    left,
                    right,
                };
                node_idx
            }
            (AttributeKind::Categorical, _) => {
                let node_idx = self.leaf(records, depth);
                let remaining: Vec<Attribute> = attributes
                    .iter()
                    .filter(|a| a.name != attribute)
                    .cloned()
                    .collect();
                let mut children = BTreeMap::new();
                for (value, subset) in partition_categorical(records, &attribute) {
                    // Records without a value get no branch.
                    let Some(value) = value else { continue };
                    if subset.is_empty() {
                        continue;
                    }
                    let child = self.grow(&subset, &remaining, depth + 1);
                    children.insert(value.to_string(), child);
                }
                self.arena[node_idx.index()] = Node::CategoricalSplit {
                    attribute,
                    gain: best.gain,
                    n_samples,
                    distribution,
                    depth,
                    children,
                };
                node_idx
            }
            (AttributeKind::Numeric, None) => self.leaf(records, depth),
        }
    }
}

/// A fitted ID3 decision tree.
///
/// Stored as an arena-based `Vec<Node>` with the root at index 0. A tree is
/// never modified after it is built.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) target: String,
    pub(crate) max_depth: MaxDepth,
}

impl DecisionTree {
    /// Predict the target for a single record.
    ///
    /// Numeric nodes go left when `record[attribute] <= threshold`. A
    /// categorical node follows the branch named by the record's value. A
    /// value of the wrong kind, an unseen category, or a dangling child all
    /// resolve to `false`.
    #[must_use]
    pub fn predict(&self, record: &Record) -> bool {
        let mut idx = 0usize;
        loop {
            let Some(node) = self.nodes.get(idx) else {
                return false;
            };
            match node {
                Node::Leaf { prediction, .. } => return *prediction,
                Node::NumericSplit {
                    attribute,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let Some(value) = record.numeric(attribute) else {
                        return false;
                    };
                    idx = if value <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
                Node::CategoricalSplit {
                    attribute,
                    children,
                    ..
                } => {
                    let Some(child) = record.category(attribute).and_then(|v| children.get(v))
                    else {
                        return false;
                    };
                    idx = child.index();
                }
            }
        }
    }

    /// Predict targets for a batch of records in parallel, preserving order.
    #[must_use]
    pub fn predict_batch(&self, records: &[Record]) -> Vec<bool> {
        records
            .into_par_iter()
            .map(|record| self.predict(record))
            .collect()
    }

    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Return the node at `index`, if it exists.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.index())
    }

    /// Return every node in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the target attribute this tree predicts.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Return the depth bound this tree was built with.
    #[must_use]
    pub fn max_depth(&self) -> MaxDepth {
        self.max_depth
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(Node::depth).max().unwrap_or(0)
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, idx: NodeIndex, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        let Some(node) = self.node(idx) else {
            return writeln!(f, "{pad}<missing node {idx}>");
        };
        match node {
            Node::Leaf {
                prediction,
                n_samples,
                distribution,
                ..
            } => writeln!(f, "{pad}predict {prediction} (n={n_samples}, {distribution})"),
            Node::NumericSplit {
                attribute,
                threshold,
                gain,
                n_samples,
                distribution,
                left,
                right,
                ..
            } => {
                writeln!(f, "{pad}{attribute} (gain={gain:.4}, n={n_samples}, {distribution})")?;
                writeln!(f, "{pad}  <= {threshold}:")?;
                self.fmt_node(f, *left, indent + 2)?;
                writeln!(f, "{pad}  > {threshold}:")?;
                self.fmt_node(f, *right, indent + 2)
            }
            Node::CategoricalSplit {
                attribute,
                gain,
                n_samples,
                distribution,
                children,
                ..
            } => {
                writeln!(f, "{pad}{attribute} (gain={gain:.4}, n={n_samples}, {distribution})")?;
                for (value, child) in children {
                    writeln!(f, "{pad}  = {value}:")?;
                    self.fmt_node(f, *child, indent + 2)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, NodeIndex::new(0), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(points: &[(f64, bool)]) -> Vec<Record> {
        points
            .iter()
            .map(|&(x, y)| Record::new().with("x", x).with("y", y))
            .collect()
    }

    fn x_config() -> DecisionTreeConfig {
        DecisionTreeConfig::new()
            .with_schema(Schema::new(vec![Attribute::numeric("x")]))
            .with_target("y")
    }

    fn assert_invariants(tree: &DecisionTree) {
        for node in tree.nodes() {
            assert!(node.depth() <= tree.max_depth().get());
            if let Some(gain) = node.gain() {
                assert!(gain > 0.0, "split with non-positive gain {gain}");
            }
            if node.n_samples() > 0 {
                assert_eq!(node.distribution().total(), node.n_samples());
            }
        }
    }

    #[test]
    fn empty_training_set_fallback_leaf() {
        let tree = x_config().fit(&[]).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(
            tree.root(),
            &Node::Leaf {
                prediction: false,
                n_samples: 0,
                distribution: ClassDistribution::new(1, 0),
                depth: 0,
            }
        );
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let records = xy(&[(1.0, true), (2.0, true), (3.0, true)]);
        for max_depth in [0, 1, 5] {
            let tree = x_config()
                .with_max_depth(MaxDepth::new(max_depth))
                .fit(&records)
                .unwrap();
            assert_eq!(tree.n_nodes(), 1);
            assert!(matches!(
                tree.root(),
                Node::Leaf { prediction: true, n_samples: 3, .. }
            ));
        }
    }

    #[test]
    fn perfect_numeric_split() {
        let records = xy(&[(1.0, false), (2.0, false), (3.0, true), (4.0, true)]);
        let tree = x_config().fit(&records).unwrap();
        match tree.root() {
            Node::NumericSplit {
                threshold, gain, ..
            } => {
                assert_eq!(*threshold, 2.5);
                assert!((gain - 1.0).abs() < f64::EPSILON);
            }
            other => panic!("expected numeric split, got {other:?}"),
        }
        assert_eq!(tree.n_leaves(), 2);
        assert!(!tree.predict(&Record::new().with("x", 2.0)));
        assert!(tree.predict(&Record::new().with("x", 3.0)));
        assert_invariants(&tree);
    }

    #[test]
    fn numeric_attribute_is_reused_below_split() {
        // Needs two thresholds on x: F F T T F F
        let records = xy(&[
            (1.0, false),
            (2.0, false),
            (3.0, true),
            (4.0, true),
            (5.0, false),
            (6.0, false),
        ]);
        let tree = x_config().fit(&records).unwrap();
        assert!(tree.depth() >= 2);
        for r in &records {
            assert_eq!(tree.predict(r), r.label("y").unwrap());
        }
        assert_invariants(&tree);
    }

    #[test]
    fn categorical_attribute_is_consumed() {
        let schema = Schema::new(vec![Attribute::categorical("c")]);
        let records: Vec<Record> = [("a", true), ("a", false), ("b", false), ("b", false)]
            .iter()
            .map(|&(c, y)| Record::new().with("c", c).with("y", y))
            .collect();
        let tree = DecisionTreeConfig::new()
            .with_schema(schema)
            .with_target("y")
            .fit(&records)
            .unwrap();
        let Node::CategoricalSplit { children, .. } = tree.root() else {
            panic!("expected categorical root");
        };
        assert_eq!(children.len(), 2);
        // "a" is impure but "c" is used up, so it becomes a leaf.
        let a = tree.node(children["a"]).unwrap();
        assert!(a.is_leaf());
        assert_eq!(a.distribution(), ClassDistribution::new(1, 1));
        assert_invariants(&tree);
    }

    #[test]
    fn unseen_category_predicts_false() {
        let schema = Schema::new(vec![Attribute::categorical("c")]);
        let records: Vec<Record> = [("a", true), ("b", false)]
            .iter()
            .map(|&(c, y)| Record::new().with("c", c).with("y", y))
            .collect();
        let tree = DecisionTreeConfig::new()
            .with_schema(schema)
            .with_target("y")
            .fit(&records)
            .unwrap();
        assert!(tree.predict(&Record::new().with("c", "a")));
        assert!(!tree.predict(&Record::new().with("c", "zzz")));
    }

    #[test]
    fn type_mismatch_predicts_false() {
        let records = xy(&[(1.0, true), (2.0, false)]);
        let tree = x_config().fit(&records).unwrap();
        // Left leaf predicts true, but a string value cannot be compared.
        assert!(tree.predict(&Record::new().with("x", 0.0)));
        assert!(!tree.predict(&Record::new().with("x", "0.0")));
        assert!(!tree.predict(&Record::new()));
    }

    #[test]
    fn max_depth_limits_tree() {
        let records = xy(&[
            (1.0, false),
            (2.0, true),
            (3.0, false),
            (4.0, true),
            (5.0, false),
            (6.0, true),
        ]);
        for max_depth in 0..4 {
            let tree = x_config()
                .with_max_depth(MaxDepth::new(max_depth))
                .fit(&records)
                .unwrap();
            assert!(tree.depth() <= max_depth);
            assert_invariants(&tree);
        }
    }

    #[test]
    fn zero_gain_becomes_leaf() {
        // Identical x values: no usable threshold.
        let records = xy(&[(1.0, true), (1.0, false), (1.0, true)]);
        let tree = x_config().fit(&records).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert!(matches!(tree.root(), Node::Leaf { prediction: true, .. }));
    }

    #[test]
    fn no_attributes_becomes_leaf() {
        let records = xy(&[(1.0, false), (2.0, true), (3.0, false)]);
        let tree = build(&records, &[], "y", MaxDepth::DEFAULT);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.root().distribution(), ClassDistribution::new(2, 1));
        assert!(!tree.predict(&records[1]));
    }

    #[test]
    fn majority_tie_goes_to_first_seen() {
        let records = xy(&[(1.0, true), (2.0, false)]);
        assert!(majority_class(&records, "y"));
        let records = xy(&[(1.0, false), (2.0, true)]);
        assert!(!majority_class(&records, "y"));
        let empty: Vec<Record> = vec![];
        assert!(!majority_class(&empty, "y"));
    }

    #[test]
    fn distribution_counts_truthiness() {
        let records = vec![
            Record::new().with("y", true),
            Record::new().with("y", false),
            Record::new(),
        ];
        assert_eq!(class_distribution(&records, "y"), ClassDistribution::new(2, 1));
    }

    #[test]
    fn invalid_max_depth_error() {
        let err = MaxDepth::try_from(-1).unwrap_err();
        assert!(matches!(err, TreeError::InvalidMaxDepth { max_depth: -1 }));
        assert_eq!(MaxDepth::try_from(7).unwrap().get(), 7);
    }

    #[test]
    fn fit_rejects_missing_target() {
        let records = vec![Record::new().with("x", 1.0)];
        let err = x_config().fit(&records).unwrap_err();
        assert!(matches!(err, TreeError::MissingTarget { record_index: 0, .. }));
    }

    #[test]
    fn fit_rejects_wrong_attribute_kind() {
        let records = vec![Record::new().with("x", "a").with("y", true)];
        let err = x_config().fit(&records).unwrap_err();
        assert!(matches!(err, TreeError::AttributeKindMismatch { .. }));
    }

    #[test]
    fn predict_batch_matches_predict() {
        let records = xy(&[(1.0, false), (2.0, false), (3.0, true), (4.0, true)]);
        let tree = x_config().fit(&records).unwrap();
        let batch = tree.predict_batch(&records);
        let single: Vec<bool> = records.iter().map(|r| tree.predict(r)).collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn deterministic_builds() {
        let records = xy(&[(3.0, true), (1.0, false), (2.0, true), (5.0, false), (4.0, true)]);
        let a = x_config().fit(&records).unwrap();
        let b = x_config().fit(&records).unwrap();
        assert_eq!(a.nodes(), b.nodes());
    }

    #[test]
    fn display_renders_branches() {
        let records = xy(&[(1.0, false), (2.0, false), (3.0, true), (4.0, true)]);
        let tree = x_config().fit(&records).unwrap();
        let text = tree.to_string();
        assert!(text.starts_with("x (gain=1.0000, n=4, [2, 2])"));
        assert!(text.contains("<= 2.5:"));
        assert!(text.contains("> 2.5:"));
        assert!(text.contains("predict true (n=2, [0, 2])"));
    }

    #[test]
    fn fit_rejects_non_finite_numeric() {
        let records = xy(&[(1.0, false), (f64::NAN, true)]);
        let err = x_config().fit(&records).unwrap_err();
        assert!(matches!(err, TreeError::AttributeKindMismatch { record_index: 1, .. }));
    }

    #[test]
    fn depth_bounded_by_record_count() {
        let points: Vec<(f64, bool)> = (0..12).map(|i| (i as f64, i % 2 == 0)).collect();
        let records = xy(&points);
        let tree = x_config()
            .with_max_depth(MaxDepth::new(10_000))
            .fit(&records)
            .unwrap();

        assert!(tree.depth() < records.len());
        for node in tree.nodes() {
            for child in node.children() {
                assert!(tree.node(child).unwrap().n_samples() < node.n_samples());
            }
        }
        for r in &records {
            assert_eq!(tree.predict(r), r.label("y").unwrap());
        }
    }
}
