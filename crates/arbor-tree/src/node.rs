use std::collections::BTreeMap;
use std::fmt;

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Count of `false` and `true` target values among the records reaching a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct ClassDistribution {
    /// Records whose target is falsy.
    pub false_count: usize,
    /// Records whose target is truthy.
    pub true_count: usize,
}

impl ClassDistribution {
    /// Create a distribution from explicit counts.
    #[must_use]
    pub fn new(false_count: usize, true_count: usize) -> Self {
        Self {
            false_count,
            true_count,
        }
    }

    /// Return `false_count + true_count`.
    #[must_use]
    pub fn total(&self) -> usize {
        self.false_count + self.true_count
    }
}

impl fmt::Display for ClassDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.false_count, self.true_count)
    }
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`] rather than pointers.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// A terminal leaf node.
    Leaf {
        /// Predicted target value.
        prediction: bool,
        /// Number of training records in this leaf.
        n_samples: usize,
        /// Target counts of those records.
        distribution: ClassDistribution,
        /// Distance from the root (root is 0).
        depth: usize,
    },
    /// A binary split on a numeric attribute.
    NumericSplit {
        /// Attribute tested at this node.
        attribute: String,
        /// Records with `value <= threshold` go left.
        threshold: f64,
        /// Information gain of this split (always > 0).
        gain: f64,
        /// Number of training records that reached this node.
        n_samples: usize,
        /// Target counts of those records.
        distribution: ClassDistribution,
        /// Distance from the root (root is 0).
        depth: usize,
        /// Index of the `<=` child.
        left: NodeIndex,
        /// Index of the `>` child.
        right: NodeIndex,
    },
    /// A multi-way split on a categorical attribute.
    CategoricalSplit {
        /// Attribute tested at this node.
        attribute: String,
        /// Information gain of this split (always > 0).
        gain: f64,
        /// Number of training records that reached this node.
        n_samples: usize,
        /// Target counts of those records.
        distribution: ClassDistribution,
        /// Distance from the root (root is 0).
        depth: usize,
        /// One child per value observed among this node's records.
        children: BTreeMap<String, NodeIndex>,
    },
}

impl Node {
    /// Return the number of training records that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Leaf { n_samples, .. }
            | Node::NumericSplit { n_samples, .. }
            | Node::CategoricalSplit { n_samples, .. } => *n_samples,
        }
    }

    /// Return the target distribution of the records that reached this node.
    #[must_use]
    pub fn distribution(&self) -> ClassDistribution {
        match self {
            Node::Leaf { distribution, .. }
            | Node::NumericSplit { distribution, .. }
            | Node::CategoricalSplit { distribution, .. } => *distribution,
        }
    }

    /// Return the depth of this node.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { depth, .. }
            | Node::NumericSplit { depth, .. }
            | Node::CategoricalSplit { depth, .. } => *depth,
        }
    }

    /// Return the split attribute, or `None` for a leaf.
    #[must_use]
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Node::Leaf { .. } => None,
            Node::NumericSplit { attribute, .. } | Node::CategoricalSplit { attribute, .. } => {
                Some(attribute)
            }
        }
    }

    /// Return the split gain, or `None` for a leaf.
    #[must_use]
    pub fn gain(&self) -> Option<f64> {
        match self {
            Node::Leaf { .. } => None,
            Node::NumericSplit { gain, .. } | Node::CategoricalSplit { gain, .. } => Some(*gain),
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Return the child indices of this node, in branch order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeIndex> {
        match self {
            Node::Leaf { .. } => vec![],
            Node::NumericSplit { left, right, .. } => vec![*left, *right],
            Node::CategoricalSplit { children, .. } => children.values().copied().collect(),
        }
    }
}
