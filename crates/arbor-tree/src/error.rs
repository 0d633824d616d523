use crate::schema::AttributeKind;

/// Errors from decision tree training and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when a negative maximum depth is requested.
    #[error("max_depth must be non-negative, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: i64,
    },

    /// Returned when metrics are requested over zero test records.
    #[error("cannot evaluate a tree on an empty test set")]
    EmptyTestSet,

    /// Returned when a record has no value for the target attribute.
    #[error("record {record_index} has no value for target attribute \"{target}\"")]
    MissingTarget {
        /// The zero-based index of the offending record.
        record_index: usize,
        /// Name of the target attribute.
        target: String,
    },

    /// Returned when a record's target value is not a boolean.
    #[error("record {record_index} has a non-boolean value for target attribute \"{target}\"")]
    NonBooleanTarget {
        /// The zero-based index of the offending record.
        record_index: usize,
        /// Name of the target attribute.
        target: String,
    },

    /// Returned when a training record lacks a schema attribute.
    #[error("record {record_index} has no value for attribute \"{attribute}\"")]
    MissingAttribute {
        /// The zero-based index of the offending record.
        record_index: usize,
        /// Name of the missing attribute.
        attribute: String,
    },

    /// Returned when a training value does not match the attribute kind, or a
    /// numeric value is not finite.
    #[error("record {record_index}: attribute \"{attribute}\" must be a valid {expected} value")]
    AttributeKindMismatch {
        /// The zero-based index of the offending record.
        record_index: usize,
        /// Name of the attribute.
        attribute: String,
        /// The kind declared by the schema.
        expected: AttributeKind,
    },

    /// Returned when the train/test ratio is not in (0.0, 1.0).
    #[error("training_ratio must be in (0.0, 1.0), got {ratio}")]
    InvalidTrainingRatio {
        /// The invalid ratio provided.
        ratio: f64,
    },
}
