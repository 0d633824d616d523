//! Attribute schema: which record attributes are split candidates, and how.

use std::fmt;

use crate::error::TreeError;
use crate::record::{Record, Value};

/// Name of the boolean target attribute in the bank-marketing schema.
pub const DEFAULT_TARGET: &str = "subscribed";

/// How an attribute is split on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Split by a `<=` threshold.
    Numeric,
    /// Split into one branch per observed value.
    Categorical,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Numeric => f.write_str("numeric"),
            AttributeKind::Categorical => f.write_str("categorical"),
        }
    }
}

/// A single split-candidate attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Attribute {
    /// Attribute name, as used for record lookup.
    pub name: String,
    /// Split strategy for this attribute.
    pub kind: AttributeKind,
}

impl Attribute {
    /// Create a numeric attribute.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Create a categorical attribute.
    #[must_use]
    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttributeKind::Categorical,
        }
    }

    /// Return `true` if `value` has the shape this attribute expects.
    ///
    /// Numeric attributes accept finite numbers only.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self.kind, value) {
            (AttributeKind::Numeric, Value::Numeric(v)) => v.is_finite(),
            (AttributeKind::Categorical, Value::Categorical(_)) => true,
            _ => false,
        }
    }
}

/// An ordered list of split-candidate attributes.
///
/// Order matters: when two attributes yield the same information gain, the
/// one listed first wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    /// Create a schema from an ordered attribute list.
    #[must_use]
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    /// The bank-marketing campaign schema.
    ///
    /// The target (`subscribed`) is not part of the schema.
    #[must_use]
    pub fn bank_marketing() -> Self {
        Self::new(vec![
            Attribute::numeric("age"),
            Attribute::categorical("job"),
            Attribute::categorical("marital"),
            Attribute::categorical("education"),
            Attribute::categorical("default"),
            Attribute::numeric("balance"),
            Attribute::categorical("housing"),
            Attribute::categorical("loan"),
            Attribute::categorical("contact"),
            Attribute::numeric("day"),
            Attribute::categorical("month"),
            Attribute::numeric("duration"),
            Attribute::numeric("campaign"),
            Attribute::numeric("pdays"),
            Attribute::numeric("previous"),
            Attribute::categorical("poutcome"),
        ])
    }

    /// Return the attributes in schema order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Return the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Return `true` if the schema has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Check that a training record carries every schema attribute with the
    /// right kind, and a boolean `target`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::MissingTarget`] | no value for `target` |
    /// | [`TreeError::NonBooleanTarget`] | `target` value is not a `Bool` |
    /// | [`TreeError::MissingAttribute`] | a schema attribute is absent |
    /// | [`TreeError::AttributeKindMismatch`] | a value does not match its attribute kind |
    pub fn validate(&self, record: &Record, record_index: usize, target: &str) -> Result<(), TreeError> {
        validate_target(record, record_index, target)?;
        for attribute in &self.attributes {
            let value = record
                .get(&attribute.name)
                .ok_or_else(|| TreeError::MissingAttribute {
                    record_index,
                    attribute: attribute.name.clone(),
                })?;
            if !attribute.accepts(value) {
                return Err(TreeError::AttributeKindMismatch {
                    record_index,
                    attribute: attribute.name.clone(),
                    expected: attribute.kind,
                });
            }
        }
        Ok(())
    }
}

/// Read the boolean target of a record.
///
/// # Errors
///
/// Returns [`TreeError::MissingTarget`] or [`TreeError::NonBooleanTarget`].
pub(crate) fn validate_target(
    record: &Record,
    record_index: usize,
    target: &str,
) -> Result<bool, TreeError> {
    match record.get(target) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(TreeError::NonBooleanTarget {
            record_index,
            target: target.to_string(),
        }),
        None => Err(TreeError::MissingTarget {
            record_index,
            target: target.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new()
            .with("x", 1.0)
            .with("c", "red")
            .with("y", true)
    }

    fn schema() -> Schema {
        Schema::new(vec![Attribute::numeric("x"), Attribute::categorical("c")])
    }

    #[test]
    fn bank_marketing_has_sixteen_attributes() {
        let schema = Schema::bank_marketing();
        assert_eq!(schema.len(), 16);
        assert_eq!(schema.attributes()[0], Attribute::numeric("age"));
        assert_eq!(schema.get("poutcome").unwrap().kind, AttributeKind::Categorical);
        assert!(schema.get(DEFAULT_TARGET).is_none());
    }

    #[test]
    fn valid_record_passes() {
        assert!(schema().validate(&record(), 0, "y").is_ok());
    }

    #[test]
    fn missing_target_error() {
        let err = schema().validate(&record(), 3, "z").unwrap_err();
        assert!(matches!(err, TreeError::MissingTarget { record_index: 3, .. }));
    }

    #[test]
    fn non_boolean_target_error() {
        let r = record().with("y", "true");
        let err = schema().validate(&r, 0, "y").unwrap_err();
        assert!(matches!(err, TreeError::NonBooleanTarget { .. }));
    }

    #[test]
    fn missing_attribute_error() {
        let r = Record::new().with("x", 1.0).with("y", false);
        let err = schema().validate(&r, 1, "y").unwrap_err();
        assert!(matches!(
            err,
            TreeError::MissingAttribute { record_index: 1, ref attribute } if attribute == "c"
        ));
    }

    #[test]
    fn kind_mismatch_error() {
        let r = record().with("x", "one");
        let err = schema().validate(&r, 0, "y").unwrap_err();
        assert!(matches!(
            err,
            TreeError::AttributeKindMismatch { expected: AttributeKind::Numeric, .. }
        ));
    }

    #[test]
    fn kind_display() {
        assert_eq!(AttributeKind::Numeric.to_string(), "numeric");
        assert_eq!(AttributeKind::Categorical.to_string(), "categorical");
    }

    #[test]
    fn non_finite_numeric_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let r = record().with("x", bad);
            let err = schema().validate(&r, 2, "y").unwrap_err();
            assert!(matches!(
                err,
                TreeError::AttributeKindMismatch { record_index: 2, ref attribute, .. } if attribute == "x"
            ));
        }
        assert!(!Attribute::numeric("x").accepts(&Value::Numeric(f64::NAN)));
        assert!(Attribute::numeric("x").accepts(&Value::Numeric(-3.5)));
    }
}
