//! Typed tabular records keyed by attribute name.

use std::collections::BTreeMap;
use std::fmt;

/// A single attribute value.
///
/// Numeric attributes carry `Numeric`, categorical attributes carry
/// `Categorical`, and the boolean target carries `Bool`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A numeric measurement.
    Numeric(f64),
    /// A categorical label.
    Categorical(String),
    /// A boolean flag (the classification target).
    Bool(bool),
}

impl Value {
    /// Return the numeric payload, if this is a `Numeric` value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    /// Return the categorical payload, if this is a `Categorical` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Categorical(s) => Some(s),
            _ => None,
        }
    }

    /// Return the boolean payload, if this is a `Bool` value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Truthiness: the flag itself, a non-zero number, or a non-empty string.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Numeric(v) => *v != 0.0 && !v.is_nan(),
            Value::Categorical(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(v) => write!(f, "{v}"),
            Value::Categorical(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Numeric(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Numeric(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Numeric(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Categorical(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Categorical(s)
    }
}

/// A labeled (or unlabeled) tabular record: attribute name → value.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Look up an attribute value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Look up a numeric attribute value.
    #[must_use]
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Look up a categorical attribute value.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Look up a boolean attribute value (typically the target).
    #[must_use]
    pub fn label(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Return the number of attributes in this record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` if the record has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, Value};

    #[test]
    fn typed_lookups() {
        let r = Record::new()
            .with("age", 42)
            .with("job", "technician")
            .with("subscribed", true);
        assert_eq!(r.numeric("age"), Some(42.0));
        assert_eq!(r.category("job"), Some("technician"));
        assert_eq!(r.label("subscribed"), Some(true));
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn wrong_kind_lookup_is_none() {
        let r = Record::new().with("age", 42).with("job", "admin.");
        assert_eq!(r.numeric("job"), None);
        assert_eq!(r.category("age"), None);
        assert_eq!(r.label("age"), None);
        assert_eq!(r.numeric("missing"), None);
    }

    #[test]
    fn truthiness() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Numeric(-1.0).is_truthy());
        assert!(!Value::Numeric(0.0).is_truthy());
        assert!(!Value::Numeric(f64::NAN).is_truthy());
        assert!(Value::from("no").is_truthy());
        assert!(!Value::from("").is_truthy());
    }

    #[test]
    fn display_matches_raw_form() {
        assert_eq!(Value::Numeric(2.5).to_string(), "2.5");
        assert_eq!(Value::from("may").to_string(), "may");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn serde_untagged_round_trip() {
        let r = Record::new().with("x", 1.5).with("c", "a").with("y", false);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"c":"a","x":1.5,"y":false}"#);
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
