//! Domain types for arbor-io.

use arbor_tree::Record;

use crate::IoError;

/// A record identifier.
///
/// Taken from the `id` column of the input CSV, or the 1-based data row number
/// when the file has no such column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new record ID from a non-empty string.
    pub(crate) fn new(id: String) -> Self {
        debug_assert!(!id.is_empty(), "record ID must not be empty");
        Self(id)
    }

    /// Return the record ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed records read from a CSV file.
///
/// Produced by [`RecordReader`](crate::RecordReader). `ids[i]` identifies
/// `records[i]`.
#[derive(Debug)]
pub struct RecordDataset {
    ids: Vec<RecordId>,
    records: Vec<Record>,
}

impl RecordDataset {
    pub(crate) fn new(ids: Vec<RecordId>, records: Vec<Record>) -> Self {
        Self { ids, records }
    }

    /// Return the record IDs in file order.
    #[must_use]
    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    /// Return the records in file order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Return the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` if the dataset holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the dataset and return its IDs and records.
    #[must_use]
    pub fn into_parts(self) -> (Vec<RecordId>, Vec<Record>) {
        (self.ids, self.records)
    }
}
