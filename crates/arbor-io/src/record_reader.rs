//! CSV record reader with full input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use arbor_tree::{AttributeKind, Record, Schema, Value};
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{RecordDataset, RecordId};

/// Name of the optional identifier column.
const ID_COLUMN: &str = "id";

/// Reads schema-typed records from a CSV file.
///
/// Expected CSV format:
/// - Header row required; column order is free
/// - One column per schema attribute, plus the target column when one is set
/// - An optional `id` column, non-blank in every row; without it, records
///   are numbered from 1
/// - Other columns are ignored
///
/// Numeric cells must parse as finite floats. Categorical cells are trimmed
/// and kept as-is. Target cells accept `true/false/yes/no/1/0` in any case.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | Header lacks a schema attribute or the target |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::InvalidNumber`] | Numeric cell is NaN, Inf, or unparseable |
/// | [`IoError::InvalidBoolean`] | Target cell is not a recognised boolean |
/// | [`IoError::MissingRecordId`] | `id` column present but a cell is blank |
/// | [`IoError::DuplicateRecordId`] | Same `id` appears twice |
pub struct RecordReader {
    path: PathBuf,
    schema: Schema,
    target: Option<String>,
}

impl RecordReader {
    /// Create a new reader for the given CSV file path and schema.
    ///
    /// No target column is read until [`with_target`](Self::with_target) sets one.
    pub fn new(path: &Path, schema: Schema) -> Self {
        Self {
            path: path.to_path_buf(),
            schema,
            target: None,
        }
    }

    /// Set the boolean target column to read, or `None` for unlabeled input.
    #[must_use]
    pub fn with_target(mut self, target: Option<&str>) -> Self {
        self.target = target.map(String::from);
        self
    }

    /// Read and validate the CSV file, returning a [`RecordDataset`].
    #[instrument(skip(self), fields(path = %self.path.display(), target = ?self.target))]
    pub fn read(&self) -> Result<RecordDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so our own InconsistentRowLength check fires instead
        // of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let expected_cols = header.len();
        let columns = self.resolve_columns(&header)?;
        debug!(expected_cols, has_id = columns.id.is_some(), "read CSV header");

        let mut ids = Vec::new();
        let mut records = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let row = result.map_err(|e| self.csv_error(e))?;

            if row.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: row.len(),
                });
            }

            let id = match columns.id {
                Some(col) => {
                    let id = row.get(col).unwrap_or("").trim();
                    if id.is_empty() {
                        return Err(IoError::MissingRecordId {
                            path: self.path.clone(),
                            row_index,
                        });
                    }
                    id.to_string()
                }
                None => (row_index + 1).to_string(),
            };
            if let Some(&first_row) = seen.get(&id) {
                return Err(IoError::DuplicateRecordId {
                    path: self.path.clone(),
                    record_id: id,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(id.clone(), row_index);

            let mut record = Record::new();
            for (attribute, &col) in self.schema.attributes().iter().zip(&columns.attributes) {
                let raw = row.get(col).unwrap_or("").trim();
                let value = match attribute.kind {
                    AttributeKind::Numeric => {
                        Value::Numeric(self.parse_number(raw, row_index, &attribute.name)?)
                    }
                    AttributeKind::Categorical => Value::Categorical(raw.to_string()),
                };
                record.insert(attribute.name.clone(), value);
            }
            if let (Some(target), Some(col)) = (&self.target, columns.target) {
                let raw = row.get(col).unwrap_or("").trim();
                let label = self.parse_bool(raw, row_index, target)?;
                record.insert(target.clone(), label);
            }

            ids.push(RecordId::new(id));
            records.push(record);
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_records = records.len(),
            n_attributes = self.schema.len(),
            "record dataset loaded"
        );

        Ok(RecordDataset::new(ids, records))
    }

    fn resolve_columns(&self, header: &csv::StringRecord) -> Result<Columns, IoError> {
        let position = |name: &str| header.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            position(name).ok_or_else(|| IoError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
        };

        let attributes = self
            .schema
            .attributes()
            .iter()
            .map(|a| require(&a.name))
            .collect::<Result<Vec<_>, _>>()?;
        let target = self.target.as_deref().map(require).transpose()?;

        Ok(Columns {
            id: position(ID_COLUMN),
            attributes,
            target,
        })
    }

    fn parse_number(&self, raw: &str, row_index: usize, column: &str) -> Result<f64, IoError> {
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(IoError::InvalidNumber {
                path: self.path.clone(),
                row_index,
                column: column.to_string(),
                raw: raw.to_string(),
            }),
        }
    }

    fn parse_bool(&self, raw: &str, row_index: usize, column: &str) -> Result<bool, IoError> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(IoError::InvalidBoolean {
                path: self.path.clone(),
                row_index,
                column: column.to_string(),
                raw: raw.to_string(),
            }),
        }
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// Header positions of the columns a read needs.
struct Columns {
    id: Option<usize>,
    attributes: Vec<usize>,
    target: Option<usize>,
}
