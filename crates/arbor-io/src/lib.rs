//! CSV ingestion, validation, and JSON result writing for the arbor pipeline.

mod domain;
mod error;
mod record_reader;
mod writer;

pub use domain::{ExperimentName, RecordDataset, RecordId};
pub use error::IoError;
pub use record_reader::RecordReader;
pub use writer::ResultWriter;
