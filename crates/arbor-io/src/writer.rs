//! JSON result writer for training, evaluation, and prediction outputs.

use std::fs;
use std::path::{Path, PathBuf};

use arbor_tree::{ConfusionMatrix, DecisionTree, Metrics, Node, TrainingMetadata};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{ExperimentName, RecordId};

/// Writes training and prediction results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_tree.json`,
/// `{experiment}_evaluate.json`, and `{experiment}_predictions.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write the fitted tree's node arena to `{experiment}_tree.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_tree(&self, tree: &DecisionTree) -> Result<PathBuf, IoError> {
        let artifact = TreeArtifact {
            experiment: self.experiment.as_str(),
            target: tree.target(),
            max_depth: tree.max_depth().get(),
            depth: tree.depth(),
            n_nodes: tree.n_nodes(),
            n_leaves: tree.n_leaves(),
            nodes: tree.nodes(),
        };
        let path = self.artifact_path("tree");
        write_json(&path, &artifact)?;

        info!(path = %path.display(), "tree written");
        Ok(path)
    }

    /// Write held-out metrics to `{experiment}_evaluate.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_evaluation(
        &self,
        metrics: &Metrics,
        metadata: &TrainingMetadata,
    ) -> Result<PathBuf, IoError> {
        let artifact = EvaluateArtifact {
            experiment: self.experiment.as_str(),
            accuracy: metrics.accuracy,
            precision: metrics.precision,
            recall: metrics.recall,
            f1: metrics.f1,
            confusion_matrix: metrics.confusion_matrix,
            metadata,
        };
        let path = self.artifact_path("evaluate");
        write_json(&path, &artifact)?;

        info!(path = %path.display(), "evaluation result written");
        Ok(path)
    }

    /// Write one prediction per record to `{experiment}_predictions.json`.
    ///
    /// `ids[i]` labels `predictions[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all, fields(n_records = predictions.len()))]
    pub fn write_predictions(
        &self,
        ids: &[RecordId],
        predictions: &[bool],
    ) -> Result<PathBuf, IoError> {
        let entries: Vec<PredictionEntry> = ids
            .iter()
            .zip(predictions)
            .map(|(id, &prediction)| PredictionEntry {
                id: id.as_str(),
                prediction,
            })
            .collect();

        let artifact = PredictArtifact {
            experiment: self.experiment.as_str(),
            n_records: entries.len(),
            n_predicted_true: predictions.iter().filter(|&&p| p).count(),
            predictions: entries,
        };
        let path = self.artifact_path("predictions");
        write_json(&path, &artifact)?;

        info!(path = %path.display(), "predictions written");
        Ok(path)
    }

    /// Compute `{output_dir}/{experiment}_{kind}.json` without writing anything.
    #[must_use]
    pub fn artifact_path(&self, kind: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()))
    }
}

fn write_json<T: Serialize>(path: &Path, artifact: &T) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct TreeArtifact<'a> {
    experiment: &'a str,
    target: &'a str,
    max_depth: usize,
    depth: usize,
    n_nodes: usize,
    n_leaves: usize,
    nodes: &'a [Node],
}

#[derive(Serialize)]
struct EvaluateArtifact<'a> {
    experiment: &'a str,
    accuracy: f64,
    precision: f64,
    recall: f64,
    f1: f64,
    confusion_matrix: ConfusionMatrix,
    metadata: &'a TrainingMetadata,
}

#[derive(Serialize)]
struct PredictArtifact<'a> {
    experiment: &'a str,
    n_records: usize,
    n_predicted_true: usize,
    predictions: Vec<PredictionEntry<'a>>,
}

#[derive(Serialize)]
struct PredictionEntry<'a> {
    id: &'a str,
    prediction: bool,
}
