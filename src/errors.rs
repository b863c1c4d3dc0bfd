use std::path::PathBuf;

use thiserror::Error;

/// Failures of an offline training run. Every variant aborts the run before
/// anything is persisted.
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("Dataset not found: {source_path}")]
    DatasetNotFound { source_path: String },
    #[error("Target column '{0}' not found in dataset")]
    MissingTarget(String),
    #[error("Dataset is missing feature columns: {}", .missing.join(", "))]
    IncompleteSchema { missing: Vec<String> },
    #[error("None of the feature columns are present in the dataset")]
    NoFeatureColumns,
    #[error("Feature column '{0}' has no numeric values")]
    EmptyColumn(String),
    #[error("Dataset has {rows} usable row(s), at least {required} required")]
    EmptyDataset { rows: usize, required: usize },
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Model fit failed: {0}")]
    Fit(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Loading or saving a trained artifact
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Model artifact not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Artifact encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("Artifact expects feature '{0}' which is not part of the feature schema")]
    UnknownFeature(String),
    #[error("Artifact lists {names} feature name(s) but its forest was fit on {fitted}")]
    FeatureCountMismatch { names: usize, fitted: usize },
}

/// Request-time failures, reported back to the caller as a client error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error("No data provided")]
    NoData,
    #[error("Malformed request body: {0}")]
    Malformed(String),
    #[error("Prediction failed: {0}")]
    Prediction(String),
}
