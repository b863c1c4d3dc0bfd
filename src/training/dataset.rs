use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::info;

use crate::common::{parse_cell, DataLoader};
use crate::errors::TrainingError;
use crate::features::canonical_feature_name;

/// 과거 매매 기록 테이블 (CSV, 헤더 포함)
///
/// Cells are kept as text; numeric parsing happens per column so that
/// unrelated categorical columns never cause a load failure.
#[derive(Debug, Clone)]
pub struct HistoricalDataset {
    source: PathBuf,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl HistoricalDataset {
    /// Load from a file path or glob pattern.
    pub fn load(location: &str) -> Result<Self, TrainingError> {
        let path = DataLoader::resolve_source(location)?;
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self, TrainingError> {
        if !path.is_file() {
            return Err(TrainingError::DatasetNotFound {
                source_path: path.display().to_string(),
            });
        }

        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let records = reader.records().collect::<Result<Vec<_>, _>>()?;

        let dataset = Self {
            source: path.to_path_buf(),
            headers,
            records,
        };
        info!(
            "Dataset loaded: {} rows x {} columns from {}",
            dataset.n_rows(),
            dataset.n_columns(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    /// Position of a column by exact header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Position of the column holding a schema feature, accepting the dataset's own header spelling
    pub fn feature_column_index(&self, feature: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| canonical_feature_name(h) == Some(feature))
    }

    /// Parsed values of one column; `None` marks a missing cell
    pub fn numeric_column(&self, index: usize) -> Vec<Option<f64>> {
        self.records
            .iter()
            .map(|record| record.get(index).and_then(parse_cell))
            .collect()
    }
}
